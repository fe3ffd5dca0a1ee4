//! Error types for building and sending Bot API calls.
//!
//! # Design
//! `BuildError` is raised synchronously while normalizing arguments, before
//! any network attempt. `TransportError` covers a single failed attempt at
//! the HTTP layer. `Error` is what a caller finally sees: the last failure of
//! a call after its retry budget is spent, or a build/decoding failure.

use thiserror::Error;

/// Malformed or unsupported arguments for a Bot API action.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A structured argument was not a JSON object.
    #[error("structured arguments must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The action name was empty.
    #[error("action name must not be empty")]
    EmptyAction,

    /// An argument could not be converted to JSON.
    #[error("failed to serialize field `{field}`: {source}")]
    Serialization {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single attempt failed at the HTTP layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be issued at all (rejected before any I/O).
    #[error("could not issue request: {0}")]
    Issue(String),

    /// Connection, TLS or I/O failure while the request was in flight.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The attempt did not complete within the per-attempt timeout.
    #[error("attempt timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Errors returned to callers of `Bot` and `send_with_retry`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The Bot API envelope reported `ok: false`.
    #[error("Bot API error {}: {description}", .code.map_or_else(|| "?".to_string(), |c| c.to_string()))]
    Api {
        code: Option<i64>,
        description: String,
    },

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status of a non-200 response, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Invalid or missing bot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
