//! HTTP request and response descriptors.
//!
//! # Design
//! These types describe one Bot API call as plain data. `ApiClient` builds
//! `HttpRequest` values without touching the network; a `Transport` turns
//! them into real HTTP traffic. A descriptor is immutable once built and is
//! resent verbatim on every retry attempt, so file payloads are held as
//! shared `Bytes` and cloning a request never copies upload data.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use bytes::Bytes;

/// HTTP method for a request. Bot API calls default to `Post`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file to upload as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Bytes,
}

impl InputFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The file name part of `path` becomes the
    /// upload's file name.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A single normalized form field.
///
/// Structured values never appear here: they have already been encoded to
/// JSON text and stored as `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    File(InputFile),
}

impl FormValue {
    /// Text form of a scalar field, as sent in a form part or query string.
    /// Files have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FormValue::Text(s) => Some(s.clone()),
            FormValue::Integer(n) => Some(n.to_string()),
            FormValue::Float(n) => Some(n.to_string()),
            FormValue::Bool(b) => Some(b.to_string()),
            FormValue::File(_) => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FormValue::File(_))
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Integer(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

/// Normalized request body keyed by Bot API field name.
pub type Form = BTreeMap<String, FormValue>;

/// One outbound Bot API call described as plain data.
///
/// `body` is `None` when the call carries no fields at all; an empty form is
/// never transmitted.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub base_url: String,
    pub path: String,
    pub body: Option<Form>,
}

impl HttpRequest {
    pub fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.path)
    }

    /// Look up a body field by name.
    pub fn field(&self, name: &str) -> Option<&FormValue> {
        self.body.as_ref().and_then(|form| form.get(name))
    }
}

/// An HTTP response described as plain data. The body is kept as raw text;
/// decoding it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Only 200 counts as success; other 2xx codes do not.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
