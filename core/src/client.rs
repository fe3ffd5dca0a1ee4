//! Stateless request builder for the Telegram Bot API.
//!
//! # Design
//! `ApiClient` holds only the bot's base URL (`<api_url>/bot<token>`) and
//! carries no mutable state between calls. Every `build_*` method produces an
//! `HttpRequest` without touching the network; `parse_result` decodes the
//! Bot API envelope of a raw response body. Sending is done elsewhere, by a
//! `Transport` driven through `send_with_retry`.

use serde::de::DeserializeOwned;

use crate::error::{BuildError, Error};
use crate::http::{HttpMethod, HttpRequest};
use crate::methods::{
    Action, ForwardMessage, GetMe, GetUpdates, GetUserProfilePhotos, SendAudio, SendChatAction,
    SendDocument, SendLocation, SendMessage, SendPhoto, SendSticker, SendVideo, SetWebhook,
};
use crate::params::{normalize, Params};
use crate::types::ApiResponse;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Builds `HttpRequest` values for one bot identity.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
}

// The base URL embeds the token, keep it out of logs.
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(token: &str) -> Self {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    /// Point the client at another Bot API server, such as a local mock.
    pub fn with_api_url(api_url: &str, token: &str) -> Self {
        Self {
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build<A: Action>(&self, action: A) -> Result<HttpRequest, BuildError> {
        let method = action.http_method();
        let params = action.into_params()?;
        self.build_method_with(A::NAME, params, method)
    }

    /// Build a call from a method name and structured arguments.
    pub fn build_method(&self, name: &str, params: Params) -> Result<HttpRequest, BuildError> {
        self.build_method_with(name, params, HttpMethod::Post)
    }

    pub fn build_method_with(
        &self,
        name: &str,
        params: Params,
        method: HttpMethod,
    ) -> Result<HttpRequest, BuildError> {
        if name.is_empty() {
            return Err(BuildError::EmptyAction);
        }
        Ok(HttpRequest {
            method,
            base_url: self.base_url.clone(),
            path: name.to_string(),
            body: normalize(params),
        })
    }

    pub fn build_get_updates(&self, args: GetUpdates) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_set_webhook(&self, args: SetWebhook) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_get_me(&self) -> Result<HttpRequest, BuildError> {
        self.build(GetMe)
    }

    pub fn build_send_message(&self, args: SendMessage) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_forward_message(&self, args: ForwardMessage) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_send_photo(&self, args: SendPhoto) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_send_audio(&self, args: SendAudio) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_send_document(&self, args: SendDocument) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_send_sticker(&self, args: SendSticker) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_send_video(&self, args: SendVideo) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_send_location(&self, args: SendLocation) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_send_chat_action(&self, args: SendChatAction) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    pub fn build_get_user_profile_photos(
        &self,
        args: GetUserProfilePhotos,
    ) -> Result<HttpRequest, BuildError> {
        self.build(args)
    }

    /// Decode the `result` of a successful Bot API response body.
    pub fn parse_result<T: DeserializeOwned>(&self, body: &str) -> Result<T, Error> {
        let envelope: ApiResponse<T> = ApiResponse::from_json(body)?;
        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(Error::Api {
                code: envelope.error_code,
                description: envelope
                    .description
                    .unwrap_or_else(|| "response carried no result".to_string()),
            }),
        }
    }
}
