//! Telegram Bot API client core.
//!
//! # Overview
//! Builds `HttpRequest` descriptors for Bot API actions and sends them with a
//! bounded, retrying transport. The response body is handed back as raw
//! text; `ApiClient::parse_result` decodes it when the caller wants typed
//! data.
//!
//! # Design
//! - `ApiClient` is stateless: it holds only the bot's base URL and never
//!   touches the network.
//! - Two calling shapes, one normalization: typed action structs
//!   (`SendMessage::new(chat, text)`) and structured JSON objects
//!   (`Params::from_object`) both go through `params::normalize`.
//! - `send_with_retry` owns the retry loop; `Transport` is the seam to the
//!   HTTP stack (`HttpTransport` over reqwest, or a test double).
//! - `Bot` composes the above and hosts the `UpdateHandler` hook.

pub mod bot;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod methods;
pub mod params;
pub mod retry;
pub mod transport;
pub mod types;

pub use bot::{Bot, Echo, IncomingMessage, UpdateHandler};
pub use client::{ApiClient, DEFAULT_API_URL};
pub use config::BotConfig;
pub use error::{BuildError, ConfigError, Error, TransportError};
pub use http::{Form, FormValue, HttpMethod, HttpRequest, HttpResponse, InputFile};
pub use methods::{
    Action, ForwardMessage, GetMe, GetUpdates, GetUserProfilePhotos, InputMedia, SendAudio,
    SendChatAction, SendDocument, SendLocation, SendMessage, SendPhoto, SendSticker, SendVideo,
    SetWebhook,
};
pub use params::Params;
pub use retry::{send_with_retry, RetryPolicy, Transport, DEFAULT_MAX_ATTEMPTS};
pub use transport::HttpTransport;
pub use types::{
    ApiResponse, Chat, ChatAction, ChatId, Message, ReplyKeyboardMarkup, ReplyMarkup, Update, User,
};
