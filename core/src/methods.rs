//! Typed arguments for each supported Bot API action.
//!
//! Each struct is the convenience calling shape: required arguments go to
//! `new`, optional ones are builder setters. `into_params` lays the fields
//! out in the documented order for the action, so a call built here
//! normalizes to the same body as the equivalent structured object.

use crate::error::BuildError;
use crate::http::{HttpMethod, InputFile};
use crate::params::Params;
use crate::types::{ChatAction, ChatId, ReplyMarkup};

/// A named Bot API operation together with its arguments.
pub trait Action {
    /// Bot API method name, used as the request path.
    const NAME: &'static str;

    fn into_params(self) -> Result<Params, BuildError>;

    fn http_method(&self) -> HttpMethod {
        HttpMethod::Post
    }
}

/// A media argument: either a file already on Telegram's servers, or a new
/// upload.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMedia {
    FileId(String),
    Upload(InputFile),
}

impl From<InputFile> for InputMedia {
    fn from(file: InputFile) -> Self {
        InputMedia::Upload(file)
    }
}

impl From<&str> for InputMedia {
    fn from(file_id: &str) -> Self {
        InputMedia::FileId(file_id.to_string())
    }
}

impl From<String> for InputMedia {
    fn from(file_id: String) -> Self {
        InputMedia::FileId(file_id)
    }
}

fn with_media(params: Params, name: &str, media: InputMedia) -> Params {
    match media {
        InputMedia::FileId(id) => params.field(name, id),
        InputMedia::Upload(file) => params.file(name, file),
    }
}

/// `getUpdates`: long-poll for incoming updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetUpdates {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub timeout: Option<i64>,
}

impl GetUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn timeout(mut self, seconds: i64) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

impl Action for GetUpdates {
    const NAME: &'static str = "getUpdates";

    fn into_params(self) -> Result<Params, BuildError> {
        Ok(Params::new()
            .field("offset", self.offset)
            .field("limit", self.limit)
            .field("timeout", self.timeout))
    }
}

/// `setWebhook`: register the URL updates are pushed to. An empty URL
/// removes the webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetWebhook {
    pub url: String,
}

impl SetWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn remove() -> Self {
        Self::default()
    }
}

impl Action for SetWebhook {
    const NAME: &'static str = "setWebhook";

    fn into_params(self) -> Result<Params, BuildError> {
        Ok(Params::new().field("url", self.url))
    }
}

/// `getMe`: check the bot token. Takes no arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetMe;

impl Action for GetMe {
    const NAME: &'static str = "getMe";

    fn into_params(self) -> Result<Params, BuildError> {
        Ok(Params::new())
    }
}

/// `sendMessage`
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub disable_web_page_preview: Option<bool>,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessage {
    pub fn new(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            disable_web_page_preview: None,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }

    pub fn disable_web_page_preview(mut self, disable: bool) -> Self {
        self.disable_web_page_preview = Some(disable);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }
}

impl Action for SendMessage {
    const NAME: &'static str = "sendMessage";

    fn into_params(self) -> Result<Params, BuildError> {
        Params::new()
            .field("chat_id", self.chat_id)
            .field("text", self.text)
            .field("disable_web_page_preview", self.disable_web_page_preview)
            .field("reply_to_message_id", self.reply_to_message_id)
            .serialized("reply_markup", self.reply_markup.as_ref())
    }
}

/// `forwardMessage`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardMessage {
    pub chat_id: ChatId,
    pub from_chat_id: ChatId,
    pub message_id: i64,
}

impl ForwardMessage {
    pub fn new(chat_id: impl Into<ChatId>, from_chat_id: impl Into<ChatId>, message_id: i64) -> Self {
        Self {
            chat_id: chat_id.into(),
            from_chat_id: from_chat_id.into(),
            message_id,
        }
    }
}

impl Action for ForwardMessage {
    const NAME: &'static str = "forwardMessage";

    fn into_params(self) -> Result<Params, BuildError> {
        Ok(Params::new()
            .field("chat_id", self.chat_id)
            .field("from_chat_id", self.from_chat_id)
            .field("message_id", self.message_id))
    }
}

/// `sendPhoto`
#[derive(Debug, Clone, PartialEq)]
pub struct SendPhoto {
    pub chat_id: ChatId,
    pub photo: InputMedia,
    pub caption: Option<String>,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendPhoto {
    pub fn new(chat_id: impl Into<ChatId>, photo: impl Into<InputMedia>) -> Self {
        Self {
            chat_id: chat_id.into(),
            photo: photo.into(),
            caption: None,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }
}

impl Action for SendPhoto {
    const NAME: &'static str = "sendPhoto";

    fn into_params(self) -> Result<Params, BuildError> {
        let params = Params::new().field("chat_id", self.chat_id);
        with_media(params, "photo", self.photo)
            .field("caption", self.caption)
            .field("reply_to_message_id", self.reply_to_message_id)
            .serialized("reply_markup", self.reply_markup.as_ref())
    }
}

// sendAudio, sendDocument, sendSticker and sendVideo share one shape:
// chat_id, the media field, reply_to_message_id, reply_markup.
macro_rules! media_action {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $field:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $ty {
            pub chat_id: ChatId,
            pub $field: InputMedia,
            pub reply_to_message_id: Option<i64>,
            pub reply_markup: Option<ReplyMarkup>,
        }

        impl $ty {
            pub fn new(chat_id: impl Into<ChatId>, $field: impl Into<InputMedia>) -> Self {
                Self {
                    chat_id: chat_id.into(),
                    $field: $field.into(),
                    reply_to_message_id: None,
                    reply_markup: None,
                }
            }

            pub fn reply_to(mut self, message_id: i64) -> Self {
                self.reply_to_message_id = Some(message_id);
                self
            }

            pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
                self.reply_markup = Some(markup.into());
                self
            }
        }

        impl Action for $ty {
            const NAME: &'static str = $name;

            fn into_params(self) -> Result<Params, BuildError> {
                let params = Params::new().field("chat_id", self.chat_id);
                with_media(params, stringify!($field), self.$field)
                    .field("reply_to_message_id", self.reply_to_message_id)
                    .serialized("reply_markup", self.reply_markup.as_ref())
            }
        }
    };
}

media_action!(
    /// `sendAudio`: a playable voice message (.ogg with OPUS).
    SendAudio,
    "sendAudio",
    audio
);
media_action!(
    /// `sendDocument`: a general file.
    SendDocument,
    "sendDocument",
    document
);
media_action!(
    /// `sendSticker`: a .webp sticker.
    SendSticker,
    "sendSticker",
    sticker
);
media_action!(
    /// `sendVideo`: an mp4 video.
    SendVideo,
    "sendVideo",
    video
);

/// `sendLocation`
#[derive(Debug, Clone, PartialEq)]
pub struct SendLocation {
    pub chat_id: ChatId,
    pub latitude: f64,
    pub longitude: f64,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendLocation {
    pub fn new(chat_id: impl Into<ChatId>, latitude: f64, longitude: f64) -> Self {
        Self {
            chat_id: chat_id.into(),
            latitude,
            longitude,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }
}

impl Action for SendLocation {
    const NAME: &'static str = "sendLocation";

    fn into_params(self) -> Result<Params, BuildError> {
        Params::new()
            .field("chat_id", self.chat_id)
            .field("latitude", self.latitude)
            .field("longitude", self.longitude)
            .field("reply_to_message_id", self.reply_to_message_id)
            .serialized("reply_markup", self.reply_markup.as_ref())
    }
}

/// `sendChatAction`: show a status such as "typing..." for a few seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendChatAction {
    pub chat_id: ChatId,
    pub action: ChatAction,
}

impl SendChatAction {
    pub fn new(chat_id: impl Into<ChatId>, action: ChatAction) -> Self {
        Self {
            chat_id: chat_id.into(),
            action,
        }
    }
}

impl Action for SendChatAction {
    const NAME: &'static str = "sendChatAction";

    fn into_params(self) -> Result<Params, BuildError> {
        Ok(Params::new()
            .field("chat_id", self.chat_id)
            .field("action", self.action.as_str()))
    }
}

/// `getUserProfilePhotos`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserProfilePhotos {
    pub user_id: i64,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl GetUserProfilePhotos {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            offset: None,
            limit: None,
        }
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Accepted values are 1 to 100.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Action for GetUserProfilePhotos {
    const NAME: &'static str = "getUserProfilePhotos";

    fn into_params(self) -> Result<Params, BuildError> {
        Ok(Params::new()
            .field("user_id", self.user_id)
            .field("offset", self.offset)
            .field("limit", self.limit))
    }
}
