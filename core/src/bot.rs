//! The bot facade: one async method per Bot API action, plus the update hook.
//!
//! # Design
//! `Bot` composes an `ApiClient` (request building) with a shared
//! `Transport` and a `RetryPolicy`. It holds no mutable state, so one `Bot`
//! can serve any number of concurrent calls. Reacting to incoming updates is
//! done through the `UpdateHandler` trait rather than by extending `Bot`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::ApiClient;
use crate::config::BotConfig;
use crate::error::Error;
use crate::http::HttpRequest;
use crate::methods::{
    Action, ForwardMessage, GetMe, GetUpdates, GetUserProfilePhotos, SendAudio, SendChatAction,
    SendDocument, SendLocation, SendMessage, SendPhoto, SendSticker, SendVideo, SetWebhook,
};
use crate::params::Params;
use crate::retry::{send_with_retry, RetryPolicy, Transport};
use crate::transport::HttpTransport;
use crate::types::{Message, Update};

/// A received message with the ids a handler usually needs pulled out.
#[derive(Debug, Clone, Copy)]
pub struct IncomingMessage<'a> {
    pub chat_id: i64,
    pub user_id: Option<i64>,
    pub message: &'a Message,
}

/// Reacts to incoming updates. The default echoes the text back to the chat
/// it came from.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn on_message(&self, bot: &Bot, incoming: IncomingMessage<'_>) -> Result<(), Error> {
        let text = incoming.message.text.as_deref().unwrap_or_default();
        bot.send_message(SendMessage::new(incoming.chat_id, format!("you said: {text}")))
            .await?;
        Ok(())
    }
}

/// Handler with the default echo behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl UpdateHandler for Echo {}

pub struct Bot {
    client: ApiClient,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    webhook_url: Option<String>,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("retry", &self.retry)
            .field("webhook_url", &self.webhook_url)
            .finish_non_exhaustive()
    }
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: BotConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: ApiClient::with_api_url(&config.api_url, &config.token),
            transport,
            retry: config.retry,
            webhook_url: config.webhook_url,
        }
    }

    /// Create the bot and register its webhook, replacing whatever was
    /// registered before. Without a webhook URL the old one is removed.
    pub async fn start(config: BotConfig) -> Result<Self, Error> {
        let bot = Self::new(config);
        bot.register_webhook().await?;
        Ok(bot)
    }

    pub async fn start_with_transport(
        config: BotConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let bot = Self::with_transport(config, transport);
        bot.register_webhook().await?;
        Ok(bot)
    }

    pub async fn register_webhook(&self) -> Result<String, Error> {
        let url = self.webhook_url.clone().unwrap_or_default();
        tracing::info!(removing = url.is_empty(), "registering webhook");
        self.set_webhook(SetWebhook::new(url)).await
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn call<A: Action>(&self, action: A) -> Result<String, Error> {
        let request = self.client.build(action)?;
        self.send(&request).await
    }

    /// Call any Bot API method with structured arguments.
    pub async fn call_method(&self, name: &str, params: Params) -> Result<String, Error> {
        let request = self.client.build_method(name, params)?;
        self.send(&request).await
    }

    pub async fn send(&self, request: &HttpRequest) -> Result<String, Error> {
        send_with_retry(self.transport.as_ref(), request, &self.retry).await
    }

    /// Run `handler` once for `update`. Updates without a message are
    /// ignored.
    pub async fn handle_update(
        &self,
        handler: &dyn UpdateHandler,
        update: &Update,
    ) -> Result<(), Error> {
        let Some(message) = update.message.as_ref() else {
            tracing::debug!(update_id = update.update_id, "update has no message");
            return Ok(());
        };
        let incoming = IncomingMessage {
            chat_id: message.chat.id,
            user_id: message.from.as_ref().map(|user| user.id),
            message,
        };
        handler.on_message(self, incoming).await
    }

    pub async fn get_updates(&self, args: GetUpdates) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn set_webhook(&self, args: SetWebhook) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn get_me(&self) -> Result<String, Error> {
        self.call(GetMe).await
    }

    pub async fn send_message(&self, args: SendMessage) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn forward_message(&self, args: ForwardMessage) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn send_photo(&self, args: SendPhoto) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn send_audio(&self, args: SendAudio) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn send_document(&self, args: SendDocument) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn send_sticker(&self, args: SendSticker) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn send_video(&self, args: SendVideo) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn send_location(&self, args: SendLocation) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn send_chat_action(&self, args: SendChatAction) -> Result<String, Error> {
        self.call(args).await
    }

    pub async fn get_user_profile_photos(&self, args: GetUserProfilePhotos) -> Result<String, Error> {
        self.call(args).await
    }
}
