//! Bot configuration.

use std::time::Duration;

use crate::client::DEFAULT_API_URL;
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

/// Identity and call behavior of one bot.
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    /// Registered by `Bot::start`. `None` or an empty string removes any
    /// previously registered webhook.
    pub webhook_url: Option<String>,
    pub api_url: String,
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("webhook_url", &self.webhook_url)
            .field("api_url", &self.api_url)
            .field("retry", &self.retry)
            .finish()
    }
}

impl BotConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            webhook_url: None,
            api_url: DEFAULT_API_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Read `TELEGRAM_BOT_TOKEN` (required), `TELEGRAM_WEBHOOK_URL`,
    /// `TELEGRAM_API_URL`, `TELEGRAM_MAX_ATTEMPTS` and
    /// `TELEGRAM_ATTEMPT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let mut config = Self::new(token);

        config.webhook_url = lookup("TELEGRAM_WEBHOOK_URL");
        if let Some(api_url) = lookup("TELEGRAM_API_URL") {
            config.api_url = api_url;
        }
        if let Some(value) = lookup("TELEGRAM_MAX_ATTEMPTS") {
            let attempts = value.parse::<u32>().map_err(|_| ConfigError::Invalid {
                name: "TELEGRAM_MAX_ATTEMPTS",
                value: value.clone(),
            })?;
            config.retry = config.retry.max_attempts(attempts);
        }
        if let Some(value) = lookup("TELEGRAM_ATTEMPT_TIMEOUT_SECS") {
            let secs = value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "TELEGRAM_ATTEMPT_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            config.retry = config.retry.attempt_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
