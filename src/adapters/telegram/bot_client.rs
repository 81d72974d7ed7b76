//! Telegram Bot API client implementing `Messenger` and `MemberGate`.
//!
//! Revocation uses banChatMember followed by unbanChatMember so the
//! recipient can rejoin through the invite link after a future purchase.
//! The bot must be an administrator of the VIP group for either call to
//! succeed.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::json;

use crate::domain::foundation::{ChannelId, RecipientId};
use crate::ports::{MemberGate, Messenger, PlatformError};

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Telegram Bot API client.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: Secret<String>,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    /// Creates a client with the default Bot API base URL.
    pub fn new(bot_token: Secret<String>) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            bot_token,
        })
    }

    /// Overrides the base URL (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url,
            self.bot_token.expose_secret(),
            method
        )
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<(), PlatformError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| PlatformError::Api(format!("unexpected response from {}: {}", method, e)))?;

        if envelope.ok {
            Ok(())
        } else {
            Err(PlatformError::Api(format!(
                "{} failed: {}",
                method,
                envelope.description.unwrap_or_else(|| "no description".to_string())
            )))
        }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, recipient: RecipientId, text: &str) -> Result<(), PlatformError> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": recipient.as_i64(),
                "text": text,
            }),
        )
        .await
    }

    async fn send_with_link(
        &self,
        recipient: RecipientId,
        text: &str,
        label: &str,
        url: &str,
    ) -> Result<(), PlatformError> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": recipient.as_i64(),
                "text": text,
                "disable_web_page_preview": true,
                "reply_markup": {
                    "inline_keyboard": [[{ "text": label, "url": url }]],
                },
            }),
        )
        .await
    }
}

#[async_trait]
impl MemberGate for TelegramClient {
    async fn ban(&self, channel: ChannelId, recipient: RecipientId) -> Result<(), PlatformError> {
        self.call(
            "banChatMember",
            json!({
                "chat_id": channel.as_i64(),
                "user_id": recipient.as_i64(),
                "revoke_messages": true,
            }),
        )
        .await
    }

    async fn unban(&self, channel: ChannelId, recipient: RecipientId) -> Result<(), PlatformError> {
        self.call(
            "unbanChatMember",
            json!({
                "chat_id": channel.as_i64(),
                "user_id": recipient.as_i64(),
            }),
        )
        .await
    }
}
