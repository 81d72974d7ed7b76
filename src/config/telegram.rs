//! Messaging platform configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::domain::foundation::ChannelId;

use super::error::ValidationError;

/// Messaging platform configuration (Telegram)
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token
    pub bot_token: Secret<String>,

    /// Access-controlled VIP group id; revocation is skipped when unset
    #[serde(default)]
    pub vip_channel_id: Option<i64>,

    /// Invite link delivered with the access grant
    pub vip_invite_link: String,

    /// Bot API base URL (override for tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl TelegramConfig {
    /// Revocation target, when one is configured
    pub fn channel(&self) -> Option<ChannelId> {
        self.vip_channel_id.map(ChannelId::new)
    }

    /// Validate messaging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM__BOT_TOKEN"));
        }
        if !self.vip_invite_link.starts_with("https://") {
            return Err(ValidationError::InvalidInviteLink);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.telegram.org".to_string()
}
