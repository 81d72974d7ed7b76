//! Messaging-platform send port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::RecipientId;

/// Errors from messaging-platform calls (sends, bans).
///
/// During sweeps and broadcasts these are logged and isolated per
/// recipient; they never abort a batch.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Connectivity or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// The platform rejected the call.
    #[error("platform API error: {0}")]
    Api(String),
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a plain text message to a recipient.
    async fn send_text(&self, recipient: RecipientId, text: &str) -> Result<(), PlatformError>;

    /// Sends a message with a single inline link button.
    async fn send_with_link(
        &self,
        recipient: RecipientId,
        text: &str,
        label: &str,
        url: &str,
    ) -> Result<(), PlatformError>;
}
