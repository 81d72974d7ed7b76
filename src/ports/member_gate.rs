//! Member-management port for the access-controlled group.
//!
//! Revocation is a remove-then-restore pair: the ban removes the
//! recipient, the immediate unban lifts the block so a future purchase
//! lets them rejoin through the invite link.

use async_trait::async_trait;

use crate::domain::foundation::{ChannelId, RecipientId};

use super::messenger::PlatformError;

#[async_trait]
pub trait MemberGate: Send + Sync {
    /// Removes the recipient from the group.
    async fn ban(&self, channel: ChannelId, recipient: RecipientId) -> Result<(), PlatformError>;

    /// Lifts the ban so the recipient can rejoin later.
    async fn unban(&self, channel: ChannelId, recipient: RecipientId) -> Result<(), PlatformError>;
}
