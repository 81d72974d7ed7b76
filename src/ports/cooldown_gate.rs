//! Per-recipient cooldown gate for promotional pushes.
//!
//! Wraps every scheduled, broadcast, or nudge send. Never applied to the
//! payment-approval grant message, which is transactional and must always
//! go out.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RecipientId, Timestamp};

#[async_trait]
pub trait CooldownGate: Send + Sync {
    /// True iff at least the configured minimum gap has passed since the
    /// last recorded send to this recipient. Unseen recipients are
    /// eligible (their last send defaults to epoch zero).
    async fn can_send(&self, recipient: RecipientId, now: Timestamp) -> Result<bool, DomainError>;

    /// Records a send at `now`.
    async fn mark_sent(&self, recipient: RecipientId, now: Timestamp) -> Result<(), DomainError>;
}
