//! Subscription store port.
//!
//! Durable mapping from recipient to subscription and pending-purchase
//! records. Every mutation is a full read-modify-write-persist transaction;
//! concurrent callers must never observe a partial update. Persistence
//! failures surface as `PersistenceFailed` and must not leave the in-memory
//! view diverged from disk.
//!
//! The payment-event processor and the expiration sweeper are the only
//! writers; everything else reads through the query operations.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RecipientId, Timestamp};
use crate::domain::subscription::SubscriptionRecord;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Inserts or replaces the pending purchase for the record's recipient.
    async fn upsert_pending(&self, record: SubscriptionRecord) -> Result<(), DomainError>;

    /// Returns the recipient's pending purchase, if any.
    async fn get_pending(
        &self,
        recipient: RecipientId,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Drops the recipient's pending purchase. No-op when absent.
    async fn remove_pending(&self, recipient: RecipientId) -> Result<(), DomainError>;

    /// Returns the recipient's current subscription record, if any.
    async fn get_current(
        &self,
        recipient: RecipientId,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Promotes the purchase identified by `reference` to Active for the
    /// period `start..end`.
    ///
    /// Uses the pending record when one exists (preserving plan and
    /// amount), otherwise rebuilds the record from the reference for
    /// compatibility with old bare-id references. The pending entry is
    /// cleared either way.
    async fn activate(
        &self,
        reference: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError>;

    /// Finalizes a record to Expired so later sweeps skip it. No-op when
    /// the recipient has no record conveying access.
    async fn deactivate(&self, recipient: RecipientId) -> Result<(), DomainError>;

    /// Cancels an active subscription, collapsing its expiry to `now`.
    async fn cancel(
        &self,
        recipient: RecipientId,
        now: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError>;

    /// Records still conveying access whose expiry is at or before `now`,
    /// in unspecified order.
    async fn list_expired(&self, now: Timestamp) -> Result<Vec<SubscriptionRecord>, DomainError>;

    /// Every known subscription record, in unspecified order.
    async fn list_all(&self) -> Result<Vec<SubscriptionRecord>, DomainError>;
}
