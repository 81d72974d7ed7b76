//! Subscription record aggregate.
//!
//! One record per recipient. A fresh purchase overwrites a lapsed record
//! with a new pending one rather than appending history.
//!
//! # Design Decisions
//!
//! - **Keyed by recipient**: at most one current record per recipient
//! - **Money in cents**: amounts stored as i64 cents, never floats
//! - **State-machine transitions**: every status change is validated

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, RecipientId, StateMachine, Timestamp};

use super::{Plan, SubscriptionStatus};

/// A recipient's subscription.
///
/// # Invariants
///
/// - `activated_at` and `expires_at` are set exactly when the record
///   becomes Active; cancellation collapses `expires_at` to the
///   cancellation instant.
/// - Status transitions follow the state machine rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Recipient this subscription belongs to; the storage key.
    pub recipient_id: RecipientId,

    /// Purchased plan duration.
    pub plan: Plan,

    /// Charged amount in integer cents. Informational.
    pub amount_cents: i64,

    /// Reference correlating this purchase with its payment.
    pub external_reference: String,

    /// Current lifecycle status.
    pub status: SubscriptionStatus,

    /// When the purchase intent was issued.
    pub created_at: Timestamp,

    /// When payment was confirmed; None while pending.
    pub activated_at: Option<Timestamp>,

    /// When access lapses; None while pending.
    pub expires_at: Option<Timestamp>,
}

impl SubscriptionRecord {
    /// Creates a pending record for a new purchase intent.
    pub fn new_pending(
        recipient_id: RecipientId,
        plan: Plan,
        amount_cents: i64,
        external_reference: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            recipient_id,
            plan,
            amount_cents,
            external_reference: external_reference.into(),
            status: SubscriptionStatus::Pending,
            created_at: now,
            activated_at: None,
            expires_at: None,
        }
    }

    /// Activates the record after an approved payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the current status does not allow activation.
    pub fn activate(&mut self, start: Timestamp, end: Timestamp) -> Result<(), DomainError> {
        self.transition(SubscriptionStatus::Active)?;
        self.activated_at = Some(start);
        self.expires_at = Some(end);
        Ok(())
    }

    /// Cancels the record, collapsing its expiry to `now` so the next sweep
    /// revokes access promptly.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not active.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(SubscriptionStatus::Cancelled)?;
        self.expires_at = Some(now);
        Ok(())
    }

    /// Finalizes the record to Expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition from the current status is not
    /// allowed.
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.transition(SubscriptionStatus::Expired)
    }

    /// True while the record's status still conveys access.
    pub fn has_access(&self) -> bool {
        self.status.has_access()
    }

    /// True when the record still conveys access but its expiry has passed.
    pub fn is_due_for_revocation(&self, now: Timestamp) -> bool {
        self.status.has_access() && self.expires_at.map(|e| e <= now).unwrap_or(false)
    }

    /// Remaining access time; None unless the record grants access with a
    /// future expiry.
    pub fn remaining(&self, now: Timestamp) -> Option<chrono::Duration> {
        let expires_at = self.expires_at?;
        if !self.status.has_access() || expires_at <= now {
            return None;
        }
        Some(expires_at.duration_since(&now))
    }

    fn transition(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::invalid_transition(format!(
                "cannot transition subscription from {:?} to {:?}",
                self.status, target
            ))
        })?;
        Ok(())
    }
}
