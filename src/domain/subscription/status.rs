//! Subscription status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Purchase intent issued (QR generated), payment not yet confirmed.
    /// No access.
    Pending,

    /// Payment approved; full access until `expires_at`.
    Active,

    /// User requested cancellation. Expiry is collapsed to the cancellation
    /// time; access lasts until the next sweep finalizes the record.
    Cancelled,

    /// Access revoked. A fresh purchase overwrites the record with a new
    /// pending one.
    Expired,
}

impl SubscriptionStatus {
    /// Returns true while the status still conveys VIP access.
    ///
    /// Cancelled records keep access until the sweep observes their
    /// collapsed expiry and finalizes them.
    pub fn has_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Cancelled)
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Pending, Active) | (Active, Cancelled) | (Active, Expired) | (Cancelled, Expired)
        )
    }
}
