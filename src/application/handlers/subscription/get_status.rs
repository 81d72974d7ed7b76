//! GetSubscriptionStatusHandler - read-only status query for the
//! conversational front end.

use std::sync::Arc;

use crate::domain::foundation::{Clock, RecipientId, Timestamp};
use crate::domain::subscription::{Plan, SubscriptionError, SubscriptionStatus};
use crate::ports::SubscriptionStore;

/// Recipient-facing view of the current subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatusView {
    /// No record at all for this recipient.
    None,

    /// A purchase intent is awaiting payment confirmation.
    PendingPayment { plan: Plan },

    /// Access is granted until `expires_at`.
    Active {
        plan: Plan,
        expires_at: Timestamp,
        remaining_secs: i64,
    },

    /// The last subscription expired or was cancelled; a new purchase is
    /// required.
    Lapsed,
}

/// Handler answering status queries.
pub struct GetSubscriptionStatusHandler {
    store: Arc<dyn SubscriptionStore>,
    clock: Arc<dyn Clock>,
}

impl GetSubscriptionStatusHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn handle(
        &self,
        recipient: RecipientId,
    ) -> Result<SubscriptionStatusView, SubscriptionError> {
        let now = self.clock.now();

        // A live subscription wins over a newer purchase intent.
        if let Some(record) = self.store.get_current(recipient).await? {
            if record.status == SubscriptionStatus::Active {
                if let Some(remaining) = record.remaining(now) {
                    return Ok(SubscriptionStatusView::Active {
                        plan: record.plan,
                        expires_at: record.expires_at.unwrap_or(now),
                        remaining_secs: remaining.num_seconds(),
                    });
                }
            }
        }

        if let Some(pending) = self.store.get_pending(recipient).await? {
            return Ok(SubscriptionStatusView::PendingPayment {
                plan: pending.plan,
            });
        }

        if self.store.get_current(recipient).await?.is_some() {
            return Ok(SubscriptionStatusView::Lapsed);
        }

        Ok(SubscriptionStatusView::None)
    }
}
