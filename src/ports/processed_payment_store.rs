//! Processed-payment set port.
//!
//! Webhook delivery is at-least-once by provider design: redeliveries
//! happen on non-2xx responses, timeouts, and provider retries. This set
//! is consulted before applying any webhook-driven transition and
//! guarantees at-most-once activation per payment id.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId};

#[async_trait]
pub trait ProcessedPaymentStore: Send + Sync {
    /// Returns true if this payment id was already applied.
    async fn contains(&self, payment_id: &PaymentId) -> Result<bool, DomainError>;

    /// Records the payment id as applied. Idempotent.
    async fn mark_processed(&self, payment_id: PaymentId) -> Result<(), DomainError>;
}
