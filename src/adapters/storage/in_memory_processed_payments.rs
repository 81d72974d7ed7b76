//! In-memory processed-payment set.
//!
//! Dedupe lives for the process lifetime: the provider stops redelivering
//! once an event is acknowledged with 2xx, so a restart forgetting history
//! matches the guarantee the source system offers. The port boundary lets
//! a persistent adapter replace this one without touching the processor.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PaymentId};
use crate::ports::ProcessedPaymentStore;

/// Process-lifetime set of applied payment ids.
#[derive(Debug, Default)]
pub struct InMemoryProcessedPayments {
    seen: RwLock<HashSet<PaymentId>>,
}

impl InMemoryProcessedPayments {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedPaymentStore for InMemoryProcessedPayments {
    async fn contains(&self, payment_id: &PaymentId) -> Result<bool, DomainError> {
        Ok(self.seen.read().await.contains(payment_id))
    }

    async fn mark_processed(&self, payment_id: PaymentId) -> Result<(), DomainError> {
        self.seen.write().await.insert(payment_id);
        Ok(())
    }
}
