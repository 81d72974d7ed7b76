//! CreatePurchaseHandler - issues a Pix charge and records the pending
//! purchase intent.

use std::sync::Arc;

use crate::config::PlansConfig;
use crate::domain::foundation::{Clock, RecipientId};
use crate::domain::subscription::{ExternalReference, Plan, SubscriptionError, SubscriptionRecord};
use crate::ports::{CreateChargeRequest, PaymentGateway, PixCharge, SubscriptionStore};

/// Charges stay payable for 24 hours, the provider default.
const CHARGE_TTL_SECS: u64 = 86_400;

/// Command to start a purchase.
#[derive(Debug, Clone)]
pub struct CreatePurchaseCommand {
    pub recipient: RecipientId,
    pub plan: Plan,
}

/// Result of a purchase intent: the charge to present plus the recorded
/// reference.
#[derive(Debug, Clone)]
pub struct PurchaseCreated {
    pub charge: PixCharge,
    pub external_reference: String,
    pub amount_cents: i64,
}

/// Handler for purchase intents.
pub struct CreatePurchaseHandler {
    store: Arc<dyn SubscriptionStore>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
    plans: PlansConfig,
}

impl CreatePurchaseHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        plans: PlansConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            clock,
            plans,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePurchaseCommand,
    ) -> Result<PurchaseCreated, SubscriptionError> {
        let now = self.clock.now();
        let amount_cents = self.plans.price_cents(cmd.plan);
        let reference = ExternalReference::issue(cmd.recipient, cmd.plan, now);

        let charge = self
            .gateway
            .create_charge(CreateChargeRequest {
                amount_cents,
                description: format!(
                    "Acesso VIP {} - R$ {:.2}",
                    cmd.plan,
                    amount_cents as f64 / 100.0
                ),
                external_reference: reference.as_str().to_string(),
                expires_in_secs: CHARGE_TTL_SECS,
            })
            .await
            .map_err(|e| SubscriptionError::UpstreamFetch(e.to_string()))?;

        let record = SubscriptionRecord::new_pending(
            cmd.recipient,
            cmd.plan,
            amount_cents,
            reference.as_str(),
            now,
        );
        self.store.upsert_pending(record).await?;

        tracing::info!(
            recipient_id = cmd.recipient.as_i64(),
            payment_id = %charge.payment_id,
            plan = %cmd.plan,
            "Pix charge issued for purchase intent"
        );

        Ok(PurchaseCreated {
            charge,
            external_reference: reference.as_str().to_string(),
            amount_cents,
        })
    }
}
