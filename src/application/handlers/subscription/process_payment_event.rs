//! ProcessPaymentEventHandler - drives at most one state transition per
//! authenticated payment event.
//!
//! ## Steps
//!
//! 1. Non-"payment" event kinds are acknowledged and dropped
//! 2. Already-applied payment ids are acknowledged as duplicates
//! 3. The authoritative payment state is fetched from the gateway
//! 4. Non-approved payments leave the record pending
//! 5. Approved payments mark the id applied, activate the record for the
//!    plan's duration, and dispatch the access-grant message
//!
//! Webhook delivery is at-least-once; the processed-payment set is what
//! keeps replays from extending or re-announcing a subscription.

use std::sync::Arc;

use crate::domain::foundation::{Clock, PaymentId, RecipientId};
use crate::domain::subscription::{ExternalReference, Plan, SubscriptionError};
use crate::ports::{
    Messenger, PaymentGateway, PaymentStatus, ProcessedPaymentStore, SubscriptionStore,
};

/// Authenticated webhook event, ready for processing.
#[derive(Debug, Clone)]
pub struct ProcessPaymentCommand {
    /// Provider payment id recovered by the signature verifier.
    pub payment_id: PaymentId,
    /// Declared event kind from the webhook body.
    pub kind: String,
}

/// What processing did with the event.
///
/// Every variant is acknowledged with success at the HTTP boundary; only
/// `Err` results surface as processing failures there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventOutcome {
    /// Subscription activated and grant message dispatched.
    Activated { recipient: RecipientId, plan: Plan },

    /// Event kind is not "payment".
    Ignored,

    /// Payment id was already applied; replay suppressed.
    Duplicate,

    /// Provider reports a non-approved status; the record stays pending.
    NotApproved(PaymentStatus),

    /// Reference could not be decoded; activation skipped.
    UnparseableReference,
}

/// Handler consuming verified payment events.
pub struct ProcessPaymentEventHandler {
    store: Arc<dyn SubscriptionStore>,
    processed: Arc<dyn ProcessedPaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    messenger: Arc<dyn Messenger>,
    clock: Arc<dyn Clock>,
    invite_link: String,
}

impl ProcessPaymentEventHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        processed: Arc<dyn ProcessedPaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
        invite_link: impl Into<String>,
    ) -> Self {
        Self {
            store,
            processed,
            gateway,
            messenger,
            clock,
            invite_link: invite_link.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessPaymentCommand,
    ) -> Result<PaymentEventOutcome, SubscriptionError> {
        if cmd.kind != "payment" {
            tracing::debug!(kind = %cmd.kind, "ignoring non-payment event");
            return Ok(PaymentEventOutcome::Ignored);
        }

        if self.processed.contains(&cmd.payment_id).await? {
            tracing::info!(payment_id = %cmd.payment_id, "duplicate payment event suppressed");
            return Ok(PaymentEventOutcome::Duplicate);
        }

        let payment = self
            .gateway
            .get_payment(&cmd.payment_id)
            .await
            .map_err(|e| SubscriptionError::UpstreamFetch(e.to_string()))?;
        tracing::info!(payment_id = %cmd.payment_id, status = ?payment.status, "payment details fetched");

        if !payment.status.is_approved() {
            return Ok(PaymentEventOutcome::NotApproved(payment.status));
        }

        self.processed.mark_processed(cmd.payment_id.clone()).await?;

        let reference = payment.external_reference.unwrap_or_default();
        let (recipient, plan) = match ExternalReference::parse(&reference) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    payment_id = %cmd.payment_id,
                    reference = %reference,
                    error = %e,
                    "cannot resolve recipient from external reference; skipping activation"
                );
                return Ok(PaymentEventOutcome::UnparseableReference);
            }
        };

        let activated_at = self.clock.now();
        let expires_at = activated_at.add_days(plan.duration_days());
        let record = self.store.activate(&reference, activated_at, expires_at).await?;

        let text = format!(
            "✅ Pagamento aprovado!\nPlano: {}\nVálido até: {}\n\nClique para entrar no grupo VIP:",
            plan,
            expires_at.as_datetime().format("%d/%m/%Y %H:%M"),
        );
        if let Err(e) = self
            .messenger
            .send_with_link(recipient, &text, "Entrar no Grupo VIP", &self.invite_link)
            .await
        {
            // The activation is already durable and the payment id marked;
            // failing here would only trigger a redelivery that dedupes.
            tracing::warn!(
                recipient_id = recipient.as_i64(),
                error = %e,
                "grant message failed; activation stands"
            );
        }

        tracing::info!(
            recipient_id = recipient.as_i64(),
            payment_id = %cmd.payment_id,
            plan = %record.plan,
            expires_at = %expires_at,
            "subscription activated"
        );

        Ok(PaymentEventOutcome::Activated {
            recipient: record.recipient_id,
            plan: record.plan,
        })
    }
}
