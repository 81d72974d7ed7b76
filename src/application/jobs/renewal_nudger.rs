//! Renewal nudger - cooldown-gated renewal offers to lapsed recipients.
//!
//! Periodically offers a new plan to recipients whose subscription has
//! expired. Every send goes through the cooldown gate, so however often
//! the job runs, no recipient hears from it more than once per configured
//! gap. The payment-approval grant message never passes through here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::foundation::{Clock, DomainError};
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::{CooldownGate, Messenger, SubscriptionStore};

const RENEWAL_OFFER: &str =
    "🔥 Sentimos sua falta no VIP! Renove agora em /planos e volte a ter acesso completo.";

/// Timer-driven job nudging lapsed recipients.
pub struct RenewalNudger {
    store: Arc<dyn SubscriptionStore>,
    messenger: Arc<dyn Messenger>,
    cooldown: Arc<dyn CooldownGate>,
    clock: Arc<dyn Clock>,
    send_delay: Duration,
}

impl RenewalNudger {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        messenger: Arc<dyn Messenger>,
        cooldown: Arc<dyn CooldownGate>,
        clock: Arc<dyn Clock>,
        send_delay: Duration,
    ) -> Self {
        Self {
            store,
            messenger,
            cooldown,
            clock,
            send_delay,
        }
    }

    /// One pass over lapsed recipients. Returns how many were nudged.
    ///
    /// Send failures are logged per recipient and leave their cooldown
    /// unmarked, so the next pass retries them. Store and cooldown
    /// failures propagate.
    pub async fn run_once(&self) -> Result<usize, DomainError> {
        let now = self.clock.now();
        let mut nudged = 0;

        for record in self.store.list_all().await? {
            if record.status != SubscriptionStatus::Expired {
                continue;
            }
            let recipient = record.recipient_id;

            if !self.cooldown.can_send(recipient, now).await? {
                continue;
            }

            match self.messenger.send_text(recipient, RENEWAL_OFFER).await {
                Ok(()) => {
                    self.cooldown.mark_sent(recipient, now).await?;
                    nudged += 1;
                    if !self.send_delay.is_zero() {
                        tokio::time::sleep(self.send_delay).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        recipient_id = recipient.as_i64(),
                        error = %e,
                        "renewal nudge failed"
                    );
                }
            }
        }

        if nudged > 0 {
            tracing::info!(nudged, "renewal nudge pass finished");
        }

        Ok(nudged)
    }

    /// Runs until `shutdown` flips. An in-flight pass always completes.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "renewal nudge pass failed");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    }
}
