//! Expiration sweeper - timer-driven revocation of lapsed access.
//!
//! Every interval the sweeper asks the store for records whose expiry has
//! passed, removes each recipient from the VIP group (ban followed by
//! unban, so a future purchase lets them rejoin), sends the expiration
//! notice, and finalizes the record so the next pass skips it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::foundation::{ChannelId, Clock, DomainError, RecipientId};
use crate::ports::{MemberGate, Messenger, PlatformError, SubscriptionStore};

const EXPIRED_NOTICE: &str = "⛔ Seu plano VIP expirou. Para continuar, renove em /planos.";

/// Counters from one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Records finalized this pass.
    pub swept: usize,

    /// Platform calls (ban/unban/notice) that failed and were skipped.
    pub platform_failures: usize,
}

/// Timer-driven job revoking expired access.
pub struct ExpirationSweeper {
    store: Arc<dyn SubscriptionStore>,
    member_gate: Arc<dyn MemberGate>,
    messenger: Arc<dyn Messenger>,
    clock: Arc<dyn Clock>,
    channel: Option<ChannelId>,
    send_delay: Duration,
}

impl ExpirationSweeper {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        member_gate: Arc<dyn MemberGate>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
        channel: Option<ChannelId>,
        send_delay: Duration,
    ) -> Self {
        Self {
            store,
            member_gate,
            messenger,
            clock,
            channel,
            send_delay,
        }
    }

    /// One pass over everything due for revocation.
    ///
    /// Platform failures are logged per recipient and never abort the
    /// batch; the record is finalized regardless so the next pass does not
    /// revisit it. Store failures propagate.
    ///
    /// With no access channel configured the sweep is a no-op.
    pub async fn run_once(&self) -> Result<SweepReport, DomainError> {
        let Some(channel) = self.channel else {
            tracing::debug!("no access channel configured; skipping sweep");
            return Ok(SweepReport::default());
        };

        let now = self.clock.now();
        let expired = self.store.list_expired(now).await?;
        let mut report = SweepReport::default();

        for record in expired {
            let recipient = record.recipient_id;

            if let Err(e) = self.revoke(channel, recipient).await {
                report.platform_failures += 1;
                tracing::warn!(
                    recipient_id = recipient.as_i64(),
                    error = %e,
                    "revocation call failed; finalizing record anyway"
                );
            }

            if let Err(e) = self.messenger.send_text(recipient, EXPIRED_NOTICE).await {
                report.platform_failures += 1;
                tracing::warn!(
                    recipient_id = recipient.as_i64(),
                    error = %e,
                    "expiration notice failed"
                );
            }

            self.store.deactivate(recipient).await?;
            report.swept += 1;
            tracing::info!(
                recipient_id = recipient.as_i64(),
                "subscription expired and access revoked"
            );

            if !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }
        }

        if report.swept > 0 {
            tracing::info!(
                swept = report.swept,
                platform_failures = report.platform_failures,
                "sweep pass finished"
            );
        }

        Ok(report)
    }

    /// Ban-then-unban so the recipient can rejoin after a future purchase.
    async fn revoke(
        &self,
        channel: ChannelId,
        recipient: RecipientId,
    ) -> Result<(), PlatformError> {
        self.member_gate.ban(channel, recipient).await?;
        self.member_gate.unban(channel, recipient).await
    }

    /// Runs until `shutdown` flips. An in-flight pass always completes;
    /// shutdown is observed only between iterations.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "sweep pass failed");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::FileSubscriptionStore;
    use crate::domain::foundation::{FixedClock, Timestamp};
    use crate::domain::subscription::{Plan, SubscriptionRecord, SubscriptionStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const CHANNEL: ChannelId = ChannelId::new(-1001234567890);

    #[derive(Default)]
    struct RecordingGate {
        bans: Mutex<Vec<RecipientId>>,
        unbans: Mutex<Vec<RecipientId>>,
        fail_for: Option<RecipientId>,
    }

    impl RecordingGate {
        fn failing_for(recipient: RecipientId) -> Self {
            Self {
                fail_for: Some(recipient),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl MemberGate for RecordingGate {
        async fn ban(
            &self,
            _channel: ChannelId,
            recipient: RecipientId,
        ) -> Result<(), PlatformError> {
            if self.fail_for == Some(recipient) {
                return Err(PlatformError::Api("user not in group".to_string()));
            }
            self.bans.lock().unwrap().push(recipient);
            Ok(())
        }

        async fn unban(
            &self,
            _channel: ChannelId,
            recipient: RecipientId,
        ) -> Result<(), PlatformError> {
            self.unbans.lock().unwrap().push(recipient);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(RecipientId, String)>>,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_text(
            &self,
            recipient: RecipientId,
            text: &str,
        ) -> Result<(), PlatformError> {
            self.sent.lock().unwrap().push((recipient, text.to_string()));
            Ok(())
        }

        async fn send_with_link(
            &self,
            recipient: RecipientId,
            text: &str,
            _label: &str,
            _url: &str,
        ) -> Result<(), PlatformError> {
            self.sent.lock().unwrap().push((recipient, text.to_string()));
            Ok(())
        }
    }

    fn t(millis: i64) -> Timestamp {
        Timestamp::from_unix_millis(millis)
    }

    async fn store_with_active(
        dir: &TempDir,
        records: &[(i64, i64)], // (recipient, expires_at_millis)
    ) -> Arc<FileSubscriptionStore> {
        let store = Arc::new(
            FileSubscriptionStore::open(dir.path().join("subscriptions.json"))
                .await
                .unwrap(),
        );
        for (recipient, end_millis) in records {
            let record = SubscriptionRecord::new_pending(
                RecipientId::new(*recipient),
                Plan::Days15,
                590,
                format!("{}|P15|1700000000000", recipient),
                t(0),
            );
            let reference = record.external_reference.clone();
            store.upsert_pending(record).await.unwrap();
            store.activate(&reference, t(0), t(*end_millis)).await.unwrap();
        }
        store
    }

    fn sweeper(
        store: Arc<FileSubscriptionStore>,
        gate: Arc<RecordingGate>,
        messenger: Arc<RecordingMessenger>,
        channel: Option<ChannelId>,
        now_millis: i64,
    ) -> ExpirationSweeper {
        ExpirationSweeper::new(
            store,
            gate,
            messenger,
            Arc::new(FixedClock::at(t(now_millis))),
            channel,
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn sweep_revokes_and_finalizes_expired_records() {
        let dir = TempDir::new().unwrap();
        let store = store_with_active(&dir, &[(1, 10_000), (2, 99_000_000)]).await;
        let gate = Arc::new(RecordingGate::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let sweeper = sweeper(store.clone(), gate.clone(), messenger.clone(), Some(CHANNEL), 10_000);

        let report = sweeper.run_once().await.unwrap();

        assert_eq!(report, SweepReport { swept: 1, platform_failures: 0 });
        assert_eq!(*gate.bans.lock().unwrap(), vec![RecipientId::new(1)]);
        assert_eq!(*gate.unbans.lock().unwrap(), vec![RecipientId::new(1)]);
        assert_eq!(messenger.sent.lock().unwrap().len(), 1);

        let record = store.get_current(RecipientId::new(1)).await.unwrap().unwrap();
        assert_eq!(record.status, SubscriptionStatus::Expired);
        // Record 2 is untouched.
        let record = store.get_current(RecipientId::new(2)).await.unwrap().unwrap();
        assert_eq!(record.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn swept_records_never_reappear_in_later_sweeps() {
        let dir = TempDir::new().unwrap();
        let store = store_with_active(&dir, &[(1, 10_000)]).await;
        let gate = Arc::new(RecordingGate::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let sweeper = sweeper(store.clone(), gate, messenger, Some(CHANNEL), 10_000);

        assert_eq!(sweeper.run_once().await.unwrap().swept, 1);
        assert_eq!(sweeper.run_once().await.unwrap().swept, 0);
        assert!(store.list_expired(t(99_999_999)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn platform_failure_does_not_abort_the_batch() {
        let dir = TempDir::new().unwrap();
        let store = store_with_active(&dir, &[(1, 10_000), (2, 10_000)]).await;
        let gate = Arc::new(RecordingGate::failing_for(RecipientId::new(1)));
        let messenger = Arc::new(RecordingMessenger::default());
        let sweeper = sweeper(store.clone(), gate.clone(), messenger.clone(), Some(CHANNEL), 10_000);

        let report = sweeper.run_once().await.unwrap();

        // Both records are finalized even though one revocation failed.
        assert_eq!(report.swept, 2);
        assert_eq!(report.platform_failures, 1);
        for recipient in [1, 2] {
            let record = store
                .get_current(RecipientId::new(recipient))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.status, SubscriptionStatus::Expired);
        }
        // The failing recipient still got the notice.
        assert_eq!(messenger.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sweep_without_channel_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let store = store_with_active(&dir, &[(1, 10_000)]).await;
        let gate = Arc::new(RecordingGate::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let sweeper = sweeper(store.clone(), gate.clone(), messenger.clone(), None, 10_000);

        let report = sweeper.run_once().await.unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(gate.bans.lock().unwrap().is_empty());
        // The record stays listed for when a channel is configured.
        assert_eq!(store.list_expired(t(10_000)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_record_is_revoked_by_the_immediately_following_sweep() {
        let dir = TempDir::new().unwrap();
        let store = store_with_active(&dir, &[(1, 99_000_000)]).await;
        let now = 10_000;
        store.cancel(RecipientId::new(1), t(now)).await.unwrap();

        let gate = Arc::new(RecordingGate::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let sweeper = sweeper(store.clone(), gate.clone(), messenger, Some(CHANNEL), now);

        let report = sweeper.run_once().await.unwrap();

        assert_eq!(report.swept, 1);
        assert_eq!(*gate.bans.lock().unwrap(), vec![RecipientId::new(1)]);
        let record = store.get_current(RecipientId::new(1)).await.unwrap().unwrap();
        assert_eq!(record.status, SubscriptionStatus::Expired);
    }

    #[tokio::test]
    async fn run_loop_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let store = store_with_active(&dir, &[]).await;
        let sweeper = Arc::new(sweeper(
            store,
            Arc::new(RecordingGate::default()),
            Arc::new(RecordingMessenger::default()),
            Some(CHANNEL),
            0,
        ));

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(sweeper.run(Duration::from_millis(10), rx));

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("sweeper loop should stop on shutdown")
            .unwrap();
    }
}
