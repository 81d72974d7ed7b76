//! CancelSubscriptionHandler - immediate cancellation with prompt
//! revocation.
//!
//! Cancellation collapses the record's expiry to "now" and, when an
//! access channel is configured, removes the recipient right away with
//! the ban/unban pair. The sweep is the safety net if either platform
//! call fails.

use std::sync::Arc;

use crate::domain::foundation::{ChannelId, Clock, RecipientId, Timestamp};
use crate::domain::subscription::{SubscriptionError, SubscriptionStatus};
use crate::ports::{MemberGate, Messenger, SubscriptionStore};

const CANCELLED_NOTICE: &str = "✅ Sua assinatura foi cancelada e o acesso ao VIP foi removido.\nSe quiser voltar, é só escolher um novo plano.";

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub recipient: RecipientId,
    pub cancelled_at: Timestamp,
}

/// Handler for explicit cancellation requests.
pub struct CancelSubscriptionHandler {
    store: Arc<dyn SubscriptionStore>,
    member_gate: Arc<dyn MemberGate>,
    messenger: Arc<dyn Messenger>,
    clock: Arc<dyn Clock>,
    channel: Option<ChannelId>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        member_gate: Arc<dyn MemberGate>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
        channel: Option<ChannelId>,
    ) -> Self {
        Self {
            store,
            member_gate,
            messenger,
            clock,
            channel,
        }
    }

    pub async fn handle(
        &self,
        recipient: RecipientId,
    ) -> Result<CancellationOutcome, SubscriptionError> {
        let current = self.store.get_current(recipient).await?;
        match current {
            Some(record) if record.status == SubscriptionStatus::Active => {}
            _ => return Err(SubscriptionError::NotActive(recipient)),
        }

        let now = self.clock.now();
        self.store.cancel(recipient, now).await?;

        if let Some(channel) = self.channel {
            match self.member_gate.ban(channel, recipient).await {
                Ok(()) => {
                    if let Err(e) = self.member_gate.unban(channel, recipient).await {
                        tracing::warn!(
                            recipient_id = recipient.as_i64(),
                            error = %e,
                            "unban after cancellation failed; recipient stays blocked until next purchase support"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        recipient_id = recipient.as_i64(),
                        error = %e,
                        "revocation on cancellation failed; sweep will retry"
                    );
                }
            }
        }

        if let Err(e) = self.messenger.send_text(recipient, CANCELLED_NOTICE).await {
            tracing::warn!(recipient_id = recipient.as_i64(), error = %e, "cancellation notice failed");
        }

        tracing::info!(recipient_id = recipient.as_i64(), "subscription cancelled");

        Ok(CancellationOutcome {
            recipient,
            cancelled_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::FileSubscriptionStore;
    use crate::domain::foundation::{FixedClock, Timestamp};
    use crate::domain::subscription::{Plan, SubscriptionRecord};
    use crate::ports::PlatformError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    const CHANNEL: ChannelId = ChannelId::new(-1001234567890);

    struct RecordingGate {
        bans: AtomicU32,
        unbans: AtomicU32,
        fail: bool,
    }

    impl RecordingGate {
        fn new() -> Self {
            Self {
                bans: AtomicU32::new(0),
                unbans: AtomicU32::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                bans: AtomicU32::new(0),
                unbans: AtomicU32::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl MemberGate for RecordingGate {
        async fn ban(
            &self,
            _channel: ChannelId,
            _recipient: RecipientId,
        ) -> Result<(), PlatformError> {
            if self.fail {
                return Err(PlatformError::Api("bot is not an admin".to_string()));
            }
            self.bans.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn unban(
            &self,
            _channel: ChannelId,
            _recipient: RecipientId,
        ) -> Result<(), PlatformError> {
            self.unbans.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RecordingMessenger {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingMessenger {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_text(
            &self,
            _recipient: RecipientId,
            text: &str,
        ) -> Result<(), PlatformError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn send_with_link(
            &self,
            _recipient: RecipientId,
            text: &str,
            _label: &str,
            _url: &str,
        ) -> Result<(), PlatformError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    async fn active_store(dir: &TempDir, recipient: i64) -> Arc<FileSubscriptionStore> {
        let store = Arc::new(
            FileSubscriptionStore::open(dir.path().join("subscriptions.json"))
                .await
                .unwrap(),
        );
        let record = SubscriptionRecord::new_pending(
            RecipientId::new(recipient),
            Plan::Days30,
            990,
            format!("{}|P30|1700000000000", recipient),
            Timestamp::from_unix_millis(1_700_000_000_000),
        );
        let reference = record.external_reference.clone();
        store.upsert_pending(record).await.unwrap();
        store
            .activate(
                &reference,
                Timestamp::from_unix_millis(1_700_000_100_000),
                Timestamp::from_unix_millis(1_700_000_100_000).add_days(30),
            )
            .await
            .unwrap();
        store
    }

    fn build(
        store: Arc<FileSubscriptionStore>,
        gate: Arc<RecordingGate>,
        messenger: Arc<RecordingMessenger>,
        channel: Option<ChannelId>,
    ) -> CancelSubscriptionHandler {
        let clock = Arc::new(FixedClock::at(Timestamp::from_unix_millis(
            1_700_000_200_000,
        )));
        CancelSubscriptionHandler::new(store, gate, messenger, clock, channel)
    }

    #[tokio::test]
    async fn cancel_active_subscription_collapses_expiry_and_revokes() {
        let dir = TempDir::new().unwrap();
        let store = active_store(&dir, 555).await;
        let gate = Arc::new(RecordingGate::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let handler = build(store.clone(), gate.clone(), messenger.clone(), Some(CHANNEL));

        let outcome = handler.handle(RecipientId::new(555)).await.unwrap();

        assert_eq!(outcome.cancelled_at, Timestamp::from_unix_millis(1_700_000_200_000));
        let record = store
            .get_current(RecipientId::new(555))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, SubscriptionStatus::Cancelled);
        assert_eq!(record.expires_at, Some(outcome.cancelled_at));

        assert_eq!(gate.bans.load(Ordering::SeqCst), 1);
        assert_eq!(gate.unbans.load(Ordering::SeqCst), 1);
        assert_eq!(messenger.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancel_without_active_subscription_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            FileSubscriptionStore::open(dir.path().join("subscriptions.json"))
                .await
                .unwrap(),
        );
        let handler = build(
            store,
            Arc::new(RecordingGate::new()),
            Arc::new(RecordingMessenger::new()),
            Some(CHANNEL),
        );

        let result = handler.handle(RecipientId::new(555)).await;
        assert!(matches!(result, Err(SubscriptionError::NotActive(_))));
    }

    #[tokio::test]
    async fn cancel_without_channel_skips_revocation() {
        let dir = TempDir::new().unwrap();
        let store = active_store(&dir, 555).await;
        let gate = Arc::new(RecordingGate::new());
        let handler = build(
            store.clone(),
            gate.clone(),
            Arc::new(RecordingMessenger::new()),
            None,
        );

        handler.handle(RecipientId::new(555)).await.unwrap();

        assert_eq!(gate.bans.load(Ordering::SeqCst), 0);
        let record = store
            .get_current(RecipientId::new(555))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancellation_stands_when_revocation_fails() {
        let dir = TempDir::new().unwrap();
        let store = active_store(&dir, 555).await;
        let handler = build(
            store.clone(),
            Arc::new(RecordingGate::failing()),
            Arc::new(RecordingMessenger::new()),
            Some(CHANNEL),
        );

        let result = handler.handle(RecipientId::new(555)).await;

        assert!(result.is_ok());
        let record = store
            .get_current(RecipientId::new(555))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, SubscriptionStatus::Cancelled);
    }
}
