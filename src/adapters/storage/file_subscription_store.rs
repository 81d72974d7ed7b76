//! File-backed subscription store.
//!
//! Persists both maps (subscriptions and pending purchases) as a single
//! JSON document. Each mutation runs under one async mutex as a
//! read-modify-write-persist cycle: the change is applied to a scratch
//! copy and committed to memory only after the file write succeeds, so a
//! persistence failure never leaves memory ahead of disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, RecipientId, Timestamp};
use crate::domain::subscription::{ExternalReference, SubscriptionRecord};
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Database {
    #[serde(default)]
    subscriptions: HashMap<RecipientId, SubscriptionRecord>,
    #[serde(default)]
    pending: HashMap<RecipientId, SubscriptionRecord>,
}

/// File-backed implementation of the subscription store.
pub struct FileSubscriptionStore {
    path: PathBuf,
    state: Mutex<Database>,
}

impl FileSubscriptionStore {
    /// Opens the store, loading existing state from `path` if present.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or corrupt state files; a missing file starts
    /// an empty database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                DomainError::persistence(format!(
                    "corrupt subscription database {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Database::default(),
            Err(e) => {
                return Err(DomainError::persistence(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    async fn persist(&self, db: &Database) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::persistence(e.to_string()))?;
        }

        let raw = serde_json::to_string_pretty(db)
            .map_err(|e| DomainError::persistence(e.to_string()))?;

        fs::write(&self.path, raw)
            .await
            .map_err(|e| DomainError::persistence(e.to_string()))
    }

    /// Runs one transaction: mutate a scratch copy, persist it, then
    /// commit to memory.
    async fn mutate<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Database) -> Result<T, DomainError>,
    {
        let mut guard = self.state.lock().await;
        let mut scratch = guard.clone();
        let out = op(&mut scratch)?;
        self.persist(&scratch).await?;
        *guard = scratch;
        Ok(out)
    }
}

#[async_trait]
impl SubscriptionStore for FileSubscriptionStore {
    async fn upsert_pending(&self, record: SubscriptionRecord) -> Result<(), DomainError> {
        self.mutate(move |db| {
            db.pending.insert(record.recipient_id, record);
            Ok(())
        })
        .await
    }

    async fn get_pending(
        &self,
        recipient: RecipientId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.pending.get(&recipient).cloned())
    }

    async fn remove_pending(&self, recipient: RecipientId) -> Result<(), DomainError> {
        self.mutate(move |db| {
            db.pending.remove(&recipient);
            Ok(())
        })
        .await
    }

    async fn get_current(
        &self,
        recipient: RecipientId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.subscriptions.get(&recipient).cloned())
    }

    async fn activate(
        &self,
        reference: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError> {
        let reference = reference.to_string();
        self.mutate(move |db| {
            let (recipient, plan) = ExternalReference::parse(&reference)
                .map_err(|e| DomainError::validation(e.to_string()))?;

            let mut record = db.pending.remove(&recipient).unwrap_or_else(|| {
                // Old-format reference with no recorded purchase intent.
                SubscriptionRecord::new_pending(recipient, plan, 0, reference.clone(), start)
            });
            record.activate(start, end)?;

            db.subscriptions.insert(recipient, record.clone());
            Ok(record)
        })
        .await
    }

    async fn deactivate(&self, recipient: RecipientId) -> Result<(), DomainError> {
        self.mutate(move |db| {
            if let Some(record) = db.subscriptions.get_mut(&recipient) {
                if record.has_access() {
                    record.expire()?;
                }
            }
            Ok(())
        })
        .await
    }

    async fn cancel(
        &self,
        recipient: RecipientId,
        now: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError> {
        self.mutate(move |db| {
            let record = db.subscriptions.get_mut(&recipient).ok_or_else(|| {
                DomainError::not_found(format!("no subscription for recipient {}", recipient))
            })?;
            record.cancel(now)?;
            Ok(record.clone())
        })
        .await
    }

    async fn list_expired(&self, now: Timestamp) -> Result<Vec<SubscriptionRecord>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .subscriptions
            .values()
            .filter(|r| r.is_due_for_revocation(now))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<SubscriptionRecord>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.subscriptions.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::{Plan, SubscriptionStatus};
    use tempfile::TempDir;

    fn t(millis: i64) -> Timestamp {
        Timestamp::from_unix_millis(millis)
    }

    fn pending_record(recipient: i64, plan: Plan) -> SubscriptionRecord {
        let now = t(1_700_000_000_000);
        let reference = ExternalReference::issue(RecipientId::new(recipient), plan, now);
        SubscriptionRecord::new_pending(RecipientId::new(recipient), plan, 590, reference.as_str(), now)
    }

    async fn open_store(dir: &TempDir) -> FileSubscriptionStore {
        FileSubscriptionStore::open(dir.path().join("subscriptions.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upsert_and_get_pending() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let record = pending_record(555, Plan::Days15);
        store.upsert_pending(record.clone()).await.unwrap();

        let loaded = store.get_pending(RecipientId::new(555)).await.unwrap();
        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn upsert_pending_replaces_previous_intent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.upsert_pending(pending_record(555, Plan::Days15)).await.unwrap();
        store.upsert_pending(pending_record(555, Plan::Days30)).await.unwrap();

        let loaded = store.get_pending(RecipientId::new(555)).await.unwrap().unwrap();
        assert_eq!(loaded.plan, Plan::Days30);
    }

    #[tokio::test]
    async fn activate_promotes_pending_record() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let record = pending_record(555, Plan::Days15);
        let reference = record.external_reference.clone();
        store.upsert_pending(record).await.unwrap();

        let start = t(1_700_000_100_000);
        let end = start.add_days(15);
        let activated = store.activate(&reference, start, end).await.unwrap();

        assert_eq!(activated.status, SubscriptionStatus::Active);
        assert_eq!(activated.activated_at, Some(start));
        assert_eq!(activated.expires_at, Some(end));
        assert_eq!(activated.amount_cents, 590); // preserved from the intent

        // Pending entry is cleared, current record is queryable.
        assert!(store.get_pending(RecipientId::new(555)).await.unwrap().is_none());
        let current = store.get_current(RecipientId::new(555)).await.unwrap().unwrap();
        assert_eq!(current, activated);
    }

    #[tokio::test]
    async fn activate_synthesizes_record_for_bare_reference() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let start = t(1_000);
        let activated = store.activate("4242", start, start.add_days(30)).await.unwrap();

        assert_eq!(activated.recipient_id, RecipientId::new(4242));
        assert_eq!(activated.plan, Plan::Days30);
        assert_eq!(activated.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn activate_rejects_unparseable_reference() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let result = store.activate("not-a-reference", t(0), t(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subscriptions.json");

        {
            let store = FileSubscriptionStore::open(&path).await.unwrap();
            let record = pending_record(910, Plan::Days30);
            let reference = record.external_reference.clone();
            store.upsert_pending(record).await.unwrap();
            store.activate(&reference, t(1_000), t(1_000_000)).await.unwrap();
        }

        let reopened = FileSubscriptionStore::open(&path).await.unwrap();
        let current = reopened.get_current(RecipientId::new(910)).await.unwrap().unwrap();
        assert_eq!(current.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subscriptions.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result = FileSubscriptionStore::open(&path).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_expired_returns_only_due_records() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        // One record expiring early, one expiring late, one still pending.
        for (recipient, end_millis) in [(1, 10_000), (2, 99_000_000)] {
            let record = pending_record(recipient, Plan::Days15);
            let reference = record.external_reference.clone();
            store.upsert_pending(record).await.unwrap();
            store.activate(&reference, t(0), t(end_millis)).await.unwrap();
        }
        store.upsert_pending(pending_record(3, Plan::Days15)).await.unwrap();

        let expired = store.list_expired(t(10_000)).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].recipient_id, RecipientId::new(1));
    }

    #[tokio::test]
    async fn cancel_collapses_expiry_and_lists_as_expired() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let record = pending_record(555, Plan::Days30);
        let reference = record.external_reference.clone();
        store.upsert_pending(record).await.unwrap();
        store.activate(&reference, t(0), t(999_999_999)).await.unwrap();

        let now = t(50_000);
        let cancelled = store.cancel(RecipientId::new(555), now).await.unwrap();
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert_eq!(cancelled.expires_at, Some(now));

        // An immediate sweep at the same instant sees it.
        let expired = store.list_expired(now).await.unwrap();
        assert_eq!(expired.len(), 1);
    }

    #[tokio::test]
    async fn cancel_without_record_fails() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let result = store.cancel(RecipientId::new(404), t(0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn deactivate_removes_record_from_expired_listing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let record = pending_record(555, Plan::Days15);
        let reference = record.external_reference.clone();
        store.upsert_pending(record).await.unwrap();
        store.activate(&reference, t(0), t(10)).await.unwrap();

        assert_eq!(store.list_expired(t(10)).await.unwrap().len(), 1);

        store.deactivate(RecipientId::new(555)).await.unwrap();

        // Absent from this and all later sweeps.
        assert!(store.list_expired(t(10)).await.unwrap().is_empty());
        assert!(store.list_expired(t(99_999)).await.unwrap().is_empty());
        let current = store.get_current(RecipientId::new(555)).await.unwrap().unwrap();
        assert_eq!(current.status, SubscriptionStatus::Expired);
    }

    #[tokio::test]
    async fn deactivate_is_noop_for_unknown_recipient() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store.deactivate(RecipientId::new(404)).await.unwrap();
    }

    #[tokio::test]
    async fn remove_pending_drops_intent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.upsert_pending(pending_record(555, Plan::Days15)).await.unwrap();
        store.remove_pending(RecipientId::new(555)).await.unwrap();

        assert!(store.get_pending(RecipientId::new(555)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fresh_purchase_overwrites_lapsed_record() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        // First purchase, activated and expired.
        let record = pending_record(555, Plan::Days15);
        let reference = record.external_reference.clone();
        store.upsert_pending(record).await.unwrap();
        store.activate(&reference, t(0), t(10)).await.unwrap();
        store.deactivate(RecipientId::new(555)).await.unwrap();

        // Second purchase with a new reference.
        let next = ExternalReference::issue(RecipientId::new(555), Plan::Days30, t(20_000));
        let next_record = SubscriptionRecord::new_pending(
            RecipientId::new(555),
            Plan::Days30,
            990,
            next.as_str(),
            t(20_000),
        );
        store.upsert_pending(next_record).await.unwrap();
        let activated = store.activate(next.as_str(), t(30_000), t(30_000).add_days(30)).await.unwrap();

        assert_eq!(activated.plan, Plan::Days30);
        let current = store.get_current(RecipientId::new(555)).await.unwrap().unwrap();
        assert_eq!(current.status, SubscriptionStatus::Active);
        assert_eq!(current.amount_cents, 990);
    }
}
