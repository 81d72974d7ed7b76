//! File-backed recipient cooldown map.
//!
//! Maps recipient -> Unix milliseconds of the last throttled send, mirrored
//! to disk on every write so restarts keep prior cooldowns. Reads and
//! writes share one async mutex; the write commits to memory only after
//! the file write succeeds.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Duration;
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, RecipientId, Timestamp};
use crate::ports::CooldownGate;

/// File-backed implementation of the cooldown gate.
pub struct FileCooldownMap {
    path: PathBuf,
    min_gap: Duration,
    state: Mutex<HashMap<RecipientId, i64>>,
}

impl FileCooldownMap {
    /// Opens the map, loading existing timestamps from `path` if present.
    pub async fn open(path: impl AsRef<Path>, min_gap: Duration) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                DomainError::persistence(format!("corrupt cooldown map {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
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
            min_gap,
            state: Mutex::new(state),
        })
    }

    async fn persist(&self, map: &HashMap<RecipientId, i64>) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::persistence(e.to_string()))?;
        }

        let raw =
            serde_json::to_string_pretty(map).map_err(|e| DomainError::persistence(e.to_string()))?;

        fs::write(&self.path, raw)
            .await
            .map_err(|e| DomainError::persistence(e.to_string()))
    }
}

/// An unseen recipient's last send defaults to epoch zero, so the gap has
/// always elapsed for them.
fn gap_elapsed(last_sent_millis: i64, now_millis: i64, min_gap_millis: i64) -> bool {
    now_millis.saturating_sub(last_sent_millis) >= min_gap_millis
}

#[async_trait]
impl CooldownGate for FileCooldownMap {
    async fn can_send(&self, recipient: RecipientId, now: Timestamp) -> Result<bool, DomainError> {
        let state = self.state.lock().await;
        let last = state.get(&recipient).copied().unwrap_or(0);
        Ok(gap_elapsed(last, now.as_unix_millis(), self.min_gap.num_milliseconds()))
    }

    async fn mark_sent(&self, recipient: RecipientId, now: Timestamp) -> Result<(), DomainError> {
        let mut guard = self.state.lock().await;
        let mut scratch = guard.clone();
        scratch.insert(recipient, now.as_unix_millis());
        self.persist(&scratch).await?;
        *guard = scratch;
        Ok(())
    }
}
