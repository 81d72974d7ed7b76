//! Background job scheduling configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Scheduling knobs for the timer-driven jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Seconds between expiration sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Seconds between renewal-nudge passes
    #[serde(default = "default_nudge_interval_secs")]
    pub nudge_interval_secs: u64,

    /// Minimum gap between promotional pushes to one recipient
    #[serde(default = "default_min_push_gap_secs")]
    pub min_push_gap_secs: u64,

    /// Pause between successive outbound sends inside a batch, to respect
    /// the messaging platform's rate limits
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
}

impl JobsConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn nudge_interval(&self) -> Duration {
        Duration::from_secs(self.nudge_interval_secs)
    }

    pub fn min_push_gap(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.min_push_gap_secs as i64)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    /// Validate job configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            nudge_interval_secs: default_nudge_interval_secs(),
            min_push_gap_secs: default_min_push_gap_secs(),
            send_delay_ms: default_send_delay_ms(),
        }
    }
}

// Sweep every five minutes
fn default_sweep_interval_secs() -> u64 {
    300
}

// Nudge lapsed recipients every six hours
fn default_nudge_interval_secs() -> u64 {
    21_600
}

// At most one promotional push per recipient every three hours
fn default_min_push_gap_secs() -> u64 {
    10_800
}

fn default_send_delay_ms() -> u64 {
    300
}
