//! Clock abstraction for time-driven behavior.
//!
//! Handlers and jobs take the clock as a dependency so expiry and cooldown
//! logic can be tested against a fixed instant instead of wall time.

use std::sync::Mutex;

use super::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Manually-advanced clock for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<Timestamp>,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant.
    pub fn at(instant: Timestamp) -> Self {
        Self {
            current: Mutex::new(instant),
        }
    }

    /// Moves the clock to a new instant.
    pub fn set(&self, instant: Timestamp) {
        *self.current.lock().unwrap() = instant;
    }

    /// Advances the clock by the given number of seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut current = self.current.lock().unwrap();
        *current = current.plus_secs(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap()
    }
}
