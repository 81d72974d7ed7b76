//! Timer-driven background jobs.
//!
//! Each job exposes `run_once` for deterministic tests and a `run` loop
//! that observes shutdown only between iterations, so an in-flight pass
//! always finishes before process exit.

mod expiration_sweeper;
mod renewal_nudger;

pub use expiration_sweeper::{ExpirationSweeper, SweepReport};
pub use renewal_nudger::RenewalNudger;
