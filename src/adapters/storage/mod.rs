//! Storage adapters.
//!
//! JSON-file persistence with a full-file rewrite per mutation; adequate
//! for the single-process, low-volume deployment this service targets.

mod file_cooldown_map;
mod file_subscription_store;
mod in_memory_processed_payments;

pub use file_cooldown_map::FileCooldownMap;
pub use file_subscription_store::FileSubscriptionStore;
pub use in_memory_processed_payments::InMemoryProcessedPayments;
