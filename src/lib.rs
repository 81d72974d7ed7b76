//! VIP Gate - Pix-paid subscription engine.
//!
//! Receives payment-provider webhooks, drives subscription records through
//! the pending -> active -> expired/cancelled lifecycle exactly once per
//! payment event, sweeps expired access on a timer, and throttles
//! promotional pushes per recipient.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
