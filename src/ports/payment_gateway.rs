//! Payment gateway port for the external Pix provider.
//!
//! The gateway is an opaque collaborator: it issues a charge (QR payload)
//! for a purchase intent and answers authoritative payment-status lookups
//! keyed by the provider's payment id. All calls are bounded by a timeout
//! in the adapter; a call failure must never hold a store lock open.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::PaymentId;

/// Request to create a Pix charge.
#[derive(Debug, Clone)]
pub struct CreateChargeRequest {
    /// Charge amount in integer cents.
    pub amount_cents: i64,

    /// Human-readable charge description.
    pub description: String,

    /// Reference correlating the charge with the purchase intent.
    pub external_reference: String,

    /// How long the charge stays payable.
    pub expires_in_secs: u64,
}

/// A Pix charge ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixCharge {
    /// Provider-assigned payment id.
    pub payment_id: PaymentId,

    /// Copy-paste Pix payload.
    pub qr_code: String,

    /// QR code image as base64 PNG.
    pub qr_code_base64: String,
}

/// Authoritative payment state fetched from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub id: PaymentId,
    pub status: PaymentStatus,
    pub external_reference: Option<String>,
}

/// Provider payment status.
///
/// Only `Approved` drives a state transition; every other status leaves
/// the subscription record pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Approved,
    Pending,
    InProcess,
    Rejected,
    Refunded,
    Cancelled,
    Unknown,
}

impl PaymentStatus {
    /// Maps the provider's status string; unrecognized values are Unknown.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "approved" => PaymentStatus::Approved,
            "pending" => PaymentStatus::Pending,
            "in_process" => PaymentStatus::InProcess,
            "rejected" => PaymentStatus::Rejected,
            "refunded" => PaymentStatus::Refunded,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Unknown,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentStatus::Approved)
    }
}

/// Errors from gateway calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connectivity or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Provider answered with a body we could not decode.
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// True when retrying the call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network(_) => true,
            GatewayError::Api { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Decode(_) => false,
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a Pix charge for a purchase intent.
    async fn create_charge(&self, request: CreateChargeRequest) -> Result<PixCharge, GatewayError>;

    /// Fetches the authoritative payment state by provider payment id.
    async fn get_payment(&self, id: &PaymentId) -> Result<PaymentDetails, GatewayError>;
}
