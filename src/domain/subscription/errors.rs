//! Subscription processing error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, RecipientId};

use super::ReferenceParseError;

/// Errors from subscription commands and payment-event processing.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// Recipient has no subscription in a state the command accepts.
    #[error("subscription for recipient {0} is not active")]
    NotActive(RecipientId),

    /// The payment's external reference could not be decoded.
    #[error("malformed external reference: {0}")]
    ReferenceParse(#[from] ReferenceParseError),

    /// A payment-provider request failed; provider redelivery is the
    /// retry mechanism.
    #[error("payment provider request failed: {0}")]
    UpstreamFetch(String),

    /// The store could not persist a mutation. Never swallowed: it risks
    /// divergence between "payment approved" and "access granted".
    #[error("storage failure: {0}")]
    Persistence(String),

    /// A status change violated the lifecycle state machine.
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),
}

impl SubscriptionError {
    /// True when answering with an error status should trigger a provider
    /// redelivery that may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::UpstreamFetch(_) | SubscriptionError::Persistence(_)
        )
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => SubscriptionError::InvalidTransition(err.message),
            ErrorCode::ExternalServiceError => SubscriptionError::UpstreamFetch(err.message),
            _ => SubscriptionError::Persistence(err.message),
        }
    }
}
