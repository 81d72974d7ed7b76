//! Webhook authentication error types.

use thiserror::Error;

/// Errors from webhook signature validation.
///
/// Every variant is recoverable by rejecting the request with 401; none is
/// fatal to the process, and none triggers internal retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Neither signature header variant was present.
    #[error("missing signature header")]
    MissingSignature,

    /// The request-id header was absent.
    #[error("missing request-id header")]
    MissingRequestId,

    /// No event id in the query string or request body.
    #[error("missing event id")]
    MissingEventId,

    /// The signature header could not be parsed.
    #[error("malformed signature header: {0}")]
    ParseError(String),

    /// The computed digest did not match the delivered one.
    #[error("invalid signature")]
    InvalidSignature,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(WebhookError::InvalidSignature.to_string(), "invalid signature");
    }

    #[test]
    fn parse_error_displays_reason() {
        let err = WebhookError::ParseError("missing v1".to_string());
        assert_eq!(err.to_string(), "malformed signature header: missing v1");
    }
}
