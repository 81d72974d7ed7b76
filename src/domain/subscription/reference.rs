//! External payment reference.
//!
//! Correlates a purchase intent with its eventual payment confirmation and
//! doubles as the lookup key across the purchase -> webhook round trip.
//! Wire format: `"<recipientId>|P<days>|<issuedMillis>"`. References from
//! older bot versions carried only the bare recipient id.

use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{RecipientId, Timestamp};

use super::Plan;

/// Errors from decoding a raw reference string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceParseError {
    #[error("external reference is empty")]
    Empty,

    #[error("external reference has no usable recipient id: {0:?}")]
    InvalidRecipient(String),
}

/// Value object wrapping the reference string sent to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference(String);

impl ExternalReference {
    /// Builds the reference for a new purchase intent.
    pub fn issue(recipient: RecipientId, plan: Plan, issued_at: Timestamp) -> Self {
        Self(format!(
            "{}|{}|{}",
            recipient,
            plan.code(),
            issued_at.as_unix_millis()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers the recipient and plan from a raw reference.
    ///
    /// Bare numeric references (the pre-plan format) resolve to the 30-day
    /// plan. A zero recipient id is rejected: the provider reports missing
    /// references as empty or zero values.
    pub fn parse(raw: &str) -> Result<(RecipientId, Plan), ReferenceParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ReferenceParseError::Empty);
        }

        let mut parts = raw.split('|');
        let id_part = parts.next().unwrap_or_default();
        let recipient: i64 = id_part
            .parse()
            .map_err(|_| ReferenceParseError::InvalidRecipient(id_part.to_string()))?;
        if recipient == 0 {
            return Err(ReferenceParseError::InvalidRecipient(id_part.to_string()));
        }

        let plan = match parts.next() {
            Some(code) => Plan::from_code(code),
            None => Plan::Days30,
        };

        Ok((RecipientId::new(recipient), plan))
    }
}

impl fmt::Display for ExternalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
