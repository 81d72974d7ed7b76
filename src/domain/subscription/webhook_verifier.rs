//! Payment-provider webhook signature verification.
//!
//! The provider signs each delivery with HMAC-SHA256 over a canonical
//! manifest built from the event id, the request-id header, and the
//! signature timestamp. The digest arrives in the `x-signature` header
//! shaped `ts=<unix>,v1=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

/// Parsed components of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp the provider stamped on the signature.
    pub timestamp: i64,
    /// v1 digest (HMAC-SHA256), hex-decoded.
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses a signature header string.
    ///
    /// Format: `ts=<timestamp>,v1=<hex>`. Unknown fields are ignored for
    /// forward compatibility.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the header is malformed or
    /// either required field is missing.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "ts" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown fields
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
        })
    }
}

/// Verifier for payment-provider webhook signatures.
pub struct PixWebhookVerifier {
    /// Pre-shared webhook secret from the provider dashboard.
    secret: String,
}

impl PixWebhookVerifier {
    /// Creates a new verifier with the given webhook secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Validates that the delivery was signed by the provider.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Build the manifest `id:<eventId>;request-id:<requestId>;ts:<ts>;`
    /// 3. Compute the expected HMAC-SHA256 digest
    /// 4. Compare digests in constant time
    ///
    /// The timestamp is covered by the MAC but carries no freshness window;
    /// the provider does not document one for this scheme.
    ///
    /// # Errors
    ///
    /// - `ParseError` - malformed signature header
    /// - `InvalidSignature` - digest mismatch
    pub fn verify(
        &self,
        signature_header: &str,
        request_id: &str,
        event_id: &str,
    ) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let expected = self.compute_signature(header.timestamp, request_id, event_id);

        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Canonical manifest string the provider signs.
    fn manifest(timestamp: i64, request_id: &str, event_id: &str) -> String {
        format!("id:{event_id};request-id:{request_id};ts:{timestamp};")
    }

    /// Computes the HMAC-SHA256 digest over the manifest.
    fn compute_signature(&self, timestamp: i64, request_id: &str, event_id: &str) -> Vec<u8> {
        let manifest = Self::manifest(timestamp, request_id, event_id);

        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(manifest.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// Prevents timing attacks that could leak the expected digest.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes the hex digest for test fixtures.
#[cfg(test)]
pub fn sign_manifest(secret: &str, timestamp: i64, request_id: &str, event_id: &str) -> String {
    let manifest = format!("id:{event_id};request-id:{request_id};ts:{timestamp};");
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(manifest.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
