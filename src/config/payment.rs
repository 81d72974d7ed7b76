//! Payment provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration (Mercado Pago)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// API access token for charge creation and payment lookup
    pub access_token: Secret<String>,

    /// Pre-shared HMAC key for webhook signature validation
    pub webhook_secret: Secret<String>,

    /// Payer email stamped on generated charges
    #[serde(default = "default_payer_email")]
    pub payer_email: String,

    /// API base URL (override for tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.access_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__ACCESS_TOKEN"));
        }
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        Ok(())
    }
}

fn default_payer_email() -> String {
    "payer@example.com".to_string()
}

fn default_base_url() -> String {
    "https://api.mercadopago.com".to_string()
}
