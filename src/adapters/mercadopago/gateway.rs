//! Mercado Pago REST client implementing the payment gateway port.
//!
//! Two calls are used: `POST /v1/payments` to issue a Pix charge and
//! `GET /v1/payments/{id}` for the authoritative status lookup during
//! webhook processing. Every request carries a bounded timeout so a slow
//! provider never holds a store lock open.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::PaymentId;
use crate::ports::{
    CreateChargeRequest, GatewayError, PaymentDetails, PaymentGateway, PaymentStatus, PixCharge,
};

pub const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Mercado Pago API client.
pub struct MercadoPagoGateway {
    http: reqwest::Client,
    base_url: String,
    access_token: Secret<String>,
    payer_email: String,
}

impl MercadoPagoGateway {
    /// Creates a client with the default production base URL.
    pub fn new(
        access_token: Secret<String>,
        payer_email: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token,
            payer_email: payer_email.into(),
        })
    }

    /// Overrides the base URL (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody<'a> {
    transaction_amount: f64,
    description: &'a str,
    payment_method_id: &'static str,
    payer: PayerBody<'a>,
    external_reference: &'a str,
    date_of_expiration: String,
}

#[derive(Debug, Serialize)]
struct PayerBody<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct PaymentCreated {
    id: i64,
    point_of_interaction: PointOfInteraction,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
    transaction_data: TransactionData,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    qr_code: String,
    qr_code_base64: String,
}

#[derive(Debug, Deserialize)]
struct PaymentFetched {
    id: i64,
    status: String,
    external_reference: Option<String>,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Api { status, body })
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_charge(&self, request: CreateChargeRequest) -> Result<PixCharge, GatewayError> {
        let expiration = Utc::now() + Duration::seconds(request.expires_in_secs as i64);
        let body = CreatePaymentBody {
            transaction_amount: request.amount_cents as f64 / 100.0,
            description: &request.description,
            payment_method_id: "pix",
            payer: PayerBody {
                email: &self.payer_email,
            },
            external_reference: &request.external_reference,
            date_of_expiration: expiration.to_rfc3339(),
        };

        // Unique per attempt so a retried call cannot duplicate the charge.
        let idempotency_key = format!("pix-{}-{}", request.external_reference, Uuid::new_v4());

        let response = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .header("Authorization", self.auth_header())
            .header("X-Idempotency-Key", idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let response = check_status(response).await?;
        let created: PaymentCreated = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        Ok(PixCharge {
            payment_id: PaymentId::new(created.id.to_string()),
            qr_code: created.point_of_interaction.transaction_data.qr_code,
            qr_code_base64: created.point_of_interaction.transaction_data.qr_code_base64,
        })
    }

    async fn get_payment(&self, id: &PaymentId) -> Result<PaymentDetails, GatewayError> {
        let response = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, id))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let response = check_status(response).await?;
        let fetched: PaymentFetched = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        Ok(PaymentDetails {
            id: PaymentId::new(fetched.id.to_string()),
            status: PaymentStatus::from_provider(&fetched.status),
            external_reference: fetched.external_reference,
        })
    }
}
