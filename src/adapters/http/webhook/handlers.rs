//! HTTP handlers for the webhook endpoint.
//!
//! The provider redelivers on any non-2xx answer, so the status code is
//! the retry contract: 200 acknowledges (including duplicates and ignored
//! kinds), 401 covers signature failures and unrecoverable processing
//! errors.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::subscription::{
    PaymentEventOutcome, ProcessPaymentCommand, ProcessPaymentEventHandler,
};
use crate::domain::foundation::PaymentId;
use crate::domain::subscription::{PixWebhookVerifier, WebhookError};

use super::dto::{WebhookBody, WebhookQuery};

/// Shared state for the webhook router.
#[derive(Clone)]
pub struct WebhookAppState {
    pub verifier: Arc<PixWebhookVerifier>,
    pub processor: Arc<ProcessPaymentEventHandler>,
}

/// GET /webhook - liveness probe.
pub async fn webhook_health() -> &'static str {
    "OK"
}

/// POST /webhook - authenticated payment notification intake.
pub async fn handle_payment_webhook(
    State(state): State<WebhookAppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // A body that is not the expected JSON still gets signature-checked
    // via the query-string event id.
    let parsed: WebhookBody = serde_json::from_slice(&body).unwrap_or_default();

    let signature = match header_value(&headers, "x-signature")
        .or_else(|| header_value(&headers, "x-meli-signature"))
    {
        Some(value) => value,
        None => return reject(&WebhookError::MissingSignature),
    };

    let request_id = match header_value(&headers, "x-request-id") {
        Some(value) => value,
        None => return reject(&WebhookError::MissingRequestId),
    };

    let event_id = match query.event_id().or_else(|| parsed.data_id()) {
        Some(value) => value,
        None => return reject(&WebhookError::MissingEventId),
    };

    if let Err(e) = state.verifier.verify(&signature, &request_id, &event_id) {
        return reject(&e);
    }

    let command = ProcessPaymentCommand {
        payment_id: PaymentId::new(event_id),
        kind: parsed.kind.unwrap_or_default(),
    };

    match state.processor.handle(command).await {
        Ok(PaymentEventOutcome::Duplicate) => (StatusCode::OK, "OK (dup)"),
        Ok(_) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!(
                error = %e,
                retryable = e.is_retryable(),
                "webhook processing failed"
            );
            (StatusCode::UNAUTHORIZED, "processing failed")
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn reject(err: &WebhookError) -> (StatusCode, &'static str) {
    tracing::warn!(error = %err, "webhook rejected");
    (StatusCode::UNAUTHORIZED, "invalid signature")
}
