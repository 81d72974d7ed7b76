//! Axum router for the webhook endpoint.

use axum::routing::get;
use axum::Router;

use super::handlers::{handle_payment_webhook, webhook_health, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
///
/// - `GET /webhook` - health probe
/// - `POST /webhook` - payment notifications (no auth; signature verified)
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/webhook", get(webhook_health).post(handle_payment_webhook))
}
