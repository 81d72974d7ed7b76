//! Webhook endpoint - payment-provider notification intake.

mod dto;
mod handlers;
mod routes;

pub use dto::{WebhookBody, WebhookQuery};
pub use handlers::{handle_payment_webhook, webhook_health, WebhookAppState};
pub use routes::webhook_routes;
