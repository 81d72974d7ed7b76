//! Subscription command and query handlers.

mod cancel_subscription;
mod create_purchase;
mod get_status;
mod process_payment_event;

pub use cancel_subscription::{CancelSubscriptionHandler, CancellationOutcome};
pub use create_purchase::{CreatePurchaseCommand, CreatePurchaseHandler, PurchaseCreated};
pub use get_status::{GetSubscriptionStatusHandler, SubscriptionStatusView};
pub use process_payment_event::{
    PaymentEventOutcome, ProcessPaymentCommand, ProcessPaymentEventHandler,
};
