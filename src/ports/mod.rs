//! Ports - Interfaces between the domain and the outside world.
//!
//! Following hexagonal architecture, ports define the contracts the
//! adapters implement:
//!
//! - `SubscriptionStore` - durable subscription and pending-purchase records
//! - `ProcessedPaymentStore` - at-most-once payment application
//! - `PaymentGateway` - Pix charge creation and payment lookup
//! - `Messenger` / `MemberGate` - messaging-platform sends and group membership
//! - `CooldownGate` - per-recipient throttle for promotional pushes

mod cooldown_gate;
mod member_gate;
mod messenger;
mod payment_gateway;
mod processed_payment_store;
mod subscription_store;

pub use cooldown_gate::CooldownGate;
pub use member_gate::MemberGate;
pub use messenger::{Messenger, PlatformError};
pub use payment_gateway::{
    CreateChargeRequest, GatewayError, PaymentDetails, PaymentGateway, PaymentStatus, PixCharge,
};
pub use processed_payment_store::ProcessedPaymentStore;
pub use subscription_store::SubscriptionStore;
