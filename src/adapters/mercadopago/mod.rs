//! Mercado Pago payment gateway adapter.

mod gateway;
mod mock_gateway;

pub use gateway::MercadoPagoGateway;
pub use mock_gateway::MockPaymentGateway;
