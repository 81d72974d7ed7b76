//! Deterministic in-memory gateway for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::PaymentId;
use crate::ports::{
    CreateChargeRequest, GatewayError, PaymentDetails, PaymentGateway, PaymentStatus, PixCharge,
};

/// Mock payment gateway.
///
/// Charges are assigned sequential `mock-<n>` ids and start Pending; tests
/// flip them with [`MockPaymentGateway::approve`] or seed arbitrary states
/// with [`MockPaymentGateway::set_payment`].
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    counter: AtomicU64,
    payments: Mutex<HashMap<PaymentId, PaymentDetails>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or overrides a payment the gateway will report.
    pub fn set_payment(&self, details: PaymentDetails) {
        self.payments
            .lock()
            .unwrap()
            .insert(details.id.clone(), details);
    }

    /// Marks a payment approved with the given external reference.
    pub fn approve(&self, id: &PaymentId, external_reference: &str) {
        self.set_payment(PaymentDetails {
            id: id.clone(),
            status: PaymentStatus::Approved,
            external_reference: Some(external_reference.to_string()),
        });
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_charge(&self, request: CreateChargeRequest) -> Result<PixCharge, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let payment_id = PaymentId::new(format!("mock-{}", n));

        self.set_payment(PaymentDetails {
            id: payment_id.clone(),
            status: PaymentStatus::Pending,
            external_reference: Some(request.external_reference.clone()),
        });

        Ok(PixCharge {
            payment_id,
            qr_code: format!("00020126mockpix{}", n),
            qr_code_base64: "bW9jay1xcg==".to_string(),
        })
    }

    async fn get_payment(&self, id: &PaymentId) -> Result<PaymentDetails, GatewayError> {
        self.payments
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                body: format!("payment {} not found", id),
            })
    }
}
