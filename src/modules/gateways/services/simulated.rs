use async_trait::async_trait;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::gateway_trait::{
    GatewayOutcome, GatewayPayment, GatewayPaymentRequest, GatewayStatus, PaymentGateway,
};
use super::signature;
use crate::core::{AppError, Result};

/// In-process stand-in for a payment provider.
///
/// Whether a transaction confirms is a pure function of its id and the
/// configured success rate, so repeated status queries agree.
pub struct SimulatedGateway {
    success_rate: Decimal,
    webhook_secret: String,
}

impl SimulatedGateway {
    pub fn new(success_rate: Decimal, webhook_secret: String) -> Self {
        Self {
            success_rate,
            webhook_secret,
        }
    }

    /// Sign a callback body the way this provider would
    pub fn sign_callback(&self, payload: &[u8]) -> Result<String> {
        signature::sign(&self.webhook_secret, payload)
    }

    fn confirms(&self, transaction_id: &str) -> bool {
        let digest = Sha256::digest(transaction_id.as_bytes());
        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&digest[..8]);
        let roll = Decimal::from(u64::from_be_bytes(bucket) % 10_000) / Decimal::from(10_000);
        roll < self.success_rate
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn initiate(&self, request: &GatewayPaymentRequest) -> Result<GatewayPayment> {
        if request.amount <= Decimal::ZERO {
            return Err(AppError::gateway("Simulated gateway rejects non-positive amounts"));
        }

        let transaction_id = format!("SIM-{}", Uuid::new_v4().simple().to_string().to_uppercase());
        tracing::debug!(transaction_id = %transaction_id, reference = %request.reference, "Simulated payment initiated");

        Ok(GatewayPayment {
            payment_url: Some(format!("https://pay.simulated.local/checkout/{}", transaction_id)),
            transaction_id,
            status: GatewayStatus::Pending,
        })
    }

    async fn status(&self, transaction_id: &str) -> Result<GatewayOutcome> {
        if !transaction_id.starts_with("SIM-") {
            return Err(AppError::not_found(format!(
                "Transaction '{}' is unknown to the simulated gateway",
                transaction_id
            )));
        }

        let (status, failure_reason) = if self.confirms(transaction_id) {
            (GatewayStatus::Confirmed, None)
        } else {
            (GatewayStatus::Failed, Some("Declined by simulated issuer".to_string()))
        };

        Ok(GatewayOutcome {
            transaction_id: transaction_id.to_string(),
            status,
            amount: None,
            failure_reason,
        })
    }

    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool {
        signature::verify(&self.webhook_secret, payload, signature)
    }
}
