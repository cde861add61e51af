use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Payment gateway boundary for online fee payments
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Gateway name, recorded with each online payment
    fn name(&self) -> &str;

    /// Start a payment; the returned transaction id identifies it from now on
    async fn initiate(&self, request: &GatewayPaymentRequest) -> Result<GatewayPayment>;

    /// Ask the provider how a transaction ended up
    async fn status(&self, transaction_id: &str) -> Result<GatewayOutcome>;

    /// Check a callback signature against the raw request body
    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool;

    /// Parse a callback body that already passed signature verification
    fn parse_callback(&self, payload: &[u8]) -> Result<GatewayCallback> {
        serde_json::from_slice(payload)
            .map_err(|e| AppError::validation(format!("Invalid callback payload: {}", e)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayPaymentRequest {
    /// Our reference for the payment (the fee account id)
    pub reference: String,
    pub amount: Decimal,
    pub description: String,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub transaction_id: String,
    pub payment_url: Option<String>,
    pub status: GatewayStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Pending,
    Confirmed,
    Failed,
}

impl GatewayStatus {
    /// Map a provider's status vocabulary onto ours
    pub fn from_provider(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "confirmed" | "paid" | "settled" | "succeeded" | "success" | "completed" => {
                GatewayStatus::Confirmed
            }
            "failed" | "expired" | "cancelled" | "canceled" | "denied" => GatewayStatus::Failed,
            _ => GatewayStatus::Pending,
        }
    }
}

/// Result of a status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOutcome {
    pub transaction_id: String,
    pub status: GatewayStatus,
    /// Amount the provider reports as paid, when it reports one
    pub amount: Option<Decimal>,
    pub failure_reason: Option<String>,
}

/// Asynchronous provider notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCallback {
    pub transaction_id: String,
    pub status: GatewayStatus,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl From<GatewayCallback> for GatewayOutcome {
    fn from(callback: GatewayCallback) -> Self {
        Self {
            transaction_id: callback.transaction_id,
            status: callback.status,
            amount: callback.amount,
            failure_reason: callback.failure_reason,
        }
    }
}
