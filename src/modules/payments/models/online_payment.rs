use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payment::Payment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlinePaymentStatus {
    /// Waiting on the provider
    Initiated,
    /// Provider confirmed, but the ledger has not accepted it
    Confirmed,
    Failed,
    /// Reconciled into a ledger payment
    Applied,
}

impl OnlinePaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnlinePaymentStatus::Initiated => "initiated",
            OnlinePaymentStatus::Confirmed => "confirmed",
            OnlinePaymentStatus::Failed => "failed",
            OnlinePaymentStatus::Applied => "applied",
        }
    }
}

impl std::str::FromStr for OnlinePaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(OnlinePaymentStatus::Initiated),
            "confirmed" => Ok(OnlinePaymentStatus::Confirmed),
            "failed" => Ok(OnlinePaymentStatus::Failed),
            "applied" => Ok(OnlinePaymentStatus::Applied),
            _ => Err(format!("Invalid online payment status: {}", s)),
        }
    }
}

impl TryFrom<String> for OnlinePaymentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// An online payment attempt, keyed by the gateway transaction id
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OnlinePayment {
    pub transaction_id: String,
    pub fee_account_id: String,
    pub amount: Decimal,
    pub gateway: String,
    #[sqlx(try_from = "String")]
    pub status: OnlinePaymentStatus,
    pub payment_url: Option<String>,
    /// Ledger payment created on reconciliation
    pub payment_id: Option<String>,
    pub failure_reason: Option<String>,
    pub initiated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OnlinePayment {
    pub fn new(
        transaction_id: String,
        fee_account_id: &str,
        amount: Decimal,
        gateway: &str,
        payment_url: Option<String>,
        initiated_by: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            transaction_id,
            fee_account_id: fee_account_id.to_string(),
            amount,
            gateway: gateway.to_string(),
            status: OnlinePaymentStatus::Initiated,
            payment_url,
            payment_id: None,
            failure_reason: None,
            initiated_by: initiated_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// POST /fees/payments/online body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitiateOnlinePaymentRequest {
    pub fee_account_id: Option<String>,
    /// Defaults to the account's due amount
    pub amount: Option<Decimal>,
}

/// Result of verifying or reconciling an online payment
#[derive(Debug, Clone, Serialize)]
pub struct OnlineVerification {
    pub online_payment: OnlinePayment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}
