use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::fee_accounts::FeeAccountView;

/// Longest validity window a caller may request
pub const MAX_VALID_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    Issued,
    Paid,
    Expired,
    Cancelled,
}

impl VoucherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherStatus::Issued => "issued",
            VoucherStatus::Paid => "paid",
            VoucherStatus::Expired => "expired",
            VoucherStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VoucherStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "issued" => Ok(VoucherStatus::Issued),
            "paid" => Ok(VoucherStatus::Paid),
            "expired" => Ok(VoucherStatus::Expired),
            "cancelled" => Ok(VoucherStatus::Cancelled),
            _ => Err(format!("Invalid voucher status: {}", s)),
        }
    }
}

impl TryFrom<String> for VoucherStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeeVoucher {
    pub id: String,
    pub voucher_number: String,
    pub fee_account_id: String,
    /// Amount due when the voucher was issued
    pub amount: Decimal,
    pub bank_name: String,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: VoucherStatus,
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeeVoucher {
    pub fn new(
        voucher_number: String,
        fee_account_id: &str,
        amount: Decimal,
        bank_name: &str,
        issue_date: NaiveDate,
        valid_days: u32,
        issued_by: &str,
    ) -> Result<Self> {
        let valid_until = issue_date
            .checked_add_days(Days::new(u64::from(valid_days)))
            .ok_or_else(|| AppError::validation("valid_days is out of range"))?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            voucher_number,
            fee_account_id: fee_account_id.to_string(),
            amount,
            bank_name: bank_name.to_string(),
            issue_date,
            valid_until,
            status: VoucherStatus::Issued,
            issued_by: issued_by.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reference echoed back when a second voucher is refused
    pub fn reference(&self) -> serde_json::Value {
        serde_json::json!({
            "voucher_id": self.id,
            "voucher_number": self.voucher_number,
            "amount": self.amount,
            "valid_until": self.valid_until,
            "status": self.status,
        })
    }
}

/// POST /fees/vouchers body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueVoucherRequest {
    pub fee_account_id: Option<String>,
    pub valid_days: Option<u32>,
    pub bank_name: Option<String>,
}

impl IssueVoucherRequest {
    pub fn fee_account_id(&self) -> Result<String> {
        match self.fee_account_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(AppError::validation("fee_account_id is required")),
        }
    }

    pub fn valid_days(&self, default: u32) -> Result<u32> {
        let days = self.valid_days.unwrap_or(default);
        if days == 0 || days > MAX_VALID_DAYS {
            return Err(AppError::validation(format!(
                "valid_days must be between 1 and {}",
                MAX_VALID_DAYS
            )));
        }
        Ok(days)
    }

    pub fn bank_name(&self, default: &str) -> String {
        self.bank_name
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

/// Data encoded into the scannable code on a voucher slip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    pub voucher_number: String,
    pub student_id: String,
    pub roll_number: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub valid_until: NaiveDate,
}

impl QrPayload {
    pub fn new(voucher: &FeeVoucher, account: &FeeAccountView) -> Self {
        Self {
            voucher_number: voucher.voucher_number.clone(),
            student_id: account.account.student_id.clone(),
            roll_number: account.roll_number.clone(),
            amount: voucher.amount,
            due_date: account.account.due_date,
            valid_until: voucher.valid_until,
        }
    }

    /// Compact JSON, URL-safe base64 without padding
    pub fn encode(&self) -> Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
    }

    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| AppError::validation(format!("Invalid voucher code: {}", e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Everything a renderer needs to print a voucher
#[derive(Debug, Clone, Serialize)]
pub struct VoucherSlip {
    pub voucher: FeeVoucher,
    pub account: FeeAccountView,
    pub qr_payload: String,
}
