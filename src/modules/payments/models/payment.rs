use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::money::validate_positive;
use crate::core::{AppError, Result};
use crate::modules::directory::Student;
use crate::modules::fee_accounts::{AccountStatus, FeeAccount, Settlement};

const MAX_TRANSACTION_ID_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Online,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Online => "online",
            PaymentMethod::Cheque => "cheque",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank" => Ok(PaymentMethod::Bank),
            "online" => Ok(PaymentMethod::Online),
            "cheque" => Ok(PaymentMethod::Cheque),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Immutable record of money received
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: String,
    pub fee_account_id: String,
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub method: PaymentMethod,
    /// External reference (gateway transaction, cheque number); unique when present
    pub transaction_id: Option<String>,
    pub receipt_number: String,
    pub payment_date: NaiveDate,
    pub recorded_by: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(command: &PaymentCommand, receipt_number: String, payment_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fee_account_id: command.fee_account_id.clone(),
            amount: command.amount,
            method: command.method,
            transaction_id: command.transaction_id.clone(),
            receipt_number,
            payment_date,
            recorded_by: command.recorded_by.clone(),
            remarks: command.remarks.clone(),
            created_at: Utc::now(),
        }
    }
}

/// A validated request to apply money to an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCommand {
    pub fee_account_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub recorded_by: String,
}

impl PaymentCommand {
    pub fn new(
        fee_account_id: &str,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: Option<String>,
        remarks: Option<String>,
        recorded_by: &str,
    ) -> Result<Self> {
        let fee_account_id = fee_account_id.trim();
        if fee_account_id.is_empty() {
            return Err(AppError::validation("fee_account_id is required"));
        }
        validate_positive("amount", amount)?;

        let transaction_id = transaction_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(transaction_id) = &transaction_id {
            if transaction_id.len() > MAX_TRANSACTION_ID_LEN {
                return Err(AppError::validation(format!(
                    "transaction_id exceeds {} characters",
                    MAX_TRANSACTION_ID_LEN
                )));
            }
        }

        Ok(Self {
            fee_account_id: fee_account_id.to_string(),
            amount,
            method,
            transaction_id,
            remarks: remarks
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            recorded_by: recorded_by.to_string(),
        })
    }
}

/// POST /fees/payments body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPaymentRequest {
    pub fee_account_id: Option<String>,
    pub amount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
}

impl RecordPaymentRequest {
    pub fn into_command(self, recorded_by: &str) -> Result<PaymentCommand> {
        let fee_account_id = self
            .fee_account_id
            .ok_or_else(|| AppError::validation("fee_account_id is required"))?;
        let amount = self
            .amount
            .ok_or_else(|| AppError::validation("amount is required"))?;
        let method = self
            .method
            .ok_or_else(|| AppError::validation("method is required"))?;

        PaymentCommand::new(
            &fee_account_id,
            amount,
            method,
            self.transaction_id,
            self.remarks,
            recorded_by,
        )
    }
}

/// Plain data handed to receipt renderers
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub receipt_number: String,
    pub payment_date: NaiveDate,
    pub student_id: String,
    pub roll_number: String,
    pub student_name: String,
    pub fee_account_id: String,
    pub semester_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub recorded_by: String,
}

impl PaymentReceipt {
    pub fn new(payment: &Payment, account: &FeeAccount, settlement: &Settlement, student: &Student) -> Self {
        Self {
            receipt_number: payment.receipt_number.clone(),
            payment_date: payment.payment_date,
            student_id: student.id.clone(),
            roll_number: student.roll_number.clone(),
            student_name: student.full_name.clone(),
            fee_account_id: account.id.clone(),
            semester_id: account.semester_id.clone(),
            amount: payment.amount,
            method: payment.method,
            transaction_id: payment.transaction_id.clone(),
            total_amount: account.total_amount,
            paid_amount: settlement.paid_amount,
            due_amount: settlement.due_amount,
            recorded_by: payment.recorded_by.clone(),
        }
    }
}

/// Outcome of applying a payment
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResult {
    pub payment: Payment,
    pub receipt_number: String,
    pub due_amount: Decimal,
    pub status: AccountStatus,
    pub receipt: PaymentReceipt,
}
