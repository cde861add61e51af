// Balance invariant: total_amount = paid_amount + due_amount, with neither
// side negative. The persisted status is derived from the amounts; "overdue"
// is never stored and only appears in the read-time view.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::money::validate_positive;
use crate::core::{AppError, Result};
use crate::modules::directory::Student;
use crate::modules::fee_accounts::services::LateFeeAssessment;

/// Persisted fee account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Partial,
    Paid,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Partial => "partial",
            AccountStatus::Paid => "paid",
        }
    }

    /// Status implied by a balance
    pub fn for_balance(paid_amount: Decimal, due_amount: Decimal) -> Self {
        if due_amount.is_zero() {
            AccountStatus::Paid
        } else if paid_amount > Decimal::ZERO {
            AccountStatus::Partial
        } else {
            AccountStatus::Pending
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AccountStatus::Pending),
            "partial" => Ok(AccountStatus::Partial),
            "paid" => Ok(AccountStatus::Paid),
            _ => Err(format!("Invalid fee account status: {}", s)),
        }
    }
}

impl TryFrom<String> for AccountStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Status as shown to callers: the persisted status, or overdue when the due
/// date has passed with a balance remaining
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl From<AccountStatus> for EffectiveStatus {
    fn from(status: AccountStatus) -> Self {
        match status {
            AccountStatus::Pending => EffectiveStatus::Pending,
            AccountStatus::Partial => EffectiveStatus::Partial,
            AccountStatus::Paid => EffectiveStatus::Paid,
        }
    }
}

/// A student's billing obligation for one semester
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeeAccount {
    pub id: String,
    pub student_id: String,
    pub semester_id: String,
    /// None for custom-amount assignments
    pub fee_structure_id: Option<String>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub due_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    pub remarks: Option<String>,
    pub assigned_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Balance of an account after a payment is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub status: AccountStatus,
}

impl FeeAccount {
    /// A fresh, fully unpaid account
    pub fn new(
        student_id: &str,
        semester_id: &str,
        fee_structure_id: Option<String>,
        total_amount: Decimal,
        due_date: NaiveDate,
        remarks: Option<String>,
        assigned_by: &str,
    ) -> Result<Self> {
        validate_positive("total_amount", total_amount)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            semester_id: semester_id.to_string(),
            fee_structure_id,
            total_amount,
            paid_amount: Decimal::ZERO,
            due_amount: total_amount,
            due_date,
            status: AccountStatus::Pending,
            remarks: remarks
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            assigned_by: assigned_by.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Work out the balance after paying `amount`.
    ///
    /// Overpayment is rejected, never clipped; once the account is paid any
    /// further amount exceeds the zero balance.
    pub fn settle(&self, amount: Decimal) -> Result<Settlement> {
        validate_positive("amount", amount)?;

        if amount > self.due_amount {
            let message = if self.due_amount.is_zero() {
                format!("Fee account '{}' is already paid", self.id)
            } else {
                format!(
                    "Payment amount {} exceeds due amount {}",
                    amount, self.due_amount
                )
            };
            return Err(AppError::balance(message, self.balance_details()));
        }

        let paid_amount = self.paid_amount + amount;
        let due_amount = self.due_amount - amount;
        Ok(Settlement {
            amount,
            paid_amount,
            due_amount,
            status: AccountStatus::for_balance(paid_amount, due_amount),
        })
    }

    /// Authoritative balance echoed back with balance violations
    pub fn balance_details(&self) -> serde_json::Value {
        serde_json::json!({
            "fee_account_id": self.id,
            "total_amount": self.total_amount,
            "paid_amount": self.paid_amount,
            "due_amount": self.due_amount,
            "status": self.status,
        })
    }

    pub fn is_balanced(&self) -> bool {
        self.total_amount == self.paid_amount + self.due_amount
            && self.paid_amount >= Decimal::ZERO
            && self.due_amount >= Decimal::ZERO
    }
}

/// Account joined with its student, semester and structure
#[derive(Debug, Clone, FromRow)]
pub struct FeeAccountRow {
    #[sqlx(flatten)]
    pub account: FeeAccount,
    pub roll_number: String,
    pub student_name: String,
    pub department_id: String,
    pub semester_number: i32,
    pub semester_label: String,
    pub session_id: String,
    pub late_fee_per_day: Decimal,
}

/// Account as returned to callers, with the late-fee view applied
#[derive(Debug, Clone, Serialize)]
pub struct FeeAccountView {
    #[serde(flatten)]
    pub account: FeeAccount,
    pub roll_number: String,
    pub student_name: String,
    pub department_id: String,
    pub semester_number: i32,
    pub semester_label: String,
    pub session_id: String,
    pub late_fee_per_day: Decimal,
    #[serde(flatten)]
    pub assessment: LateFeeAssessment,
}

impl FeeAccountView {
    pub fn new(row: FeeAccountRow, assessment: LateFeeAssessment) -> Self {
        Self {
            account: row.account,
            roll_number: row.roll_number,
            student_name: row.student_name,
            department_id: row.department_id,
            semester_number: row.semester_number,
            semester_label: row.semester_label,
            session_id: row.session_id,
            late_fee_per_day: row.late_fee_per_day,
            assessment,
        }
    }
}

/// GET /fees/student/{id} response
#[derive(Debug, Clone, Serialize)]
pub struct StudentFees {
    pub student: Student,
    pub accounts: Vec<FeeAccountView>,
    pub total_due: Decimal,
    pub total_late_fee: Decimal,
    pub total_payable: Decimal,
}

impl StudentFees {
    pub fn new(student: Student, accounts: Vec<FeeAccountView>) -> Self {
        let total_due = accounts.iter().map(|a| a.account.due_amount).sum();
        let total_late_fee = accounts.iter().map(|a| a.assessment.late_fee).sum();
        let total_payable = accounts.iter().map(|a| a.assessment.total_payable).sum();
        Self {
            student,
            accounts,
            total_due,
            total_late_fee,
            total_payable,
        }
    }
}

/// Filter for account listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    pub department_id: Option<String>,
    pub session_id: Option<String>,
    pub semester_id: Option<String>,
    /// Only accounts with a remaining balance
    #[serde(default)]
    pub outstanding_only: bool,
}
