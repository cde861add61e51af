use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Something that happened to the ledger, published after commit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    FeeAssigned {
        fee_account_id: String,
        student_id: String,
        semester_id: String,
        total_amount: Decimal,
        due_date: NaiveDate,
        assigned_by: String,
    },
    CohortAssigned {
        semester_id: String,
        fee_structure_id: String,
        succeeded: usize,
        failed: usize,
        assigned_by: String,
    },
    VoucherIssued {
        voucher_id: String,
        voucher_number: String,
        fee_account_id: String,
        amount: Decimal,
        issued_by: String,
    },
    VoucherCancelled {
        voucher_id: String,
        voucher_number: String,
        fee_account_id: String,
        cancelled_by: String,
    },
    PaymentRecorded {
        payment_id: String,
        fee_account_id: String,
        student_id: String,
        amount: Decimal,
        method: String,
        receipt_number: String,
        due_amount: Decimal,
        recorded_by: String,
    },
}

impl LedgerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::FeeAssigned { .. } => "fee_assigned",
            LedgerEvent::CohortAssigned { .. } => "cohort_assigned",
            LedgerEvent::VoucherIssued { .. } => "voucher_issued",
            LedgerEvent::VoucherCancelled { .. } => "voucher_cancelled",
            LedgerEvent::PaymentRecorded { .. } => "payment_recorded",
        }
    }

    /// Entity type and id the event is filed under in the activity log
    pub fn entity(&self) -> (&'static str, &str) {
        match self {
            LedgerEvent::FeeAssigned { fee_account_id, .. } => ("fee_account", fee_account_id),
            LedgerEvent::CohortAssigned { semester_id, .. } => ("semester", semester_id),
            LedgerEvent::VoucherIssued { voucher_id, .. }
            | LedgerEvent::VoucherCancelled { voucher_id, .. } => ("fee_voucher", voucher_id),
            LedgerEvent::PaymentRecorded { payment_id, .. } => ("payment", payment_id),
        }
    }

    pub fn actor(&self) -> &str {
        match self {
            LedgerEvent::FeeAssigned { assigned_by, .. }
            | LedgerEvent::CohortAssigned { assigned_by, .. } => assigned_by,
            LedgerEvent::VoucherIssued { issued_by, .. } => issued_by,
            LedgerEvent::VoucherCancelled { cancelled_by, .. } => cancelled_by,
            LedgerEvent::PaymentRecorded { recorded_by, .. } => recorded_by,
        }
    }
}
