use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::money::round_money;
use crate::modules::fee_accounts::models::{AccountStatus, EffectiveStatus, FeeAccountRow};

/// Read-time view of an account's lateness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LateFeeAssessment {
    pub effective_status: EffectiveStatus,
    pub days_late: i64,
    pub late_fee: Decimal,
    pub total_payable: Decimal,
}

/// Derives overdue status and late fee from the balance and the calendar.
///
/// Nothing here is persisted; every read path runs it again.
pub struct LateFeeCalculator;

impl LateFeeCalculator {
    /// Assess an account as of `today` (institution-local date).
    ///
    /// An account is overdue when a balance remains and `today` is after the
    /// due date. The late fee is whole days past due times the per-day rate.
    pub fn assess(
        today: NaiveDate,
        due_date: NaiveDate,
        due_amount: Decimal,
        late_fee_per_day: Decimal,
        persisted: AccountStatus,
    ) -> LateFeeAssessment {
        if due_amount > Decimal::ZERO && today > due_date {
            let days_late = (today - due_date).num_days();
            let late_fee = round_money(Decimal::from(days_late) * late_fee_per_day);
            return LateFeeAssessment {
                effective_status: EffectiveStatus::Overdue,
                days_late,
                late_fee,
                total_payable: due_amount + late_fee,
            };
        }

        LateFeeAssessment {
            effective_status: persisted.into(),
            days_late: 0,
            late_fee: Decimal::ZERO,
            total_payable: due_amount,
        }
    }

    pub fn assess_row(row: &FeeAccountRow, today: NaiveDate) -> LateFeeAssessment {
        Self::assess(
            today,
            row.account.due_date,
            row.account.due_amount,
            row.late_fee_per_day,
            row.account.status,
        )
    }
}
