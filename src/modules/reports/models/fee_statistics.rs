// Statistics are a fold over account views. Balances are read straight from
// the accounts and lateness from their assessment, so nothing here recomputes
// what the ledger or the late-fee calculator already decided.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::money::percentage;
use crate::modules::fee_accounts::{EffectiveStatus, FeeAccountView};

/// GET /fees/reports/statistics query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsQuery {
    pub session_id: Option<String>,
    pub department_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub partial: u64,
    pub paid: u64,
    pub overdue: u64,
}

impl StatusCounts {
    fn record(&mut self, status: EffectiveStatus) {
        match status {
            EffectiveStatus::Pending => self.pending += 1,
            EffectiveStatus::Partial => self.partial += 1,
            EffectiveStatus::Paid => self.paid += 1,
            EffectiveStatus::Overdue => self.overdue += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgingBucket {
    pub accounts: u64,
    pub outstanding: Decimal,
}

impl AgingBucket {
    fn add(&mut self, due_amount: Decimal) {
        self.accounts += 1;
        self.outstanding += due_amount;
    }
}

/// Outstanding balances grouped by days past the due date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgingBuckets {
    pub not_yet_due: AgingBucket,
    pub days_1_30: AgingBucket,
    pub days_31_60: AgingBucket,
    pub days_61_90: AgingBucket,
    pub over_90: AgingBucket,
}

impl AgingBuckets {
    fn bucket_mut(&mut self, days_late: i64) -> &mut AgingBucket {
        match days_late {
            d if d <= 0 => &mut self.not_yet_due,
            1..=30 => &mut self.days_1_30,
            31..=60 => &mut self.days_31_60,
            61..=90 => &mut self.days_61_90,
            _ => &mut self.over_90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentTotals {
    pub department_id: String,
    pub accounts: u64,
    pub total_billed: Decimal,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
    pub collection_percentage: Decimal,
}

impl DepartmentTotals {
    fn new(department_id: &str) -> Self {
        Self {
            department_id: department_id.to_string(),
            accounts: 0,
            total_billed: Decimal::ZERO,
            total_collected: Decimal::ZERO,
            total_outstanding: Decimal::ZERO,
            collection_percentage: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeStatistics {
    pub accounts: u64,
    pub total_billed: Decimal,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
    /// Collected over billed, two decimal places; zero when nothing is billed
    pub collection_percentage: Decimal,
    pub by_status: StatusCounts,
    pub accrued_late_fees: Decimal,
    pub aging: AgingBuckets,
    pub by_department: Vec<DepartmentTotals>,
}

impl FeeStatistics {
    pub fn from_accounts(accounts: &[FeeAccountView]) -> Self {
        let mut stats = Self {
            accounts: 0,
            total_billed: Decimal::ZERO,
            total_collected: Decimal::ZERO,
            total_outstanding: Decimal::ZERO,
            collection_percentage: Decimal::ZERO,
            by_status: StatusCounts::default(),
            accrued_late_fees: Decimal::ZERO,
            aging: AgingBuckets::default(),
            by_department: Vec::new(),
        };
        let mut departments: BTreeMap<&str, DepartmentTotals> = BTreeMap::new();

        for view in accounts {
            let account = &view.account;
            stats.accounts += 1;
            stats.total_billed += account.total_amount;
            stats.total_collected += account.paid_amount;
            stats.total_outstanding += account.due_amount;
            stats.by_status.record(view.assessment.effective_status);
            stats.accrued_late_fees += view.assessment.late_fee;

            if account.due_amount > Decimal::ZERO {
                stats
                    .aging
                    .bucket_mut(view.assessment.days_late)
                    .add(account.due_amount);
            }

            let department = departments
                .entry(view.department_id.as_str())
                .or_insert_with(|| DepartmentTotals::new(&view.department_id));
            department.accounts += 1;
            department.total_billed += account.total_amount;
            department.total_collected += account.paid_amount;
            department.total_outstanding += account.due_amount;
        }

        stats.collection_percentage = percentage(stats.total_collected, stats.total_billed);
        stats.by_department = departments
            .into_values()
            .map(|mut d| {
                d.collection_percentage = percentage(d.total_collected, d.total_billed);
                d
            })
            .collect();

        stats
    }
}
