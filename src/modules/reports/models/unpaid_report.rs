use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::fee_accounts::models::AccountFilter;
use crate::modules::fee_accounts::{EffectiveStatus, FeeAccountView};

/// GET /fees/reports/unpaid query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnpaidQuery {
    pub department_id: Option<String>,
    pub session_id: Option<String>,
    pub semester_id: Option<String>,
    #[serde(default)]
    pub overdue_only: bool,
}

impl UnpaidQuery {
    pub fn filter(&self) -> AccountFilter {
        AccountFilter {
            department_id: self.department_id.clone(),
            session_id: self.session_id.clone(),
            semester_id: self.semester_id.clone(),
            outstanding_only: true,
        }
    }
}

/// Accounts with a remaining balance
#[derive(Debug, Clone, Serialize)]
pub struct UnpaidReport {
    pub count: usize,
    pub total_due: Decimal,
    pub total_late_fee: Decimal,
    pub total_payable: Decimal,
    pub accounts: Vec<FeeAccountView>,
}

impl UnpaidReport {
    pub fn new(accounts: Vec<FeeAccountView>, overdue_only: bool) -> Self {
        let accounts: Vec<FeeAccountView> = accounts
            .into_iter()
            .filter(|a| a.account.due_amount > Decimal::ZERO)
            .filter(|a| {
                !overdue_only || a.assessment.effective_status == EffectiveStatus::Overdue
            })
            .collect();

        Self {
            count: accounts.len(),
            total_due: accounts.iter().map(|a| a.account.due_amount).sum(),
            total_late_fee: accounts.iter().map(|a| a.assessment.late_fee).sum(),
            total_payable: accounts.iter().map(|a| a.assessment.total_payable).sum(),
            accounts,
        }
    }
}
