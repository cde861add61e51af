use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{AppError, InstitutionClock, Result};
use crate::modules::fee_accounts::models::AccountFilter;
use crate::modules::fee_accounts::{FeeAccountView, LateFeeCalculator};
use crate::modules::reports::models::{
    CollectionQuery, CollectionReport, FeeStatistics, StatisticsQuery, UnpaidQuery, UnpaidReport,
};
use crate::modules::reports::repositories::ReportRepository;

/// Longest collection window, counted inclusively
pub const MAX_RANGE_DAYS: i64 = 366;

/// Read-only fee reporting; never writes to the ledger
pub struct ReportService {
    repo: Arc<dyn ReportRepository>,
    clock: InstitutionClock,
}

impl ReportService {
    pub fn new(repo: Arc<dyn ReportRepository>, clock: InstitutionClock) -> Self {
        Self { repo, clock }
    }

    /// Accounts with a remaining balance, with the late-fee view applied
    pub async fn unpaid(&self, query: &UnpaidQuery) -> Result<UnpaidReport> {
        let views = self.views(&query.filter()).await?;
        let report = UnpaidReport::new(views, query.overdue_only);

        info!(
            count = report.count,
            total_due = %report.total_due,
            overdue_only = query.overdue_only,
            "Unpaid report generated"
        );
        Ok(report)
    }

    /// Payments received in the inclusive range `[start_date, end_date]`
    pub async fn collection(&self, query: &CollectionQuery) -> Result<CollectionReport> {
        validate_date_range(query.start_date, query.end_date)?;

        let payments = self
            .repo
            .collected_payments(query.start_date, query.end_date, query.method)
            .await?;
        let report = CollectionReport::new(query, payments);

        if report.payment_count == 0 {
            warn!(
                start_date = %query.start_date,
                end_date = %query.end_date,
                "No payments collected in range"
            );
        } else {
            info!(
                start_date = %query.start_date,
                end_date = %query.end_date,
                payment_count = report.payment_count,
                total_amount = %report.total_amount,
                "Collection report generated"
            );
        }

        Ok(report)
    }

    pub async fn statistics(&self, query: &StatisticsQuery) -> Result<FeeStatistics> {
        let filter = AccountFilter {
            department_id: query.department_id.clone(),
            session_id: query.session_id.clone(),
            semester_id: None,
            outstanding_only: false,
        };
        let views = self.views(&filter).await?;
        Ok(FeeStatistics::from_accounts(&views))
    }

    async fn views(&self, filter: &AccountFilter) -> Result<Vec<FeeAccountView>> {
        let today = self.clock.today();
        let rows = self.repo.account_rows(filter).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let assessment = LateFeeCalculator::assess_row(&row, today);
                FeeAccountView::new(row, assessment)
            })
            .collect())
    }
}

/// An ordered range spanning at most [`MAX_RANGE_DAYS`] calendar days
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
    if start_date > end_date {
        return Err(AppError::validation(format!(
            "start_date ({}) must be on or before end_date ({})",
            start_date, end_date
        )));
    }

    let days = (end_date - start_date).num_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(AppError::validation(format!(
            "Date range too large: {} days (maximum {} days)",
            days, MAX_RANGE_DAYS
        )));
    }

    Ok(())
}
