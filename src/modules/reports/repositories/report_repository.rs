use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Result};
use crate::modules::fee_accounts::models::{AccountFilter, FeeAccountRow};
use crate::modules::fee_accounts::FeeAccountRepository;
use crate::modules::payments::PaymentMethod;
use crate::modules::reports::models::CollectedPayment;

/// Read-only queries behind the fee reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Accounts with their student, semester and late-fee rate
    async fn account_rows(&self, filter: &AccountFilter) -> Result<Vec<FeeAccountRow>>;

    /// Payments dated within `[start, end]`, optionally of one method
    async fn collected_payments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        method: Option<PaymentMethod>,
    ) -> Result<Vec<CollectedPayment>>;
}

pub struct MySqlReportRepository {
    pool: MySqlPool,
    accounts: FeeAccountRepository,
}

impl MySqlReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            accounts: FeeAccountRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ReportRepository for MySqlReportRepository {
    async fn account_rows(&self, filter: &AccountFilter) -> Result<Vec<FeeAccountRow>> {
        self.accounts.list_views(filter).await
    }

    async fn collected_payments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        method: Option<PaymentMethod>,
    ) -> Result<Vec<CollectedPayment>> {
        let mut builder = QueryBuilder::<MySql>::new(
            r#"
            SELECT
                p.id, p.fee_account_id, p.amount, p.method, p.transaction_id, p.receipt_number,
                p.payment_date, p.recorded_by, p.remarks, p.created_at,
                s.id AS student_id, s.roll_number, s.full_name AS student_name, s.department_id
            FROM payments p
            JOIN fee_accounts fa ON fa.id = p.fee_account_id
            JOIN students s ON s.id = fa.student_id
            WHERE p.payment_date BETWEEN "#,
        );
        builder.push_bind(start).push(" AND ").push_bind(end);

        if let Some(method) = method {
            builder.push(" AND p.method = ").push_bind(method.as_str());
        }
        builder.push(" ORDER BY p.payment_date, p.created_at");

        builder
            .build_query_as::<CollectedPayment>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to load collected payments: {}", e)))
    }
}
