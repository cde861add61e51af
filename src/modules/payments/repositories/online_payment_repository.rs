use chrono::Utc;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::payments::models::{OnlinePayment, OnlinePaymentStatus};

const SELECT_COLUMNS: &str = r#"
    SELECT
        transaction_id, fee_account_id, amount, gateway, status, payment_url,
        payment_id, failure_reason, initiated_by, created_at, updated_at
    FROM online_payments
"#;

#[derive(Clone)]
pub struct OnlinePaymentRepository {
    pool: MySqlPool,
}

impl OnlinePaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, online: &OnlinePayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO online_payments (
                transaction_id, fee_account_id, amount, gateway, status, payment_url,
                payment_id, failure_reason, initiated_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&online.transaction_id)
        .bind(&online.fee_account_id)
        .bind(online.amount)
        .bind(&online.gateway)
        .bind(online.status.as_str())
        .bind(&online.payment_url)
        .bind(&online.payment_id)
        .bind(&online.failure_reason)
        .bind(&online.initiated_by)
        .bind(online.created_at)
        .bind(online.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to record online payment: {}", e)))?;

        Ok(())
    }

    pub async fn find(&self, transaction_id: &str) -> Result<Option<OnlinePayment>> {
        sqlx::query_as::<_, OnlinePayment>(&format!("{} WHERE transaction_id = ?", SELECT_COLUMNS))
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch online payment: {}", e)))
    }

    /// Move to `status`, recording the ledger payment or failure reason.
    ///
    /// Applied records are final and are never moved again.
    pub async fn update_status(
        &self,
        transaction_id: &str,
        status: OnlinePaymentStatus,
        payment_id: Option<&str>,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE online_payments
            SET status = ?,
                payment_id = COALESCE(?, payment_id),
                failure_reason = ?,
                updated_at = ?
            WHERE transaction_id = ? AND status <> 'applied'
            "#,
        )
        .bind(status.as_str())
        .bind(payment_id)
        .bind(failure_reason)
        .bind(Utc::now())
        .bind(transaction_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update online payment: {}", e)))?;

        Ok(())
    }
}
