use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::error::is_unique_violation;
use crate::core::{AppError, Result};
use crate::modules::payments::models::Payment;

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, fee_account_id, amount, method, transaction_id, receipt_number,
        payment_date, recorded_by, remarks, created_at
    FROM payments
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentInsert {
    Inserted,
    /// The generated receipt number is already in use; retry with a new one
    ReceiptTaken,
}

/// Append-only payment store
#[derive(Clone)]
pub struct PaymentRepository {
    pool: MySqlPool,
}

impl PaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Insert within the ledger transaction.
    ///
    /// A repeated external transaction id is a conflict; a receipt number
    /// collision is reported so the caller can regenerate it.
    pub async fn insert_with_tx(
        tx: &mut Transaction<'_, MySql>,
        payment: &Payment,
    ) -> Result<PaymentInsert> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, fee_account_id, amount, method, transaction_id, receipt_number,
                payment_date, recorded_by, remarks, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.fee_account_id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(&payment.transaction_id)
        .bind(&payment.receipt_number)
        .bind(payment.payment_date)
        .bind(&payment.recorded_by)
        .bind(&payment.remarks)
        .bind(payment.created_at)
        .execute(&mut **tx)
        .await;

        match result {
            Ok(_) => Ok(PaymentInsert::Inserted),
            Err(e) if is_unique_violation(&e, Some("uq_receipt_number")) => {
                Ok(PaymentInsert::ReceiptTaken)
            }
            Err(e) if is_unique_violation(&e, Some("uq_payment_transaction")) => {
                Err(AppError::conflict(format!(
                    "Transaction '{}' has already been applied",
                    payment.transaction_id.as_deref().unwrap_or_default()
                )))
            }
            Err(e) => Err(AppError::Internal(format!("Failed to record payment: {}", e))),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Payment>> {
        sqlx::query_as::<_, Payment>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch payment: {}", e)))
    }

    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>> {
        sqlx::query_as::<_, Payment>(&format!("{} WHERE transaction_id = ?", SELECT_COLUMNS))
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch payment: {}", e)))
    }

    /// Payments of an account, newest first
    pub async fn list_for_account(&self, fee_account_id: &str) -> Result<Vec<Payment>> {
        sqlx::query_as::<_, Payment>(&format!(
            "{} WHERE fee_account_id = ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(fee_account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to list payments: {}", e)))
    }
}
