use chrono::{NaiveDate, Utc};
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::error::is_unique_violation;
use crate::core::{AppError, Result};
use crate::modules::vouchers::models::{FeeVoucher, VoucherStatus};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, voucher_number, fee_account_id, amount, bank_name,
        issue_date, valid_until, status, issued_by, created_at, updated_at
    FROM fee_vouchers
"#;

/// Result of attempting to store a new voucher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherInsert {
    Inserted,
    /// The generated number is already in use; retry with a new one
    NumberTaken,
    /// Another voucher for the account is still issued
    AccountHasActiveVoucher,
}

#[derive(Clone)]
pub struct VoucherRepository {
    pool: MySqlPool,
}

impl VoucherRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn insert_with_tx(
        tx: &mut Transaction<'_, MySql>,
        voucher: &FeeVoucher,
    ) -> Result<VoucherInsert> {
        let result = sqlx::query(
            r#"
            INSERT INTO fee_vouchers (
                id, voucher_number, fee_account_id, amount, bank_name,
                issue_date, valid_until, status, issued_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&voucher.id)
        .bind(&voucher.voucher_number)
        .bind(&voucher.fee_account_id)
        .bind(voucher.amount)
        .bind(&voucher.bank_name)
        .bind(voucher.issue_date)
        .bind(voucher.valid_until)
        .bind(voucher.status.as_str())
        .bind(&voucher.issued_by)
        .bind(voucher.created_at)
        .bind(voucher.updated_at)
        .execute(&mut **tx)
        .await;

        match result {
            Ok(_) => Ok(VoucherInsert::Inserted),
            Err(e) if is_unique_violation(&e, Some("uq_voucher_number")) => {
                Ok(VoucherInsert::NumberTaken)
            }
            Err(e) if is_unique_violation(&e, Some("uq_active_voucher")) => {
                Ok(VoucherInsert::AccountHasActiveVoucher)
            }
            Err(e) => Err(AppError::Internal(format!("Failed to create voucher: {}", e))),
        }
    }

    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, MySql>,
        id: &str,
    ) -> Result<Option<FeeVoucher>> {
        sqlx::query_as::<_, FeeVoucher>(&format!("{} WHERE id = ? FOR UPDATE", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to lock voucher: {}", e)))
    }

    /// The account's live voucher, if any
    pub async fn find_issued_with_tx(
        tx: &mut Transaction<'_, MySql>,
        fee_account_id: &str,
    ) -> Result<Option<FeeVoucher>> {
        sqlx::query_as::<_, FeeVoucher>(&format!(
            "{} WHERE fee_account_id = ? AND status = 'issued'",
            SELECT_COLUMNS
        ))
        .bind(fee_account_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch issued voucher: {}", e)))
    }

    /// Most recent voucher of an account, whatever its status
    pub async fn latest_for_account(&self, fee_account_id: &str) -> Result<Option<FeeVoucher>> {
        sqlx::query_as::<_, FeeVoucher>(&format!(
            "{} WHERE fee_account_id = ? ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(fee_account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch voucher: {}", e)))
    }

    /// Expire issued vouchers of the account whose window closed before `today`
    pub async fn expire_stale_with_tx(
        tx: &mut Transaction<'_, MySql>,
        fee_account_id: &str,
        today: NaiveDate,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE fee_vouchers
            SET status = 'expired', updated_at = ?
            WHERE fee_account_id = ? AND status = 'issued' AND valid_until < ?
            "#,
        )
        .bind(Utc::now())
        .bind(fee_account_id)
        .bind(today)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to expire vouchers: {}", e)))?;

        Ok(result.rows_affected())
    }

    /// Close the account's issued voucher after a payment
    pub async fn mark_paid_with_tx(
        tx: &mut Transaction<'_, MySql>,
        fee_account_id: &str,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE fee_vouchers
            SET status = 'paid', updated_at = ?
            WHERE fee_account_id = ? AND status = 'issued'
            "#,
        )
        .bind(Utc::now())
        .bind(fee_account_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to close voucher: {}", e)))?;

        Ok(result.rows_affected())
    }

    pub async fn update_status_with_tx(
        tx: &mut Transaction<'_, MySql>,
        id: &str,
        status: VoucherStatus,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE fee_vouchers SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to update voucher status: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Voucher '{}' not found", id)));
        }

        Ok(())
    }
}
