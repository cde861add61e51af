use chrono::Utc;
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};

use crate::core::error::is_unique_violation;
use crate::core::{AppError, Result};
use crate::modules::fee_accounts::models::{AccountFilter, FeeAccount, FeeAccountRow, Settlement};

const ACCOUNT_COLUMNS: &str = r#"
    SELECT
        id, student_id, semester_id, fee_structure_id,
        total_amount, paid_amount, due_amount, due_date, status,
        remarks, assigned_by, created_at, updated_at
    FROM fee_accounts
"#;

const VIEW_COLUMNS: &str = r#"
    SELECT
        fa.id, fa.student_id, fa.semester_id, fa.fee_structure_id,
        fa.total_amount, fa.paid_amount, fa.due_amount, fa.due_date, fa.status,
        fa.remarks, fa.assigned_by, fa.created_at, fa.updated_at,
        s.roll_number, s.full_name AS student_name, s.department_id,
        sem.semester_number, sem.label AS semester_label, sem.session_id,
        COALESCE(fs.late_fee_per_day, 0) AS late_fee_per_day
    FROM fee_accounts fa
    JOIN students s ON s.id = fa.student_id
    JOIN semesters sem ON sem.id = fa.semester_id
    LEFT JOIN fee_structures fs ON fs.id = fa.fee_structure_id
"#;

/// Repository for fee accounts
#[derive(Clone)]
pub struct FeeAccountRepository {
    pool: MySqlPool,
}

impl FeeAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Insert within an existing transaction.
    ///
    /// A second account for the same (student, semester) is a conflict.
    pub async fn insert_with_tx(
        tx: &mut Transaction<'_, MySql>,
        account: &FeeAccount,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fee_accounts (
                id, student_id, semester_id, fee_structure_id,
                total_amount, paid_amount, due_amount, due_date, status,
                remarks, assigned_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.student_id)
        .bind(&account.semester_id)
        .bind(&account.fee_structure_id)
        .bind(account.total_amount)
        .bind(account.paid_amount)
        .bind(account.due_amount)
        .bind(account.due_date)
        .bind(account.status.as_str())
        .bind(&account.remarks)
        .bind(&account.assigned_by)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("uq_fee_account_student_semester")) {
                return AppError::conflict(format!(
                    "Fee already assigned to student '{}' for semester '{}'",
                    account.student_id, account.semester_id
                ));
            }
            AppError::Internal(format!("Failed to create fee account: {}", e))
        })?;

        Ok(())
    }

    /// Whether the student already has an account for the semester
    pub async fn exists_with_tx(
        tx: &mut Transaction<'_, MySql>,
        student_id: &str,
        semester_id: &str,
    ) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM fee_accounts WHERE student_id = ? AND semester_id = ?",
        )
        .bind(student_id)
        .bind(semester_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to check fee account: {}", e)))?;

        Ok(row.0 > 0)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<FeeAccount>> {
        sqlx::query_as::<_, FeeAccount>(&format!("{} WHERE id = ?", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch fee account: {}", e)))
    }

    /// Load and row-lock an account for the rest of the transaction
    pub async fn find_for_update(
        tx: &mut Transaction<'_, MySql>,
        id: &str,
    ) -> Result<Option<FeeAccount>> {
        sqlx::query_as::<_, FeeAccount>(&format!("{} WHERE id = ? FOR UPDATE", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to lock fee account: {}", e)))
    }

    /// Apply a settlement computed from the locked row.
    ///
    /// The update only matches while the balance still covers the amount, so
    /// a stale settlement can never overdraw the account.
    pub async fn apply_settlement_with_tx(
        tx: &mut Transaction<'_, MySql>,
        id: &str,
        settlement: &Settlement,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE fee_accounts
            SET paid_amount = paid_amount + ?,
                due_amount = due_amount - ?,
                status = ?,
                updated_at = ?
            WHERE id = ? AND due_amount >= ?
            "#,
        )
        .bind(settlement.amount)
        .bind(settlement.amount)
        .bind(settlement.status.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(settlement.amount)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update fee account balance: {}", e)))?;

        if result.rows_affected() != 1 {
            return Err(AppError::conflict(format!(
                "Balance of fee account '{}' changed while the payment was applied",
                id
            )));
        }

        Ok(())
    }

    pub async fn find_view(&self, id: &str) -> Result<Option<FeeAccountRow>> {
        sqlx::query_as::<_, FeeAccountRow>(&format!("{} WHERE fa.id = ?", VIEW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch fee account: {}", e)))
    }

    /// All accounts of a student, most recent semester first
    pub async fn views_for_student(&self, student_id: &str) -> Result<Vec<FeeAccountRow>> {
        sqlx::query_as::<_, FeeAccountRow>(&format!(
            "{} WHERE fa.student_id = ? ORDER BY fa.due_date DESC, fa.created_at DESC",
            VIEW_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch student fee accounts: {}", e)))
    }

    pub async fn list_views(&self, filter: &AccountFilter) -> Result<Vec<FeeAccountRow>> {
        let mut builder = QueryBuilder::<MySql>::new(VIEW_COLUMNS);
        builder.push(" WHERE 1 = 1");

        if let Some(department_id) = &filter.department_id {
            builder.push(" AND s.department_id = ").push_bind(department_id.clone());
        }
        if let Some(session_id) = &filter.session_id {
            builder.push(" AND sem.session_id = ").push_bind(session_id.clone());
        }
        if let Some(semester_id) = &filter.semester_id {
            builder.push(" AND fa.semester_id = ").push_bind(semester_id.clone());
        }
        if filter.outstanding_only {
            builder.push(" AND fa.due_amount > 0");
        }
        builder.push(" ORDER BY fa.due_date, s.roll_number");

        builder
            .build_query_as::<FeeAccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list fee accounts: {}", e)))
    }
}
