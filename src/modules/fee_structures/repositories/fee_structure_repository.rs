use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::error::is_unique_violation;
use crate::core::{AppError, Result};
use crate::modules::fee_structures::models::{FeeScope, FeeStructure, FeeStructureFilter};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, department_id, semester_number, session_id,
        tuition_fee, admission_fee, lab_fee, library_fee, sports_fee, exam_fee, other_charges,
        total_fee, late_fee_per_day, description, created_by, created_at, updated_at
    FROM fee_structures
"#;

/// Repository for fee structure persistence
#[derive(Clone)]
pub struct FeeStructureRepository {
    pool: MySqlPool,
}

impl FeeStructureRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert a structure; a duplicate scope is reported as a conflict
    pub async fn create(&self, structure: &FeeStructure) -> Result<()> {
        let c = &structure.components;
        sqlx::query(
            r#"
            INSERT INTO fee_structures (
                id, department_id, semester_number, session_id,
                tuition_fee, admission_fee, lab_fee, library_fee, sports_fee, exam_fee, other_charges,
                total_fee, late_fee_per_day, description, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&structure.id)
        .bind(&structure.department_id)
        .bind(structure.semester_number)
        .bind(&structure.session_id)
        .bind(c.tuition_fee)
        .bind(c.admission_fee)
        .bind(c.lab_fee)
        .bind(c.library_fee)
        .bind(c.sports_fee)
        .bind(c.exam_fee)
        .bind(c.other_charges)
        .bind(structure.total_fee)
        .bind(structure.late_fee_per_day)
        .bind(&structure.description)
        .bind(&structure.created_by)
        .bind(structure.created_at)
        .bind(structure.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("uq_fee_structure_scope")) {
                return AppError::conflict(format!(
                    "A fee structure already exists for department '{}', semester {}, session '{}'",
                    structure.department_id, structure.semester_number, structure.session_id
                ));
            }
            AppError::Internal(format!("Failed to create fee structure: {}", e))
        })?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<FeeStructure>> {
        sqlx::query_as::<_, FeeStructure>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch fee structure: {}", e)))
    }

    pub async fn find_by_scope(&self, scope: &FeeScope) -> Result<Option<FeeStructure>> {
        sqlx::query_as::<_, FeeStructure>(&format!(
            "{} WHERE department_id = ? AND semester_number = ? AND session_id = ?",
            SELECT_COLUMNS
        ))
        .bind(&scope.department_id)
        .bind(scope.semester_number)
        .bind(&scope.session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch fee structure: {}", e)))
    }

    /// Persist components, total, late fee and description of an existing structure
    pub async fn update(&self, structure: &FeeStructure) -> Result<()> {
        let c = &structure.components;
        let result = sqlx::query(
            r#"
            UPDATE fee_structures
            SET tuition_fee = ?, admission_fee = ?, lab_fee = ?, library_fee = ?,
                sports_fee = ?, exam_fee = ?, other_charges = ?,
                total_fee = ?, late_fee_per_day = ?, description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(c.tuition_fee)
        .bind(c.admission_fee)
        .bind(c.lab_fee)
        .bind(c.library_fee)
        .bind(c.sports_fee)
        .bind(c.exam_fee)
        .bind(c.other_charges)
        .bind(structure.total_fee)
        .bind(structure.late_fee_per_day)
        .bind(&structure.description)
        .bind(structure.updated_at)
        .bind(&structure.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update fee structure: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Fee structure '{}' not found",
                structure.id
            )));
        }

        Ok(())
    }

    pub async fn list(&self, filter: &FeeStructureFilter) -> Result<Vec<FeeStructure>> {
        let mut builder = QueryBuilder::<MySql>::new(SELECT_COLUMNS);
        builder.push(" WHERE 1 = 1");

        if let Some(department_id) = &filter.department_id {
            builder.push(" AND department_id = ").push_bind(department_id.clone());
        }
        if let Some(session_id) = &filter.session_id {
            builder.push(" AND session_id = ").push_bind(session_id.clone());
        }
        if let Some(semester_number) = filter.semester_number {
            builder.push(" AND semester_number = ").push_bind(semester_number);
        }
        builder.push(" ORDER BY session_id, department_id, semester_number");

        builder
            .build_query_as::<FeeStructure>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list fee structures: {}", e)))
    }
}
