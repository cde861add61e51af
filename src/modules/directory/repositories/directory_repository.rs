use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};

use crate::core::{AppError, Result};
use crate::modules::directory::models::{Semester, Student};

const STUDENT_BY_ID: &str = r#"
    SELECT id, roll_number, full_name, email, department_id, is_active
    FROM students
    WHERE id = ?
"#;

/// Lookups against the student and semester tables
#[derive(Clone)]
pub struct DirectoryRepository {
    pool: MySqlPool,
}

impl DirectoryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn find_student(&self, id: &str) -> Result<Option<Student>> {
        sqlx::query_as::<_, Student>(STUDENT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch student: {}", e)))
    }

    /// Student lookup on the connection that already holds a fee account lock
    pub async fn find_student_with_tx(
        tx: &mut Transaction<'_, MySql>,
        id: &str,
    ) -> Result<Option<Student>> {
        sqlx::query_as::<_, Student>(STUDENT_BY_ID)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch student: {}", e)))
    }

    /// Students matching `ids`; unknown ids are simply absent from the result
    pub async fn find_students(&self, ids: &[String]) -> Result<Vec<Student>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut builder = QueryBuilder::<MySql>::new(
            "SELECT id, roll_number, full_name, email, department_id, is_active FROM students WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        builder
            .build_query_as::<Student>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch students: {}", e)))
    }

    /// Active students of a department, in roll-number order
    pub async fn active_students_in_department(&self, department_id: &str) -> Result<Vec<Student>> {
        sqlx::query_as::<_, Student>(
            r#"
            SELECT id, roll_number, full_name, email, department_id, is_active
            FROM students
            WHERE department_id = ? AND is_active = TRUE
            ORDER BY roll_number
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch department students: {}", e)))
    }

    pub async fn find_semester(&self, id: &str) -> Result<Option<Semester>> {
        sqlx::query_as::<_, Semester>(
            r#"
            SELECT id, session_id, semester_number, label
            FROM semesters
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch semester: {}", e)))
    }

    pub async fn department_exists(&self, id: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check department: {}", e)))?;

        Ok(row.0 > 0)
    }

    pub async fn session_exists(&self, id: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM academic_sessions WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check session: {}", e)))?;

        Ok(row.0 > 0)
    }
}
