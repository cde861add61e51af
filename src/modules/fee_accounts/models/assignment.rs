use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Who a cohort assignment targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CohortTarget {
    /// Every active student of the department
    Department(String),
    /// An explicit list of student ids, in request order
    Students(Vec<String>),
}

/// POST /fees/assign/auto body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutoAssignRequest {
    pub department_id: Option<String>,
    pub student_ids: Option<Vec<String>>,
    pub semester_id: Option<String>,
    pub fee_structure_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl AutoAssignRequest {
    /// Exactly one of `department_id` / `student_ids` must be given
    pub fn target(&self) -> Result<CohortTarget> {
        let department = self
            .department_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        match (department, &self.student_ids) {
            (Some(_), Some(_)) => Err(AppError::validation(
                "Provide either department_id or student_ids, not both",
            )),
            (None, None) => Err(AppError::validation(
                "Either department_id or student_ids is required",
            )),
            (Some(department), None) => Ok(CohortTarget::Department(department.to_string())),
            (None, Some(ids)) => {
                let mut unique: Vec<String> = Vec::with_capacity(ids.len());
                for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
                    if !unique.iter().any(|u| u == id) {
                        unique.push(id.to_string());
                    }
                }
                if unique.is_empty() {
                    return Err(AppError::validation("student_ids cannot be empty"));
                }
                Ok(CohortTarget::Students(unique))
            }
        }
    }

    pub fn semester_id(&self) -> Result<String> {
        required_text("semester_id", &self.semester_id)
    }

    pub fn fee_structure_id(&self) -> Result<String> {
        required_text("fee_structure_id", &self.fee_structure_id)
    }

    pub fn due_date(&self) -> Result<NaiveDate> {
        self.due_date
            .ok_or_else(|| AppError::validation("due_date is required"))
    }
}

/// Where a manual assignment takes its amount from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualSource {
    Structure(String),
    CustomAmount(Decimal),
}

/// POST /fees/assign/manual body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualAssignRequest {
    pub student_id: Option<String>,
    pub semester_id: Option<String>,
    pub fee_structure_id: Option<String>,
    pub custom_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

impl ManualAssignRequest {
    pub fn student_id(&self) -> Result<String> {
        required_text("student_id", &self.student_id)
    }

    pub fn semester_id(&self) -> Result<String> {
        required_text("semester_id", &self.semester_id)
    }

    pub fn due_date(&self) -> Result<NaiveDate> {
        self.due_date
            .ok_or_else(|| AppError::validation("due_date is required"))
    }

    /// Exactly one of `fee_structure_id` / `custom_amount` must be given
    pub fn source(&self) -> Result<ManualSource> {
        let structure = self
            .fee_structure_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (structure, self.custom_amount) {
            (Some(_), Some(_)) => Err(AppError::validation(
                "Provide either fee_structure_id or custom_amount, not both",
            )),
            (None, None) => Err(AppError::validation(
                "Either fee_structure_id or custom_amount is required",
            )),
            (Some(id), None) => Ok(ManualSource::Structure(id.to_string())),
            (None, Some(amount)) => Ok(ManualSource::CustomAmount(amount)),
        }
    }
}

fn required_text(field: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::validation(format!("{} is required", field))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedAccount {
    pub student_id: String,
    pub fee_account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentFailure {
    pub student_id: String,
    pub reason: String,
}

/// Outcome of a cohort assignment; per-student failures do not abort the batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignmentSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub assigned: Vec<AssignedAccount>,
    pub failures: Vec<AssignmentFailure>,
}

impl AssignmentSummary {
    pub fn record_success(&mut self, student_id: &str, fee_account_id: &str) {
        self.succeeded += 1;
        self.assigned.push(AssignedAccount {
            student_id: student_id.to_string(),
            fee_account_id: fee_account_id.to_string(),
        });
    }

    pub fn record_failure(&mut self, student_id: &str, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(AssignmentFailure {
            student_id: student_id.to_string(),
            reason: reason.into(),
        });
    }
}
