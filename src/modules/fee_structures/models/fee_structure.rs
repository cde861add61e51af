// A fee structure is the priced catalog entry that fee accounts are
// instantiated from. The total is always the sum of the seven components and
// is recomputed on every write; it is never edited on its own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::money::validate_amount;
use crate::core::{AppError, Result};

/// The seven billable components of a fee structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct FeeComponents {
    pub tuition_fee: Decimal,
    pub admission_fee: Decimal,
    pub lab_fee: Decimal,
    pub library_fee: Decimal,
    pub sports_fee: Decimal,
    pub exam_fee: Decimal,
    pub other_charges: Decimal,
}

impl FeeComponents {
    /// Arithmetic sum of all components
    pub fn total(&self) -> Decimal {
        self.tuition_fee
            + self.admission_fee
            + self.lab_fee
            + self.library_fee
            + self.sports_fee
            + self.exam_fee
            + self.other_charges
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount("tuition_fee", self.tuition_fee)?;
        validate_amount("admission_fee", self.admission_fee)?;
        validate_amount("lab_fee", self.lab_fee)?;
        validate_amount("library_fee", self.library_fee)?;
        validate_amount("sports_fee", self.sports_fee)?;
        validate_amount("exam_fee", self.exam_fee)?;
        validate_amount("other_charges", self.other_charges)?;
        Ok(())
    }
}

/// Uniqueness key of a fee structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeScope {
    pub department_id: String,
    pub semester_number: i32,
    pub session_id: String,
}

/// Stored fee structure
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeeStructure {
    pub id: String,
    pub department_id: String,
    pub semester_number: i32,
    pub session_id: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub components: FeeComponents,
    pub total_fee: Decimal,
    pub late_fee_per_day: Decimal,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeeStructure {
    /// Build a new structure for `scope`, computing its total
    pub fn new(
        scope: FeeScope,
        components: FeeComponents,
        late_fee_per_day: Decimal,
        description: Option<String>,
        created_by: &str,
    ) -> Result<Self> {
        components.validate()?;
        validate_amount("late_fee_per_day", late_fee_per_day)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            department_id: scope.department_id,
            semester_number: scope.semester_number,
            session_id: scope.session_id,
            total_fee: components.total(),
            components,
            late_fee_per_day,
            description: normalize_description(description),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn scope(&self) -> FeeScope {
        FeeScope {
            department_id: self.department_id.clone(),
            semester_number: self.semester_number,
            session_id: self.session_id.clone(),
        }
    }

    /// Merge supplied fields over the current values and recompute the total.
    ///
    /// Fields not supplied keep their current value. Fee accounts already
    /// billed from this structure are unaffected.
    pub fn apply_update(&mut self, update: &UpdateFeeStructureRequest) -> Result<()> {
        let mut components = self.components;
        merge(&mut components.tuition_fee, update.tuition_fee);
        merge(&mut components.admission_fee, update.admission_fee);
        merge(&mut components.lab_fee, update.lab_fee);
        merge(&mut components.library_fee, update.library_fee);
        merge(&mut components.sports_fee, update.sports_fee);
        merge(&mut components.exam_fee, update.exam_fee);
        merge(&mut components.other_charges, update.other_charges);
        components.validate()?;

        let late_fee_per_day = update.late_fee_per_day.unwrap_or(self.late_fee_per_day);
        validate_amount("late_fee_per_day", late_fee_per_day)?;

        self.components = components;
        self.total_fee = components.total();
        self.late_fee_per_day = late_fee_per_day;
        if update.description.is_some() {
            self.description = normalize_description(update.description.clone());
        }
        self.updated_at = Utc::now();

        Ok(())
    }
}

fn merge(slot: &mut Decimal, value: Option<Decimal>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// POST /fees/structures body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateFeeStructureRequest {
    pub department_id: Option<String>,
    pub semester_number: Option<i32>,
    pub session_id: Option<String>,
    pub tuition_fee: Option<Decimal>,
    pub admission_fee: Option<Decimal>,
    pub lab_fee: Option<Decimal>,
    pub library_fee: Option<Decimal>,
    pub sports_fee: Option<Decimal>,
    pub exam_fee: Option<Decimal>,
    pub other_charges: Option<Decimal>,
    pub late_fee_per_day: Option<Decimal>,
    pub description: Option<String>,
}

impl CreateFeeStructureRequest {
    /// Extract the scope key, rejecting missing or blank fields
    pub fn scope(&self) -> Result<FeeScope> {
        let department_id = required_text("department_id", &self.department_id)?;
        let session_id = required_text("session_id", &self.session_id)?;
        let semester_number = self
            .semester_number
            .ok_or_else(|| AppError::validation("semester_number is required"))?;
        if semester_number <= 0 {
            return Err(AppError::validation(
                "semester_number must be greater than zero",
            ));
        }

        Ok(FeeScope {
            department_id,
            semester_number,
            session_id,
        })
    }

    /// Components with unspecified amounts treated as zero
    pub fn components(&self) -> FeeComponents {
        FeeComponents {
            tuition_fee: self.tuition_fee.unwrap_or_default(),
            admission_fee: self.admission_fee.unwrap_or_default(),
            lab_fee: self.lab_fee.unwrap_or_default(),
            library_fee: self.library_fee.unwrap_or_default(),
            sports_fee: self.sports_fee.unwrap_or_default(),
            exam_fee: self.exam_fee.unwrap_or_default(),
            other_charges: self.other_charges.unwrap_or_default(),
        }
    }
}

fn required_text(field: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::validation(format!("{} is required", field))),
    }
}

/// PUT /fees/structures/{id} body; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFeeStructureRequest {
    pub tuition_fee: Option<Decimal>,
    pub admission_fee: Option<Decimal>,
    pub lab_fee: Option<Decimal>,
    pub library_fee: Option<Decimal>,
    pub sports_fee: Option<Decimal>,
    pub exam_fee: Option<Decimal>,
    pub other_charges: Option<Decimal>,
    pub late_fee_per_day: Option<Decimal>,
    pub description: Option<String>,
}

/// GET /fees/structures query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeeStructureFilter {
    pub department_id: Option<String>,
    pub session_id: Option<String>,
    pub semester_number: Option<i32>,
}
