use chrono::NaiveDate;

use crate::core::money::validate_positive;
use crate::core::{AppError, InstitutionClock, Result};
use crate::modules::directory::{DirectoryRepository, Semester, Student};
use crate::modules::events::{EventPublisher, LedgerEvent};
use crate::modules::fee_accounts::models::{
    AssignmentSummary, AutoAssignRequest, CohortTarget, FeeAccount, FeeAccountView,
    ManualAssignRequest, ManualSource, StudentFees,
};
use crate::modules::fee_accounts::repositories::FeeAccountRepository;
use crate::modules::fee_accounts::services::LateFeeCalculator;
use crate::modules::fee_structures::{FeeStructure, FeeStructureRepository};

/// Fee assignment engine and fee account read paths
pub struct FeeAccountService {
    accounts: FeeAccountRepository,
    structures: FeeStructureRepository,
    directory: DirectoryRepository,
    events: EventPublisher,
    clock: InstitutionClock,
}

impl FeeAccountService {
    pub fn new(
        accounts: FeeAccountRepository,
        structures: FeeStructureRepository,
        directory: DirectoryRepository,
        events: EventPublisher,
        clock: InstitutionClock,
    ) -> Self {
        Self {
            accounts,
            structures,
            directory,
            events,
            clock,
        }
    }

    /// Bill a cohort from a fee structure.
    ///
    /// Students are processed in order inside one transaction. A student that
    /// cannot be billed (already assigned, inactive, unknown, other
    /// department) is recorded as a failure and the rest of the cohort
    /// continues. Only infrastructure errors abort the whole call.
    pub async fn auto_assign(
        &self,
        request: &AutoAssignRequest,
        assigned_by: &str,
    ) -> Result<AssignmentSummary> {
        let target = request.target()?;
        let semester_id = request.semester_id()?;
        let structure_id = request.fee_structure_id()?;
        let due_date = request.due_date()?;

        let semester = self.semester(&semester_id).await?;
        let structure = self.structure(&structure_id).await?;
        ensure_structure_matches_semester(&structure, &semester)?;

        let candidates: Vec<(String, Option<Student>)> = match &target {
            CohortTarget::Department(department_id) => {
                if *department_id != structure.department_id {
                    return Err(AppError::validation(format!(
                        "Fee structure '{}' belongs to department '{}', not '{}'",
                        structure.id, structure.department_id, department_id
                    )));
                }
                self.directory
                    .active_students_in_department(department_id)
                    .await?
                    .into_iter()
                    .map(|s| (s.id.clone(), Some(s)))
                    .collect()
            }
            CohortTarget::Students(ids) => {
                let found = self.directory.find_students(ids).await?;
                ids.iter()
                    .map(|id| (id.clone(), found.iter().find(|s| &s.id == id).cloned()))
                    .collect()
            }
        };

        let mut summary = AssignmentSummary::default();
        let mut created: Vec<FeeAccount> = Vec::new();

        let mut tx = self
            .accounts
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        for (student_id, student) in &candidates {
            let outcome = match student {
                Some(student) => {
                    self.assign_in_cohort(&mut tx, student, &structure, &semester, due_date, assigned_by)
                        .await
                }
                None => Err(AppError::not_found(format!("Student '{}' not found", student_id))),
            };

            match outcome {
                Ok(account) => {
                    summary.record_success(student_id, &account.id);
                    created.push(account);
                }
                Err(AppError::Conflict(reason))
                | Err(AppError::Validation(reason))
                | Err(AppError::NotFound(reason)) => {
                    tracing::debug!(student_id = %student_id, reason = %reason, "Student skipped");
                    summary.record_failure(student_id, reason);
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(
            semester_id = %semester.id,
            fee_structure_id = %structure.id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Cohort fee assignment completed"
        );

        for account in created {
            self.events.publish(assigned_event(&account));
        }
        self.events.publish(LedgerEvent::CohortAssigned {
            semester_id: semester.id.clone(),
            fee_structure_id: structure.id.clone(),
            succeeded: summary.succeeded,
            failed: summary.failed,
            assigned_by: assigned_by.to_string(),
        });

        Ok(summary)
    }

    async fn assign_in_cohort(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
        student: &Student,
        structure: &FeeStructure,
        semester: &Semester,
        due_date: NaiveDate,
        assigned_by: &str,
    ) -> Result<FeeAccount> {
        if !student.is_active {
            return Err(AppError::validation(format!(
                "Student '{}' is not active",
                student.id
            )));
        }
        if student.department_id != structure.department_id {
            return Err(AppError::validation(format!(
                "Student '{}' belongs to department '{}', fee structure is for '{}'",
                student.id, student.department_id, structure.department_id
            )));
        }
        if FeeAccountRepository::exists_with_tx(tx, &student.id, &semester.id).await? {
            return Err(AppError::conflict(format!(
                "Fee already assigned to student '{}' for semester '{}'",
                student.id, semester.id
            )));
        }

        let account = FeeAccount::new(
            &student.id,
            &semester.id,
            Some(structure.id.clone()),
            structure.total_fee,
            due_date,
            None,
            assigned_by,
        )?;
        FeeAccountRepository::insert_with_tx(tx, &account).await?;

        Ok(account)
    }

    /// Bill one student, from a structure or a custom amount.
    ///
    /// # Errors
    /// * `400` - missing field, both or neither amount source, inactive student
    /// * `404` - unknown student, semester or structure
    /// * `409` - the student already has an account for the semester
    pub async fn manual_assign(
        &self,
        request: &ManualAssignRequest,
        assigned_by: &str,
    ) -> Result<FeeAccount> {
        let student_id = request.student_id()?;
        let semester_id = request.semester_id()?;
        let due_date = request.due_date()?;
        let source = request.source()?;

        let student = self.student(&student_id).await?;
        if !student.is_active {
            return Err(AppError::validation(format!(
                "Student '{}' is not active",
                student.id
            )));
        }
        let semester = self.semester(&semester_id).await?;

        let (structure_id, total_amount) = match source {
            ManualSource::Structure(id) => {
                let structure = self.structure(&id).await?;
                ensure_structure_matches_semester(&structure, &semester)?;
                if structure.department_id != student.department_id {
                    return Err(AppError::validation(format!(
                        "Fee structure '{}' is for department '{}', student '{}' is in '{}'",
                        structure.id, structure.department_id, student.id, student.department_id
                    )));
                }
                (Some(structure.id), structure.total_fee)
            }
            ManualSource::CustomAmount(amount) => {
                validate_positive("custom_amount", amount)?;
                (None, amount)
            }
        };

        let account = FeeAccount::new(
            &student.id,
            &semester.id,
            structure_id,
            total_amount,
            due_date,
            request.remarks.clone(),
            assigned_by,
        )?;

        let mut tx = self
            .accounts
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        if FeeAccountRepository::exists_with_tx(&mut tx, &student.id, &semester.id).await? {
            return Err(AppError::conflict(format!(
                "Fee already assigned to student '{}' for semester '{}'",
                student.id, semester.id
            )));
        }
        FeeAccountRepository::insert_with_tx(&mut tx, &account).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(
            fee_account_id = %account.id,
            student_id = %account.student_id,
            semester_id = %account.semester_id,
            total_amount = %account.total_amount,
            "Fee assigned"
        );
        self.events.publish(assigned_event(&account));

        Ok(account)
    }

    /// Every account of a student with the late-fee view applied
    pub async fn student_fees(&self, student_id: &str) -> Result<StudentFees> {
        let student = self.student(student_id).await?;
        let today = self.clock.today();

        let accounts = self
            .accounts
            .views_for_student(student_id)
            .await?
            .into_iter()
            .map(|row| {
                let assessment = LateFeeCalculator::assess_row(&row, today);
                FeeAccountView::new(row, assessment)
            })
            .collect();

        Ok(StudentFees::new(student, accounts))
    }

    pub async fn account_view(&self, fee_account_id: &str) -> Result<FeeAccountView> {
        let row = self
            .accounts
            .find_view(fee_account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Fee account '{}' not found", fee_account_id))
            })?;

        let assessment = LateFeeCalculator::assess_row(&row, self.clock.today());
        Ok(FeeAccountView::new(row, assessment))
    }

    async fn student(&self, id: &str) -> Result<Student> {
        self.directory
            .find_student(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student '{}' not found", id)))
    }

    async fn semester(&self, id: &str) -> Result<Semester> {
        self.directory
            .find_semester(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Semester '{}' not found", id)))
    }

    async fn structure(&self, id: &str) -> Result<FeeStructure> {
        self.structures
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Fee structure '{}' not found", id)))
    }
}

/// A structure may only bill the semester number and session it was priced for
fn ensure_structure_matches_semester(structure: &FeeStructure, semester: &Semester) -> Result<()> {
    if structure.session_id != semester.session_id
        || structure.semester_number != semester.semester_number
    {
        return Err(AppError::validation(format!(
            "Fee structure '{}' is for semester {} of session '{}', not semester {} of session '{}'",
            structure.id,
            structure.semester_number,
            structure.session_id,
            semester.semester_number,
            semester.session_id
        )));
    }
    Ok(())
}

fn assigned_event(account: &FeeAccount) -> LedgerEvent {
    LedgerEvent::FeeAssigned {
        fee_account_id: account.id.clone(),
        student_id: account.student_id.clone(),
        semester_id: account.semester_id.clone(),
        total_amount: account.total_amount,
        due_date: account.due_date,
        assigned_by: account.assigned_by.clone(),
    }
}
