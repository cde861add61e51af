use crate::core::{AppError, Result};
use crate::modules::directory::DirectoryRepository;
use crate::modules::fee_structures::models::{
    CreateFeeStructureRequest, FeeStructure, FeeStructureFilter, UpdateFeeStructureRequest,
};
use crate::modules::fee_structures::repositories::FeeStructureRepository;

/// Catalog of fee structures
pub struct FeeStructureService {
    repo: FeeStructureRepository,
    directory: DirectoryRepository,
}

impl FeeStructureService {
    pub fn new(repo: FeeStructureRepository, directory: DirectoryRepository) -> Self {
        Self { repo, directory }
    }

    /// Create a structure for a (department, semester number, session) scope.
    ///
    /// # Errors
    /// * `400` - missing scope field or invalid amount
    /// * `404` - unknown department or session
    /// * `409` - a structure already exists for the scope
    pub async fn create(
        &self,
        request: &CreateFeeStructureRequest,
        created_by: &str,
    ) -> Result<FeeStructure> {
        let scope = request.scope()?;
        let structure = FeeStructure::new(
            scope.clone(),
            request.components(),
            request.late_fee_per_day.unwrap_or_default(),
            request.description.clone(),
            created_by,
        )?;

        if !self.directory.department_exists(&scope.department_id).await? {
            return Err(AppError::not_found(format!(
                "Department '{}' not found",
                scope.department_id
            )));
        }
        if !self.directory.session_exists(&scope.session_id).await? {
            return Err(AppError::not_found(format!(
                "Academic session '{}' not found",
                scope.session_id
            )));
        }

        // The unique key still guards against a concurrent create slipping past this check
        if self.repo.find_by_scope(&scope).await?.is_some() {
            return Err(AppError::conflict(format!(
                "A fee structure already exists for department '{}', semester {}, session '{}'",
                scope.department_id, scope.semester_number, scope.session_id
            )));
        }

        self.repo.create(&structure).await?;

        tracing::info!(
            fee_structure_id = %structure.id,
            department_id = %structure.department_id,
            semester_number = structure.semester_number,
            session_id = %structure.session_id,
            total_fee = %structure.total_fee,
            "Fee structure created"
        );

        Ok(structure)
    }

    /// Merge `update` over the stored structure and persist it.
    ///
    /// Fee accounts already billed from the structure keep their amounts.
    pub async fn update(&self, id: &str, update: &UpdateFeeStructureRequest) -> Result<FeeStructure> {
        let mut structure = self.get(id).await?;
        structure.apply_update(update)?;
        self.repo.update(&structure).await?;

        tracing::info!(
            fee_structure_id = %structure.id,
            total_fee = %structure.total_fee,
            "Fee structure updated"
        );

        Ok(structure)
    }

    pub async fn get(&self, id: &str) -> Result<FeeStructure> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Fee structure '{}' not found", id)))
    }

    pub async fn list(&self, filter: &FeeStructureFilter) -> Result<Vec<FeeStructure>> {
        self.repo.list(filter).await
    }
}
