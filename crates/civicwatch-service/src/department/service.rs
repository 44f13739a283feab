//! Department CRUD service. Mutations are admin-only; listing is public
//! so citizens can see who handles what.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_database::repositories::department::DepartmentRepository;
use civicwatch_entity::department::model::{CreateDepartment, Department};

use crate::context::RequestContext;

/// Service for managing the department catalogue.
#[derive(Debug, Clone)]
pub struct DepartmentService {
    department_repo: Arc<DepartmentRepository>,
}

impl DepartmentService {
    /// Creates a new department service.
    pub fn new(department_repo: Arc<DepartmentRepository>) -> Self {
        Self { department_repo }
    }

    /// All departments, alphabetical.
    pub async fn list(&self) -> AppResult<Vec<Department>> {
        self.department_repo.find_all().await
    }

    /// Create a department. Admin-only; the name must be non-empty and
    /// unique (uniqueness enforced by the database).
    pub async fn create(
        &self,
        ctx: &RequestContext,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Department> {
        ctx.require_admin()?;
        let name = validate_name(name)?;

        let department = self
            .department_repo
            .create(&CreateDepartment {
                name,
                description: description.map(str::to_string),
            })
            .await?;

        info!(department_id = %department.id, name = %department.name, "Department created");
        Ok(department)
    }

    /// Rename a department or update its description. Admin-only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        department_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Department> {
        ctx.require_admin()?;
        let name = validate_name(name)?;

        let department = self
            .department_repo
            .update(department_id, &name, description)
            .await?;

        info!(department_id = %department_id, "Department updated");
        Ok(department)
    }

    /// Delete a department. Admin-only. Issues assigned to it fall back
    /// to unassigned via the FK's `ON DELETE SET NULL`.
    pub async fn delete(&self, ctx: &RequestContext, department_id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;

        if !self.department_repo.delete(department_id).await? {
            return Err(AppError::not_found(format!(
                "Department {department_id} not found"
            )));
        }

        info!(department_id = %department_id, "Department deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Department name must not be empty"));
    }
    Ok(trimmed.to_string())
}
