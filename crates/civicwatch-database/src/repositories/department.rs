//! Department repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use civicwatch_core::error::{AppError, ErrorKind};
use civicwatch_core::result::AppResult;
use civicwatch_entity::department::model::{CreateDepartment, Department};

/// Repository for department CRUD operations.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a department by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find department", e))
    }

    /// List all departments alphabetically.
    pub async fn find_all(&self) -> AppResult<Vec<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list departments", e)
            })
    }

    /// Create a new department.
    pub async fn create(&self, data: &CreateDepartment) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("departments_name_key") =>
            {
                AppError::conflict(format!("Department '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create department", e),
        })
    }

    /// Rename a department or update its description.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "UPDATE departments SET name = $2, description = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("departments_name_key") =>
            {
                AppError::conflict(format!("Department '{name}' already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update department", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))
    }

    /// Delete a department. Issues assigned to it fall back to unassigned.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete department", e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
