//! Department handlers. Listing is public; mutations are admin-only
//! (enforced by the service).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use civicwatch_core::error::AppError;
use civicwatch_entity::department::Department;

use crate::dto::request::DepartmentRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/departments
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Department>>>, ApiError> {
    let departments = state.department_service.list().await?;
    Ok(Json(ApiResponse::ok(departments)))
}

/// POST /api/departments
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DepartmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Department>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let department = state
        .department_service
        .create(&auth, &req.name, req.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(department))))
}

/// PUT /api/departments/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<DepartmentRequest>,
) -> Result<Json<ApiResponse<Department>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let department = state
        .department_service
        .update(&auth, id, &req.name, req.description.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(department)))
}

/// DELETE /api/departments/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.department_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
