//! Admin account-management handlers. Authorization checks live in the
//! service so the CLI shares them.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use civicwatch_core::types::pagination::PageResponse;

use crate::dto::request::{ChangeRoleRequest, ChangeStatusRequest};
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<UserResponse>>>, ApiError> {
    let page = state
        .admin_user_service
        .list(&auth, &params.into_page_request())
        .await?;

    let page = PageResponse {
        items: page.items.into_iter().map(UserResponse::from).collect(),
        page: page.page,
        page_size: page.page_size,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next: page.has_next,
        has_previous: page.has_previous,
    };
    Ok(Json(ApiResponse::ok(page)))
}

/// PUT /api/admin/users/{id}/role
pub async fn set_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.admin_user_service.set_role(&auth, id, req.role).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/admin/users/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .admin_user_service
        .set_status(&auth, id, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
