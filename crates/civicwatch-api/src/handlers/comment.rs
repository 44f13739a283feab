//! Comment handlers: thread listing, posting, editing, deletion.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use civicwatch_core::error::AppError;
use civicwatch_core::types::pagination::PageResponse;
use civicwatch_entity::comment::Comment;

use crate::dto::request::CommentBodyRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/issues/{id}/comments
///
/// Public; threads render oldest-first so conversations read in order.
pub async fn list(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Comment>>>, ApiError> {
    let page = state
        .comment_service
        .list(issue_id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/issues/{id}/comments
pub async fn post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(issue_id): Path<Uuid>,
    Json(req): Json<CommentBodyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let comment = state.comment_service.post(&auth, issue_id, &req.body).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

/// PUT /api/comments/{id}
pub async fn edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(req): Json<CommentBodyRequest>,
) -> Result<Json<ApiResponse<Comment>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let comment = state.comment_service.edit(&auth, comment_id, &req.body).await?;
    Ok(Json(ApiResponse::ok(comment)))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(&auth, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
