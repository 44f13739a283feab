//! Issue handlers: submission, feed, map, proximity, lifecycle, likes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use civicwatch_core::types::pagination::PageResponse;
use civicwatch_database::repositories::issue::{IssueFilter, NearbyIssue};
use civicwatch_entity::issue::Issue;
use civicwatch_service::issue::{CreateIssueRequest, IssueSubmission, IssueWithStats};
use civicwatch_service::engagement::EngagementState;

use crate::dto::request::{AssignDepartmentRequest, FeedFilterQuery, NearbyQuery, UpdateStatusRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, OptionalAuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/issues
///
/// Returns 201 with the stored issue and the advisory duplicate
/// candidates near its pinned point.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateIssueRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IssueSubmission>>), ApiError> {
    let submission = state.issue_service.create(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(submission))))
}

/// GET /api/issues
pub async fn feed(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Query(filter): Query<FeedFilterQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<IssueWithStats>>>, ApiError> {
    let filter = IssueFilter {
        status: filter.status,
        category: filter.category,
        department_id: filter.department_id,
    };
    let page = state
        .issue_service
        .feed(&filter, &params.into_page_request(), viewer.viewer())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/issues/mine
pub async fn mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<IssueWithStats>>>, ApiError> {
    let page = state
        .issue_service
        .mine(&auth, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/issues/map
pub async fn map_points(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Issue>>>, ApiError> {
    let issues = state.issue_service.map_points().await?;
    Ok(Json(ApiResponse::ok(issues)))
}

/// GET /api/issues/nearby?latitude=..&longitude=..
///
/// The pre-submission duplicate check: open issues within the
/// configured radius, nearest first.
pub async fn nearby(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyIssue>>>, ApiError> {
    let candidates = state
        .issue_service
        .nearby(query.latitude, query.longitude)
        .await?;
    Ok(Json(ApiResponse::ok(candidates)))
}

/// GET /api/issues/{id}
pub async fn detail(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueWithStats>>, ApiError> {
    let issue = state.issue_service.detail(id, viewer.viewer()).await?;
    Ok(Json(ApiResponse::ok(issue)))
}

/// PUT /api/issues/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Issue>>, ApiError> {
    let issue = state.issue_service.update_status(&auth, id, req.status).await?;
    Ok(Json(ApiResponse::ok(issue)))
}

/// PUT /api/issues/{id}/department
pub async fn assign_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignDepartmentRequest>,
) -> Result<Json<ApiResponse<Issue>>, ApiError> {
    let issue = state
        .issue_service
        .assign_department(&auth, id, req.department_id)
        .await?;
    Ok(Json(ApiResponse::ok(issue)))
}

/// DELETE /api/issues/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.issue_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/issues/{id}/like
///
/// Idempotent toggle; the response carries the authoritative state so
/// optimistic UI updates can reconcile.
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EngagementState>>, ApiError> {
    let engagement = state.engagement_service.toggle(&auth, id).await?;
    Ok(Json(ApiResponse::ok(engagement)))
}

/// GET /api/issues/{id}/likes
pub async fn like_state(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EngagementState>>, ApiError> {
    let engagement = state
        .engagement_service
        .state_for(id, viewer.viewer())
        .await?;
    Ok(Json(ApiResponse::ok(engagement)))
}
