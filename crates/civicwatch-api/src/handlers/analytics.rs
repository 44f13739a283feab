//! Analytics handlers: public trending and the admin dashboard.

use axum::Json;
use axum::extract::State;

use civicwatch_database::repositories::issue::RankedIssue;
use civicwatch_service::analytics::AdminSummary;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/analytics/trending
///
/// The most-liked open issues of the trailing week, public so the
/// landing page can show them without a session.
pub async fn trending(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RankedIssue>>>, ApiError> {
    let issues = state.analytics_service.trending().await?;
    Ok(Json(ApiResponse::ok(issues)))
}

/// GET /api/analytics/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<AdminSummary>>, ApiError> {
    let summary = state.analytics_service.summary(&auth).await?;
    Ok(Json(ApiResponse::ok(summary)))
}
