//! Category suggestion handler.

use axum::Json;
use axum::extract::State;

use crate::dto::request::SuggestCategoryRequest;
use crate::dto::response::{ApiResponse, SuggestResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/suggest/category
///
/// Advisory only; `category: null` means the gateway had no confident
/// answer and the client should leave the field to the reporter.
pub async fn category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<SuggestCategoryRequest>,
) -> Result<Json<ApiResponse<SuggestResponse>>, ApiError> {
    let category = state.suggest_gateway.suggest(&req.description).await;
    Ok(Json(ApiResponse::ok(SuggestResponse { category })))
}
