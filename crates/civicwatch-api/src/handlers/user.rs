//! User profile handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use bytes::Bytes;
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_database::repositories::user::UserIssueStats;
use civicwatch_service::user::UserProfile;

use crate::dto::request::{ChangePasswordRequest, UpdateProfileRequest};
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/{id}
///
/// Public profile with contribution statistics.
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state.user_service.profile(id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /api/users/me/stats
pub async fn my_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserIssueStats>>, ApiError> {
    let stats = state.user_service.stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_service
        .update_profile(&auth, req.full_name, req.avatar_url)
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/me/avatar: multipart image upload
pub async fn update_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let mut content_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("avatar") {
            content_type = field.content_type().map(String::from);
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
            );
        }
    }

    let content_type =
        content_type.ok_or_else(|| AppError::validation("avatar content type is required"))?;
    let data = data.ok_or_else(|| AppError::validation("avatar field is required"))?;

    let user = state
        .user_service
        .update_avatar(&auth, &content_type, data)
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .user_service
        .change_password(&auth, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Password changed; all sessions revoked".to_string(),
    })))
}
