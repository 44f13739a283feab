//! Photo upload handler.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::Bytes;

use civicwatch_core::error::AppError;
use civicwatch_storage::StoredPhoto;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/uploads/issue-photo: multipart photo upload
///
/// Uploaded ahead of submission; the returned path goes into the
/// issue's photo list when the report is filed.
pub async fn issue_photo(
    State(state): State<AppState>,
    _auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<StoredPhoto>>), ApiError> {
    let mut content_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("photo") {
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
        content_type.ok_or_else(|| AppError::validation("photo content type is required"))?;
    let data = data.ok_or_else(|| AppError::validation("photo field is required"))?;

    let stored = state.photo_store.store_photo(&content_type, data).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(stored))))
}
