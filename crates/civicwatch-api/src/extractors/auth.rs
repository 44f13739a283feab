//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! validates it against the session store, and injects request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use civicwatch_auth::jwt::Claims;
use civicwatch_core::error::AppError;
use civicwatch_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
///
/// Carries the validated claims alongside the request context; logout
/// needs the claims to revoke the exact session the token names.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Request context derived from the claims.
    pub ctx: RequestContext,
    /// The validated access token claims.
    pub claims: Claims,
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

    let claims = state.session_manager.authenticate(token)?;

    // The token outlives a revoked session; check the session row too.
    let session = state
        .session_repo
        .find_by_id(claims.session_id())
        .await?
        .ok_or_else(|| AppError::session("Session no longer exists"))?;
    if !session.is_active() {
        return Err(AppError::session("Session has been revoked or expired"));
    }

    Ok(AuthUser {
        ctx: RequestContext::from_claims(&claims),
        claims,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map_err(ApiError)
    }
}

/// Optional variant for endpoints that serve both anonymous and
/// authenticated viewers (feed and detail views).
///
/// A missing header yields `None`; a present but invalid token is still
/// rejected so clients notice expired sessions instead of silently
/// losing their personalized state.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    /// Viewer user ID, if authenticated.
    pub fn viewer(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|auth| auth.ctx.user_id)
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get("authorization").is_none() {
            return Ok(Self(None));
        }
        authenticate(parts, state)
            .await
            .map(|auth| Self(Some(auth)))
            .map_err(ApiError)
    }
}
