//! User-facing account service.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use civicwatch_auth::password::{PasswordHasher, PasswordValidator};
use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_database::repositories::comment::CommentRepository;
use civicwatch_database::repositories::issue::IssueRepository;
use civicwatch_database::repositories::session::SessionRepository;
use civicwatch_database::repositories::user::{UserIssueStats, UserRepository};
use civicwatch_entity::user::model::{CreateUser, UpdateProfile};
use civicwatch_entity::user::{User, UserRole};
use civicwatch_storage::PhotoStore;

use crate::context::RequestContext;

/// Payload for account registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Login email, unique case-insensitively.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Plaintext password, checked against the strength policy.
    pub password: String,
}

/// A user's profile with contribution statistics.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    /// The user record (password hash never serialized).
    pub user: User,
    /// Reporting statistics.
    pub stats: UserIssueStats,
}

/// Service for registration and profile management.
#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    issue_repo: Arc<IssueRepository>,
    comment_repo: Arc<CommentRepository>,
    session_repo: Arc<SessionRepository>,
    password_hasher: Arc<PasswordHasher>,
    password_validator: PasswordValidator,
    photo_store: Arc<PhotoStore>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        issue_repo: Arc<IssueRepository>,
        comment_repo: Arc<CommentRepository>,
        session_repo: Arc<SessionRepository>,
        password_hasher: Arc<PasswordHasher>,
        password_validator: PasswordValidator,
        photo_store: Arc<PhotoStore>,
    ) -> Self {
        Self {
            user_repo,
            issue_repo,
            comment_repo,
            session_repo,
            password_hasher,
            password_validator,
            photo_store,
        }
    }

    /// Register a new citizen account.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        let email = validate_email(&request.email)?;
        let full_name = validate_full_name(&request.full_name)?;
        self.password_validator.validate(&request.password)?;

        let password_hash = self.password_hasher.hash_password(&request.password).await?;

        let user = self
            .user_repo
            .create(&CreateUser {
                email,
                password_hash,
                full_name,
                role: UserRole::Citizen,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// The caller's own user record.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))
    }

    /// A user's profile with contribution statistics.
    pub async fn profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        let stats = self.user_repo.issue_stats(user_id).await?;
        Ok(UserProfile { user, stats })
    }

    /// The caller's reporting statistics.
    pub async fn stats(&self, ctx: &RequestContext) -> AppResult<UserIssueStats> {
        self.user_repo.issue_stats(ctx.user_id).await
    }

    /// Update the caller's display name and/or avatar URL.
    ///
    /// The denormalized author snapshots on the caller's issues and
    /// comments are refreshed best-effort afterwards; a snapshot refresh
    /// failure never fails the profile update.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        full_name: Option<String>,
        avatar_url: Option<String>,
    ) -> AppResult<User> {
        let full_name = match full_name {
            Some(name) => Some(validate_full_name(&name)?),
            None => None,
        };

        let user = self
            .user_repo
            .update_profile(&UpdateProfile {
                id: ctx.user_id,
                full_name,
                avatar_url,
            })
            .await?;

        self.refresh_snapshots(&user).await;

        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Store a new avatar image and point the caller's profile at it.
    pub async fn update_avatar(
        &self,
        ctx: &RequestContext,
        content_type: &str,
        data: Bytes,
    ) -> AppResult<User> {
        let stored = self
            .photo_store
            .store_avatar(ctx.user_id, content_type, data)
            .await?;
        self.update_profile(ctx, None, Some(stored.url)).await
    }

    /// Change the caller's password. All sessions are revoked so stolen
    /// refresh tokens die with the old password.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.me(ctx).await?;

        let current_valid = self
            .password_hasher
            .verify_password(current_password, &user.password_hash)
            .await?;
        if !current_valid {
            return Err(AppError::authentication("Current password is incorrect"));
        }

        self.password_validator
            .validate_not_same(current_password, new_password)?;
        self.password_validator.validate(new_password)?;

        let new_hash = self.password_hasher.hash_password(new_password).await?;
        self.user_repo.update_password(user.id, &new_hash).await?;

        let revoked = self.session_repo.revoke_all_for_user(user.id).await?;
        info!(user_id = %user.id, revoked, "Password changed, sessions revoked");
        Ok(())
    }

    async fn refresh_snapshots(&self, user: &User) {
        let result = self
            .issue_repo
            .refresh_reporter_snapshot(user.id, &user.full_name, user.avatar_url.as_deref())
            .await;
        if let Err(e) = result {
            warn!(user_id = %user.id, error = %e, "Issue snapshot refresh failed");
        }

        let result = self
            .comment_repo
            .refresh_author_snapshot(user.id, &user.full_name, user.avatar_url.as_deref())
            .await;
        if let Err(e) = result {
            warn!(user_id = %user.id, error = %e, "Comment snapshot refresh failed");
        }
    }
}

fn validate_email(email: &str) -> AppResult<String> {
    let trimmed = email.trim();
    let valid = trimmed.len() >= 3
        && trimmed.contains('@')
        && !trimmed.starts_with('@')
        && !trimmed.ends_with('@');
    if !valid {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(trimmed.to_string())
}

fn validate_full_name(full_name: &str) -> AppResult<String> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Full name must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.test ").unwrap(), "a@b.test");
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@b.test").is_err());
        assert!(validate_email("a@").is_err());
    }

    #[test]
    fn test_validate_full_name() {
        assert_eq!(validate_full_name(" Asha R ").unwrap(), "Asha R");
        assert!(validate_full_name("   ").is_err());
    }
}
