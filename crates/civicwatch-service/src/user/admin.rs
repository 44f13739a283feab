//! Admin-side account management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_core::types::pagination::{PageRequest, PageResponse};
use civicwatch_database::repositories::session::SessionRepository;
use civicwatch_database::repositories::user::UserRepository;
use civicwatch_entity::user::{User, UserRole, UserStatus};

use crate::context::RequestContext;

/// Service for admin management of user accounts.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    user_repo: Arc<UserRepository>,
    session_repo: Arc<SessionRepository>,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(user_repo: Arc<UserRepository>, session_repo: Arc<SessionRepository>) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    /// List all accounts, newest first. Admin-only.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        ctx.require_admin()?;
        self.user_repo.find_all(page).await
    }

    /// Change a user's role. Admin-only. Admins cannot change their own
    /// role, so an instance always keeps at least one reachable admin.
    pub async fn set_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role: UserRole,
    ) -> AppResult<User> {
        ctx.require_admin()?;

        if user_id == ctx.user_id {
            return Err(AppError::conflict("You cannot change your own role"));
        }

        let user = self.user_repo.update_role(user_id, role).await?;
        info!(user_id = %user_id, role = %role, actor = %ctx.user_id, "User role changed");
        Ok(user)
    }

    /// Enable or disable an account. Admin-only. Disabling revokes every
    /// active session so the account is locked out immediately, not at
    /// token expiry.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        status: UserStatus,
    ) -> AppResult<User> {
        ctx.require_admin()?;

        if user_id == ctx.user_id {
            return Err(AppError::conflict("You cannot change your own status"));
        }

        let user = self.user_repo.update_status(user_id, status).await?;

        if status == UserStatus::Disabled {
            let revoked = self.session_repo.revoke_all_for_user(user_id).await?;
            info!(user_id = %user_id, revoked, "Disabled account sessions revoked");
        }

        info!(user_id = %user_id, status = %status, actor = %ctx.user_id, "User status changed");
        Ok(user)
    }
}
