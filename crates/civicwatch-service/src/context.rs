//! Request context carrying the authenticated user, session, and resolved role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use civicwatch_auth::jwt::Claims;
use civicwatch_core::error::AppError;
use civicwatch_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Extracted by middleware and passed into service methods so that
/// every operation knows *who* is acting and from *which* session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The current session ID.
    pub session_id: Uuid,
    /// The user's role at the time the JWT was issued.
    pub role: UserRole,
    /// The login email (convenience field from JWT claims).
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, session_id: Uuid, role: UserRole, email: String) -> Self {
        Self {
            user_id,
            session_id,
            role,
            email,
            request_time: Utc::now(),
        }
    }

    /// Builds a context from validated JWT claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(
            claims.user_id(),
            claims.session_id(),
            claims.role,
            claims.email.clone(),
        )
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns whether the current user is an official or admin.
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Rejects non-admin callers.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Administrator access required"))
        }
    }

    /// Rejects callers below official.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::authorization("Official access required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), role, "a@b.test".into())
    }

    #[test]
    fn test_role_gates() {
        assert!(ctx(UserRole::Admin).require_admin().is_ok());
        assert!(ctx(UserRole::Official).require_admin().is_err());
        assert!(ctx(UserRole::Official).require_staff().is_ok());
        assert!(ctx(UserRole::Citizen).require_staff().is_err());
    }
}
