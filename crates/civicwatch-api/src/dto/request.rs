//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use civicwatch_entity::issue::IssueStatus;
use civicwatch_entity::user::{UserRole, UserStatus};

/// Account registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    /// Password, checked against the strength policy.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Issue status transition body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target lifecycle status.
    pub status: IssueStatus,
}

/// Department assignment body. `null` clears the assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDepartmentRequest {
    /// Department to assign, or none to unassign.
    pub department_id: Option<Uuid>,
}

/// Comment body for posting and editing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentBodyRequest {
    /// Comment text.
    #[validate(length(min = 1, message = "Comment body is required"))]
    pub body: String,
}

/// Category suggestion request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestCategoryRequest {
    /// Issue description to classify.
    pub description: String,
}

/// Department create/update body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DepartmentRequest {
    /// Department name.
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Profile update body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub full_name: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
}

/// Password change body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Role change body (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    /// New role.
    pub role: UserRole,
}

/// Status change body (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    /// New status.
    pub status: UserStatus,
}

/// Query parameters for the proximity lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    /// Query point latitude.
    pub latitude: f64,
    /// Query point longitude.
    pub longitude: f64,
}

/// Optional feed filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedFilterQuery {
    /// Restrict to a lifecycle status.
    pub status: Option<IssueStatus>,
    /// Restrict to a category.
    pub category: Option<String>,
    /// Restrict to a department.
    pub department_id: Option<Uuid>,
}
