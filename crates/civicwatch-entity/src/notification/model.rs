//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A notification to be delivered to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// Event type that triggered this notification
    /// (e.g., "issue_status_changed", "comment_posted").
    pub event_type: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// The issue involved (if applicable).
    pub issue_id: Option<Uuid>,
    /// The user who triggered the action (if applicable).
    pub actor_id: Option<Uuid>,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// The recipient user.
    pub user_id: Uuid,
    /// Event type.
    pub event_type: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// The issue involved (if applicable).
    pub issue_id: Option<Uuid>,
    /// The acting user (if applicable).
    pub actor_id: Option<Uuid>,
}
