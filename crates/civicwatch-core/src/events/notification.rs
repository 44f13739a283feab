//! Notification delivery events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to user notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationEvent {
    /// A notification was created for a user.
    Created {
        /// The notification ID.
        notification_id: Uuid,
        /// The recipient user.
        user_id: Uuid,
        /// Full notification snapshot as serialized JSON.
        notification: serde_json::Value,
    },
}
