//! Engagement (like) domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to like toggles.
///
/// `like_count` is always the authoritative set cardinality measured
/// after the toggle committed, never an increment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngagementEvent {
    /// A user toggled their like on an issue.
    Toggled {
        /// The issue ID.
        issue_id: Uuid,
        /// The user who toggled.
        user_id: Uuid,
        /// Whether the user is liking (`true`) or unliking (`false`).
        liked: bool,
        /// Authoritative like count after the toggle.
        like_count: u64,
    },
}
