//! Comment domain events.
//!
//! Mutating events carry the full comment snapshot and the authoritative
//! comment count so subscribers can full-replace their local thread view.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to comment threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommentEvent {
    /// A comment was appended to an issue's thread.
    Posted {
        /// The issue ID.
        issue_id: Uuid,
        /// Full comment snapshot as serialized JSON.
        comment: serde_json::Value,
        /// Authoritative comment count after the append.
        comment_count: u64,
    },
    /// A comment body was edited by its author.
    Updated {
        /// The issue ID.
        issue_id: Uuid,
        /// Full comment snapshot as serialized JSON.
        comment: serde_json::Value,
    },
    /// A comment was removed by its author or an administrator.
    Deleted {
        /// The issue ID.
        issue_id: Uuid,
        /// The removed comment ID.
        comment_id: Uuid,
        /// Authoritative comment count after the removal.
        comment_count: u64,
    },
}
