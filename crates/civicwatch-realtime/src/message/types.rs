//! Inbound and outbound WebSocket message definitions.
//!
//! Outbound payloads embed the authoritative aggregate (a recomputed
//! count or a full snapshot), never an increment. A client that applies
//! the same message twice, or a stale message after a fresh one, can
//! always full-replace its local state with the embedded values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Subscribe to a channel.
    Subscribe {
        /// Channel name.
        channel: String,
    },
    /// Unsubscribe from a channel.
    Unsubscribe {
        /// Channel name.
        channel: String,
    },
    /// Pong response to a server ping.
    Pong {
        /// Echoed ping timestamp.
        timestamp: i64,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// Channel name.
        channel: String,
    },
    /// A user's like toggle committed.
    EngagementChanged {
        /// The issue whose like set changed.
        issue_id: Uuid,
        /// The user who toggled.
        user_id: Uuid,
        /// Whether that user now likes the issue.
        liked: bool,
        /// Authoritative like count after the toggle.
        like_count: u64,
        /// When the toggle committed.
        timestamp: DateTime<Utc>,
    },
    /// A comment was appended to an issue's thread.
    CommentPosted {
        /// The issue ID.
        issue_id: Uuid,
        /// Full comment snapshot.
        comment: serde_json::Value,
        /// Authoritative comment count after the append.
        comment_count: u64,
        /// When the comment was posted.
        timestamp: DateTime<Utc>,
    },
    /// A comment body was edited by its author.
    CommentUpdated {
        /// The issue ID.
        issue_id: Uuid,
        /// Full comment snapshot.
        comment: serde_json::Value,
        /// When the edit committed.
        timestamp: DateTime<Utc>,
    },
    /// A comment was removed.
    CommentDeleted {
        /// The issue ID.
        issue_id: Uuid,
        /// The removed comment ID.
        comment_id: Uuid,
        /// Authoritative comment count after the removal.
        comment_count: u64,
        /// When the removal committed.
        timestamp: DateTime<Utc>,
    },
    /// A new issue was submitted.
    IssueCreated {
        /// The issue ID.
        issue_id: Uuid,
        /// Full issue snapshot.
        issue: serde_json::Value,
        /// When the issue was created.
        timestamp: DateTime<Utc>,
    },
    /// An issue's status or department assignment changed.
    IssueUpdated {
        /// The issue ID.
        issue_id: Uuid,
        /// Full issue snapshot.
        issue: serde_json::Value,
        /// When the update committed.
        timestamp: DateTime<Utc>,
    },
    /// An issue was deleted by its reporter.
    IssueDeleted {
        /// The removed issue ID.
        issue_id: Uuid,
        /// When the deletion committed.
        timestamp: DateTime<Utc>,
    },
    /// A notification was created for the connected user.
    Notification {
        /// Full notification snapshot.
        notification: serde_json::Value,
        /// When the notification was created.
        timestamp: DateTime<Utc>,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp.
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}
