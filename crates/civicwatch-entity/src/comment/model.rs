//! Comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A comment in an issue's discussion thread.
///
/// The author's name and avatar are snapshotted at posting time so a
/// thread renders without joining the users table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// The issue this comment belongs to.
    pub issue_id: Uuid,
    /// The comment author.
    pub author_id: Uuid,
    /// Author's full name, snapshotted at posting.
    pub author_full_name: String,
    /// Author's avatar URL, snapshotted at posting.
    pub author_avatar_url: Option<String>,
    /// Comment body text.
    pub body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
    /// When the comment was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Data required to post a new comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// The issue to comment on.
    pub issue_id: Uuid,
    /// The author's user ID.
    pub author_id: Uuid,
    /// Author's full name snapshot.
    pub author_full_name: String,
    /// Author's avatar URL snapshot.
    pub author_avatar_url: Option<String>,
    /// Comment body text.
    pub body: String,
}
