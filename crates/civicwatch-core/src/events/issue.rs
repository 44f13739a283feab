//! Issue-related domain events.
//!
//! Events that mutate an issue carry the full issue snapshot so that
//! subscribers can replace their local copy instead of patching it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to issue lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IssueEvent {
    /// A new issue was submitted.
    Created {
        /// The issue ID.
        issue_id: Uuid,
        /// Full issue snapshot as serialized JSON.
        issue: serde_json::Value,
    },
    /// An issue's status or department assignment changed.
    Updated {
        /// The issue ID.
        issue_id: Uuid,
        /// Full issue snapshot as serialized JSON.
        issue: serde_json::Value,
    },
    /// An issue was deleted by its reporter.
    Deleted {
        /// The issue ID.
        issue_id: Uuid,
    },
}
