//! Issue lifecycle status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Newly reported, not yet triaged.
    Pending,
    /// Assigned and being worked on.
    InProgress,
    /// Fixed and verified.
    Resolved,
    /// Triaged and declined.
    Rejected,
}

impl IssueStatus {
    /// Check if the issue is still open (pending or in progress).
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Check if the issue has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = civicwatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept display forms like "In Progress" alongside snake_case.
        match s.to_lowercase().replace(' ', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(civicwatch_core::AppError::validation(format!(
                "Invalid issue status: '{s}'. Expected one of: pending, in_progress, resolved, rejected"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_terminal() {
        assert!(IssueStatus::Pending.is_open());
        assert!(IssueStatus::InProgress.is_open());
        assert!(IssueStatus::Resolved.is_terminal());
        assert!(IssueStatus::Rejected.is_terminal());
        assert!(!IssueStatus::Resolved.is_open());
    }

    #[test]
    fn test_from_str_display_form() {
        assert_eq!(
            "In Progress".parse::<IssueStatus>().unwrap(),
            IssueStatus::InProgress
        );
        assert_eq!(
            "pending".parse::<IssueStatus>().unwrap(),
            IssueStatus::Pending
        );
        assert!("closed".parse::<IssueStatus>().is_err());
    }
}
