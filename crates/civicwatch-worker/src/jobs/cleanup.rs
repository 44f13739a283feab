//! Retention cleanup jobs.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info};

use civicwatch_database::repositories::notification::NotificationRepository;
use civicwatch_database::repositories::session::SessionRepository;

/// Deletes read notifications older than the retention window.
///
/// Unread notifications are never deleted; the window only starts
/// counting once the user has seen the entry.
#[derive(Debug, Clone)]
pub struct NotificationCleanup {
    notification_repo: Arc<NotificationRepository>,
    retention_days: u32,
}

impl NotificationCleanup {
    /// Creates the cleanup job with the configured retention window.
    pub fn new(notification_repo: Arc<NotificationRepository>, retention_days: u32) -> Self {
        Self {
            notification_repo,
            retention_days,
        }
    }

    /// Runs one cleanup pass. Failures are logged, never propagated;
    /// the next scheduled run retries.
    pub async fn run(&self) {
        let before = Utc::now() - Duration::days(i64::from(self.retention_days));
        match self.notification_repo.cleanup_old(before).await {
            Ok(0) => {}
            Ok(deleted) => {
                info!(deleted, retention_days = self.retention_days, "Old notifications purged");
            }
            Err(e) => error!(error = %e, "Notification cleanup failed"),
        }
    }
}

/// Deletes sessions whose refresh window has fully expired.
///
/// Revoked-but-unexpired rows are kept so an access token presented
/// after logout still maps to an explicit "revoked" answer.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    session_repo: Arc<SessionRepository>,
}

impl SessionCleanup {
    /// Creates the cleanup job.
    pub fn new(session_repo: Arc<SessionRepository>) -> Self {
        Self { session_repo }
    }

    /// Runs one cleanup pass. Failures are logged, never propagated.
    pub async fn run(&self) {
        match self.session_repo.cleanup_expired().await {
            Ok(0) => {}
            Ok(deleted) => info!(deleted, "Expired sessions purged"),
            Err(e) => error!(error = %e, "Session cleanup failed"),
        }
    }
}
