//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background maintenance worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for the notification cleanup job.
    #[serde(default = "default_notification_cron")]
    pub notification_cleanup_cron: String,
    /// Days a read notification is retained before cleanup.
    #[serde(default = "default_retention_days")]
    pub notification_retention_days: u32,
    /// Cron expression for the expired session cleanup job.
    #[serde(default = "default_session_cron")]
    pub session_cleanup_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            notification_cleanup_cron: default_notification_cron(),
            notification_retention_days: default_retention_days(),
            session_cleanup_cron: default_session_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_notification_cron() -> String {
    "0 0 3 * * *".to_string()
}

fn default_retention_days() -> u32 {
    30
}

fn default_session_cron() -> String {
    "0 */15 * * * *".to_string()
}
