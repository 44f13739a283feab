//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent sessions per user (0 = unlimited).
    #[serde(default = "default_max_sessions")]
    pub max_sessions_per_user: u32,
    /// Interval for expired session cleanup in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions_per_user: default_max_sessions(),
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_max_sessions() -> u32 {
    5
}

fn default_cleanup_interval() -> u64 {
    15
}
