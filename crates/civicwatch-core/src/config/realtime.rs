//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum WebSocket connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Internal channel buffer size for broadcast channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Number of missed pongs before a connection is closed.
    #[serde(default = "default_missed_pongs")]
    pub max_missed_pongs: u32,
    /// Maximum channel subscriptions per connection.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_connection: usize,
    /// Pub/sub backend: `"memory"` or `"redis"`.
    #[serde(default = "default_pubsub")]
    pub pubsub: String,
    /// Redis URL, used when `pubsub = "redis"`.
    #[serde(default)]
    pub redis_url: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            max_missed_pongs: default_missed_pongs(),
            max_subscriptions_per_connection: default_max_subscriptions(),
            pubsub: default_pubsub(),
            redis_url: String::new(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_missed_pongs() -> u32 {
    2
}

fn default_max_subscriptions() -> usize {
    50
}

fn default_pubsub() -> String {
    "memory".to_string()
}
