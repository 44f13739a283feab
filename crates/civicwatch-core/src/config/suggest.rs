//! Category suggestion gateway configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external text-classification endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Classifier endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// Minimum trimmed description length before a suggestion is attempted.
    #[serde(default = "default_min_chars")]
    pub min_description_chars: usize,
    /// Maximum number of cached suggestions.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Cache entry TTL in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint(),
            request_timeout_seconds: default_timeout(),
            min_description_chars: default_min_chars(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8000/predict".to_string()
}

fn default_timeout() -> u64 {
    3
}

fn default_min_chars() -> usize {
    10
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_cache_ttl() -> u64 {
    300
}
