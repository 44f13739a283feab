//! Duplicate-detection proximity configuration.

use serde::{Deserialize, Serialize};

/// Settings for the nearby-duplicate check performed before issue submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Search radius in meters around the pinned point.
    #[serde(default = "default_radius")]
    pub search_radius_meters: f64,
    /// Maximum number of candidates returned, nearest first.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            search_radius_meters: default_radius(),
            max_results: default_max_results(),
        }
    }
}

fn default_radius() -> f64 {
    300.0
}

fn default_max_results() -> u32 {
    5
}
