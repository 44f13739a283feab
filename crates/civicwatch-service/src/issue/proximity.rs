//! Proximity queries over located issues.
//!
//! Backs the pre-submission duplicate check. The check is advisory:
//! candidates are shown to the reporter, nothing is ever blocked.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use civicwatch_core::config::ProximityConfig;
use civicwatch_core::result::AppResult;
use civicwatch_core::types::geo::GeoPoint;
use civicwatch_database::repositories::issue::{IssueRepository, NearbyIssue};

/// Service for nearest-first searches around a pinned point.
#[derive(Debug, Clone)]
pub struct ProximityService {
    issue_repo: Arc<IssueRepository>,
    config: ProximityConfig,
}

impl ProximityService {
    /// Creates a new proximity service.
    pub fn new(issue_repo: Arc<IssueRepository>, config: ProximityConfig) -> Self {
        Self { issue_repo, config }
    }

    /// Open issues within the configured radius of a point, nearest
    /// first, capped at the configured result count. The first element
    /// is the authoritative duplicate candidate.
    ///
    /// Coordinates are validated before any query runs; out-of-range or
    /// non-finite input is a validation error.
    pub async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        exclude_issue_id: Option<Uuid>,
    ) -> AppResult<Vec<NearbyIssue>> {
        let point = GeoPoint::new(latitude, longitude)?;
        self.issue_repo
            .find_nearby(
                &point,
                self.config.search_radius_meters,
                self.config.max_results,
                exclude_issue_id,
            )
            .await
    }

    /// Fail-open variant used on the submission path.
    ///
    /// No pinned point means no candidates; the service never fabricates
    /// a default location. A query failure is logged and reported as an
    /// empty list so submission is never blocked by the advisory check.
    pub async fn duplicate_candidates(&self, point: Option<GeoPoint>) -> Vec<NearbyIssue> {
        let Some(point) = point else {
            return Vec::new();
        };

        match self
            .issue_repo
            .find_nearby(
                &point,
                self.config.search_radius_meters,
                self.config.max_results,
                None,
            )
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Duplicate check failed, continuing without candidates");
                Vec::new()
            }
        }
    }
}
