//! Issue entity model.

use chrono::{DateTime, Utc};
use civicwatch_core::types::GeoPoint;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::IssueStatus;

/// A citizen-reported civic issue.
///
/// The reporter's name and avatar are denormalized onto the row at
/// creation time so list views render without a join. Location is an
/// optional latitude/longitude pair; both columns are set or both are
/// null, never one of the two.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    /// Unique issue identifier.
    pub id: Uuid,
    /// The user who reported this issue.
    pub reporter_id: Uuid,
    /// Reporter's full name, snapshotted at creation.
    pub reporter_full_name: String,
    /// Reporter's avatar URL, snapshotted at creation.
    pub reporter_avatar_url: Option<String>,
    /// Short issue title.
    pub title: String,
    /// Free-text issue description.
    pub description: String,
    /// Issue category (e.g., "Road", "Sanitation").
    pub category: String,
    /// Current lifecycle status.
    pub status: IssueStatus,
    /// The department assigned to handle this issue.
    pub department_id: Option<Uuid>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Human-readable address (if geocoded).
    pub address: Option<String>,
    /// Photo URL (if attached).
    pub photo_url: Option<String>,
    /// When the issue was reported.
    pub created_at: DateTime<Utc>,
    /// When the issue was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Check if the issue carries a usable location.
    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Return the issue's location as a point, if both coordinates are
    /// set and within bounds.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).ok(),
            _ => None,
        }
    }

    /// Check if the issue is still open.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// Data required to create a new issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssue {
    /// The reporting user.
    pub reporter_id: Uuid,
    /// Reporter's full name snapshot.
    pub reporter_full_name: String,
    /// Reporter's avatar URL snapshot.
    pub reporter_avatar_url: Option<String>,
    /// Issue title.
    pub title: String,
    /// Issue description.
    pub description: String,
    /// Issue category.
    pub category: String,
    /// Latitude (must be paired with longitude).
    pub latitude: Option<f64>,
    /// Longitude (must be paired with latitude).
    pub longitude: Option<f64>,
    /// Human-readable address.
    pub address: Option<String>,
    /// Photo URL.
    pub photo_url: Option<String>,
}
