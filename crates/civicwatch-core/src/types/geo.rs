//! Geographic primitives for issue locations.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A WGS84 point pinned on the map when reporting an issue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point.
    ///
    /// Both coordinates must be finite and within geographic bounds
    /// (latitude -90..=90, longitude -180..=180).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Validate coordinate bounds.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(AppError::validation("Coordinates must be finite numbers"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::validation(format!(
                "Latitude {} is out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::validation(format!(
                "Longitude {} is out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_point() {
        let p = GeoPoint::new(19.45, 72.8).expect("valid point");
        assert_eq!(p.latitude, 19.45);
        assert_eq!(p.longitude, 72.8);
    }

    #[test]
    fn test_out_of_range_latitude() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(-90.1, 0.0).is_err());
    }

    #[test]
    fn test_out_of_range_longitude() {
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }
}
