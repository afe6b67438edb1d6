//! Geographic value objects shared by discovery and overlays.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised by the geographic constructors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoValidationError {
    /// A latitude was non-finite or outside `[-90, 90]`.
    #[error("latitude must be a finite value within [-90, 90], got {value}")]
    InvalidLatitude {
        /// Rejected value.
        value: f64,
    },
    /// A longitude was non-finite or outside `[-180, 180]`.
    #[error("longitude must be a finite value within [-180, 180], got {value}")]
    InvalidLongitude {
        /// Rejected value.
        value: f64,
    },
    /// The southwest corner lies north of the northeast corner.
    #[error("southwest latitude {south} must not exceed northeast latitude {north}")]
    InvertedLatitudes {
        /// Southern edge.
        south: f64,
        /// Northern edge.
        north: f64,
    },
}

/// A WGS84 coordinate in decimal degrees.
///
/// # Examples
///
/// ```
/// use area_explorer::domain::GeoPoint;
///
/// let london = GeoPoint::new(51.5074, -0.1278)?;
/// assert_eq!(london.latitude(), 51.5074);
/// # Ok::<(), area_explorer::domain::GeoValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a validated coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoValidationError::InvalidLatitude { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoValidationError::InvalidLongitude { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Rectangle produced by one completed drawing action.
///
/// Zero-area rectangles are accepted; discovery runs for them like any other
/// bound.
///
/// # Examples
///
/// ```
/// use area_explorer::domain::{GeoBounds, GeoPoint};
///
/// let bounds = GeoBounds::new(GeoPoint::new(40.70, -74.02)?, GeoPoint::new(40.72, -74.00)?)?;
/// let center = bounds.center();
/// assert!((center.latitude() - 40.71).abs() < 1e-9);
/// # Ok::<(), area_explorer::domain::GeoValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBounds {
    southwest: GeoPoint,
    northeast: GeoPoint,
}

impl GeoBounds {
    /// Creates bounds from two corners.
    ///
    /// Longitudes may wrap across the antimeridian (`southwest.longitude >
    /// northeast.longitude`); latitudes may not be inverted.
    pub fn new(southwest: GeoPoint, northeast: GeoPoint) -> Result<Self, GeoValidationError> {
        if southwest.latitude > northeast.latitude {
            return Err(GeoValidationError::InvertedLatitudes {
                south: southwest.latitude,
                north: northeast.latitude,
            });
        }
        Ok(Self {
            southwest,
            northeast,
        })
    }

    /// Southwest corner.
    pub fn southwest(&self) -> GeoPoint {
        self.southwest
    }

    /// Northeast corner.
    pub fn northeast(&self) -> GeoPoint {
        self.northeast
    }

    /// Midpoint of the rectangle, used as the search origin.
    pub fn center(&self) -> GeoPoint {
        let latitude = (self.southwest.latitude + self.northeast.latitude) / 2.0;
        let mut longitude = (self.southwest.longitude + self.northeast.longitude) / 2.0;
        if self.southwest.longitude > self.northeast.longitude {
            // Antimeridian crossing: shift the midpoint back into range.
            longitude += if longitude > 0.0 { -180.0 } else { 180.0 };
        }
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Whether the rectangle has no area.
    pub fn is_degenerate(&self) -> bool {
        self.southwest.latitude == self.northeast.latitude
            || self.southwest.longitude == self.northeast.longitude
    }
}
