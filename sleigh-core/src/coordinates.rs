//! WGS84 coordinates attached to delivery locations.

use geo::{Coord, Point};

use crate::ValidationError;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A latitude/longitude pair in degrees.
///
/// Construction is unchecked so callers can carry raw input around;
/// [`Coordinates::validate`] enforces the WGS84 ranges. Conversions into
/// `geo` types follow the `x = longitude`, `y = latitude` convention.
///
/// # Examples
/// ```
/// use sleigh_core::Coordinates;
///
/// let pole = Coordinates::new(90.0, 0.0);
/// assert!(pole.validate().is_ok());
/// assert!(Coordinates::new(95.0, 0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl Coordinates {
    /// Construct a coordinate pair without range checks.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check both components against [`LATITUDE_RANGE`] and
    /// [`LONGITUDE_RANGE`].
    ///
    /// Non-finite values fall outside both ranges and are rejected.
    ///
    /// # Errors
    /// Returns [`ValidationError::LatitudeOutOfRange`] or
    /// [`ValidationError::LongitudeOutOfRange`].
    pub fn validate(self) -> Result<Self, ValidationError> {
        if !LATITUDE_RANGE.contains(&self.lat) {
            return Err(ValidationError::LatitudeOutOfRange { lat: self.lat });
        }
        if !LONGITUDE_RANGE.contains(&self.lon) {
            return Err(ValidationError::LongitudeOutOfRange { lon: self.lon });
        }
        Ok(self)
    }
}

impl From<Coordinates> for Coord<f64> {
    fn from(value: Coordinates) -> Self {
        Self {
            x: value.lon,
            y: value.lat,
        }
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(value: Coordinates) -> Self {
        Self::new(value.lon, value.lat)
    }
}

impl From<Coord<f64>> for Coordinates {
    fn from(value: Coord<f64>) -> Self {
        Self::new(value.y, value.x)
    }
}
