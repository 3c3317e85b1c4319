//! Geographic stop positions.
//!
//! A [`Coordinate`] is a validated `(latitude, longitude)` pair in decimal
//! degrees. Stops are identified by their position in a problem's coordinate
//! list, never by value, so duplicate coordinates are legal and distinct.

use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated latitude/longitude pair.
///
/// Persisted as a two-element `[latitude, longitude]` array.
///
/// # Examples
///
/// ```
/// use stopwise_core::Coordinate;
///
/// let ghent = Coordinate::new(51.054, 3.717)?;
/// assert_eq!(ghent.latitude(), 51.054);
/// # Ok::<(), stopwise_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was not finite or outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    /// Longitude was not finite or outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

impl Coordinate {
    /// Validates and constructs a [`Coordinate`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    /// The coordinate as a `geo` point (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle surface distance to `other` in metres on the WGS84
    /// ellipsoid.
    ///
    /// # Examples
    ///
    /// ```
    /// use stopwise_core::Coordinate;
    ///
    /// let a = Coordinate::new(0.0, 0.0)?;
    /// let b = Coordinate::new(0.0, 1.0)?;
    /// let metres = a.geodesic_distance(b);
    /// assert!((metres - 111_319.49).abs() < 1.0);
    /// # Ok::<(), stopwise_core::CoordinateError>(())
    /// ```
    #[must_use]
    pub fn geodesic_distance(self, other: Self) -> f64 {
        Geodesic.distance(self.to_point(), other.to_point())
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coordinate: Coordinate) -> Self {
        (coordinate.latitude, coordinate.longitude)
    }
}
