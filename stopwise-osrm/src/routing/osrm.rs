//! OSRM API response types for the Route and Table services.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service> and
//! <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// Status code OSRM uses for success.
const OK_CODE: &str = "Ok";

/// OSRM Route API response.
///
/// The response carries one or more alternative routes on success or an
/// error message on failure. Only the first route is used.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the waypoints
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Routes, best first.
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == OK_CODE
    }
}

/// A single route of a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct RouteEntry {
    /// Road distance in metres.
    pub distance: f64,

    /// Travel time in seconds.
    pub duration: Option<f64>,

    /// Full route geometry, present with `overview=full&geometries=geojson`.
    pub geometry: Option<LineString>,
}

/// GeoJSON `LineString`. Positions are `[longitude, latitude]`.
#[derive(Debug, Deserialize)]
pub struct LineString {
    /// Ordered positions along the route.
    pub coordinates: Vec<[f64; 2]>,
}

/// OSRM Table API response requested with
/// `annotations=distance,duration`.
///
/// `distances[i][j]` and `durations[i][j]` describe the fastest route from
/// the i-th to the j-th coordinate. Values are `None` when no route exists.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Matrix of distances in metres.
    pub distances: Option<Vec<Vec<Option<f64>>>>,

    /// Matrix of durations in seconds.
    pub durations: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == OK_CODE
    }
}
