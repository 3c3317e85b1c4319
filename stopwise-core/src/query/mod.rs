//! Road-network cost queries.
//!
//! The [`CostQueryClient`] trait abstracts a routing service able to answer
//! two kinds of question: the road distance of a route through ordered
//! waypoints, and the full distance/duration tables for a coordinate set.
//! The trait is synchronous so matrix builders can call it from plain worker
//! threads; network implementations bridge to async IO internally.

mod error;

pub use error::QueryError;

use crate::{Coordinate, CostMatrix};

/// A road route returned by [`CostQueryClient::route`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoadRoute {
    /// Road distance in metres.
    pub distance_m: f64,
    /// Travel duration in seconds, when the service reports one.
    pub duration_s: Option<f64>,
    /// Full route polyline, when requested and available.
    pub geometry: Option<Vec<Coordinate>>,
}

impl RoadRoute {
    /// A route carrying only a distance.
    #[must_use]
    pub const fn with_distance(distance_m: f64) -> Self {
        Self {
            distance_m,
            duration_s: None,
            geometry: None,
        }
    }
}

/// Distance and duration tables for a coordinate set.
///
/// Both matrices share the coordinate order of the request. Pairs the
/// service could not route are [`crate::CostCell::Unreachable`].
#[derive(Debug, Clone, PartialEq)]
pub struct CostTables {
    /// Road distances in metres.
    pub distances: CostMatrix,
    /// Travel durations in seconds.
    pub durations: CostMatrix,
}

/// Query a road network for route distances and cost tables.
///
/// # Examples
///
/// ```
/// use stopwise_core::{
///     Coordinate, CostMatrix, CostQueryClient, CostTables, QueryError, RoadRoute,
/// };
///
/// struct Flat;
///
/// impl CostQueryClient for Flat {
///     fn route(&self, waypoints: &[Coordinate]) -> Result<RoadRoute, QueryError> {
///         if waypoints.len() < 2 {
///             return Err(QueryError::TooFewWaypoints { count: waypoints.len() });
///         }
///         Ok(RoadRoute::with_distance(1.0))
///     }
///
///     fn table(&self, coordinates: &[Coordinate]) -> Result<CostTables, QueryError> {
///         let n = coordinates.len();
///         let ones = CostMatrix::from_rows(vec![vec![1.0; n]; n])
///             .map_err(|_| QueryError::EmptyInput)?;
///         Ok(CostTables { distances: ones.clone(), durations: ones })
///     }
/// }
///
/// let stops = [Coordinate::new(0.0, 0.0)?, Coordinate::new(1.0, 1.0)?];
/// assert_eq!(Flat.route(&stops)?.distance_m, 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait CostQueryClient: Send + Sync {
    /// Road route through `waypoints` in order.
    ///
    /// Implementations must return [`QueryError::TooFewWaypoints`] for fewer
    /// than two waypoints.
    fn route(&self, waypoints: &[Coordinate]) -> Result<RoadRoute, QueryError>;

    /// Full distance and duration tables for `coordinates`.
    ///
    /// Implementations must return [`QueryError::EmptyInput`] for an empty
    /// slice.
    fn table(&self, coordinates: &[Coordinate]) -> Result<CostTables, QueryError>;
}
