//! Deterministic test doubles for cost queries.
//!
//! [`ScriptedQueryClient`] answers route and table queries from a fixed
//! distance grid without touching the network. Individual directed pairs and
//! the bulk table can be scripted to fail.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Coordinate, CostCell, CostMatrix, CostQueryClient, CostTables, QueryError, RoadRoute};

/// Speed used to derive scripted durations, in metres per second.
pub const SCRIPTED_SPEED_MPS: f64 = 10.0;

/// Scripted [`CostQueryClient`].
///
/// Stops are recognised by position in the coordinate list supplied at
/// construction; a waypoint matching several entries resolves to the first.
/// Durations are distances divided by [`SCRIPTED_SPEED_MPS`].
#[derive(Debug)]
pub struct ScriptedQueryClient {
    stops: Vec<Coordinate>,
    distances: Vec<Vec<f64>>,
    failing: BTreeSet<(usize, usize)>,
    table_error: Option<QueryError>,
    route_calls: AtomicUsize,
}

impl ScriptedQueryClient {
    /// Create a client answering from `distances[i][j]` for `stops`.
    #[must_use]
    pub fn new(stops: Vec<Coordinate>, distances: Vec<Vec<f64>>) -> Self {
        Self {
            stops,
            distances,
            failing: BTreeSet::new(),
            table_error: None,
            route_calls: AtomicUsize::new(0),
        }
    }

    /// Make every query containing the leg `from -> to` fail.
    #[must_use]
    pub fn with_failing_pair(mut self, from: usize, to: usize) -> Self {
        self.failing.insert((from, to));
        self
    }

    /// Make bulk table queries fail with `error`.
    #[must_use]
    pub fn with_table_error(mut self, error: QueryError) -> Self {
        self.table_error = Some(error);
        self
    }

    /// Number of route queries answered so far.
    #[must_use]
    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    fn index_of(&self, coordinate: Coordinate) -> Result<usize, QueryError> {
        self.stops
            .iter()
            .position(|stop| *stop == coordinate)
            .ok_or_else(|| QueryError::ServiceError {
                code: "NoSegment".into(),
                message: format!("unknown waypoint {coordinate:?}"),
            })
    }

    fn distance(&self, from: usize, to: usize) -> Option<f64> {
        if self.failing.contains(&(from, to)) {
            return None;
        }
        self.distances.get(from).and_then(|row| row.get(to)).copied()
    }
}

impl CostQueryClient for ScriptedQueryClient {
    fn route(&self, waypoints: &[Coordinate]) -> Result<RoadRoute, QueryError> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        if waypoints.len() < 2 {
            return Err(QueryError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        let indices = waypoints
            .iter()
            .map(|waypoint| self.index_of(*waypoint))
            .collect::<Result<Vec<_>, _>>()?;
        let mut total = 0.0;
        for leg in indices.windows(2) {
            let [from, to] = leg else { continue };
            total += self
                .distance(*from, *to)
                .ok_or_else(|| QueryError::NetworkError {
                    url: format!("stub://route/{from}/{to}"),
                    message: "scripted failure".into(),
                })?;
        }
        Ok(RoadRoute {
            distance_m: total,
            duration_s: Some(total / SCRIPTED_SPEED_MPS),
            geometry: Some(waypoints.to_vec()),
        })
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<CostTables, QueryError> {
        if coordinates.is_empty() {
            return Err(QueryError::EmptyInput);
        }
        if let Some(error) = &self.table_error {
            return Err(error.clone());
        }
        let indices = coordinates
            .iter()
            .map(|coordinate| self.index_of(*coordinate))
            .collect::<Result<Vec<_>, _>>()?;
        let lookup = |i: usize, j: usize| {
            indices
                .get(i)
                .zip(indices.get(j))
                .and_then(|(from, to)| self.distance(*from, *to))
        };
        let n = indices.len();
        let distances = CostMatrix::from_fn(n, |i, j| {
            lookup(i, j).map_or(CostCell::Unreachable, CostCell::from_value)
        });
        let durations = CostMatrix::from_fn(n, |i, j| {
            lookup(i, j).map_or(CostCell::Unreachable, |d| {
                CostCell::from_value(d / SCRIPTED_SPEED_MPS)
            })
        });
        Ok(CostTables {
            distances,
            durations,
        })
    }
}

/// Coordinates of `n` distinct stops spaced along the equator.
#[must_use]
pub fn equator_stops(n: usize) -> Vec<Coordinate> {
    (0..n)
        .filter_map(|i| u32::try_from(i).ok())
        .filter_map(|i| Coordinate::new(0.0, f64::from(i) * 0.01).ok())
        .collect()
}
