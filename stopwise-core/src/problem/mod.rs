//! The routing problem aggregate.
//!
//! A [`RoutingProblem`] owns the stops, named cost matrices, fleet, demands
//! and named solutions of one problem instance. Every mutation goes through
//! a method that checks the invariants linking those parts: the depot is a
//! stop, matrices and demands cover every stop, capacities match the vehicle
//! count and solutions only visit known stops.

mod archive;
mod error;
mod metrics;

pub use archive::{ProblemArchive, RECORD_EXTENSION};
pub use error::{ArchiveError, ProblemError};
pub use metrics::{CSV_DELIMITER, LIVE_ROUTE_METRIC, MetricRecord, MetricsReport, improvement};

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{Coordinate, CostMatrix, CostQueryClient, Solution, SolveRequest};

/// One routing problem instance.
///
/// Persisted through [`ProblemArchive`]; decoding re-checks every invariant.
///
/// # Examples
///
/// ```
/// use stopwise_core::{Coordinate, RoutingProblem, geodesic_matrix};
///
/// let stops = vec![Coordinate::new(51.05, 3.72)?, Coordinate::new(51.06, 3.73)?];
/// let mut problem = RoutingProblem::new("ghent");
/// problem.set_coordinates(stops.clone())?;
/// problem.add_matrix("geodesic", geodesic_matrix(&stops)?)?;
/// assert!(problem.matrix("geodesic").is_ok());
/// assert!(problem.matrix("osrm").is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProblemRecord", into = "ProblemRecord")]
pub struct RoutingProblem {
    name: String,
    coordinates: Vec<Coordinate>,
    depot_index: usize,
    matrices: BTreeMap<String, CostMatrix>,
    vehicle_count: Option<usize>,
    capacities: Option<Vec<u64>>,
    demands: Option<Vec<u64>>,
    solutions: BTreeMap<String, Solution>,
}

/// Persisted field layout of a [`RoutingProblem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    name: String,
    #[serde(default)]
    coordinates: Vec<Coordinate>,
    #[serde(default)]
    depot_index: usize,
    #[serde(default)]
    matrices: BTreeMap<String, CostMatrix>,
    #[serde(default)]
    vehicle_count: Option<usize>,
    #[serde(default)]
    capacities: Option<Vec<u64>>,
    #[serde(default)]
    demands: Option<Vec<u64>>,
    #[serde(default)]
    solutions: BTreeMap<String, Solution>,
}

impl RoutingProblem {
    /// An empty problem: no stops, depot 0, no fleet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: Vec::new(),
            depot_index: 0,
            matrices: BTreeMap::new(),
            vehicle_count: None,
            capacities: None,
            demands: None,
            solutions: BTreeMap::new(),
        }
    }

    /// Problem name, also the archive key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops in index order.
    #[must_use]
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Number of stops, depot included.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.coordinates.len()
    }

    /// Replace the stop list.
    ///
    /// # Errors
    ///
    /// Fails when the depot, demands, a registered matrix or a registered
    /// solution would no longer fit the new stop count. The problem is left
    /// unchanged.
    pub fn set_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), ProblemError> {
        let stops = coordinates.len();
        if stops > 0 && self.depot_index >= stops {
            return Err(ProblemError::DepotOutOfRange {
                depot: self.depot_index,
                stops,
            });
        }
        if let Some(demands) = &self.demands {
            check_demands(demands, stops)?;
        }
        if let Some((name, matrix)) = self.matrices.iter().find(|(_, m)| m.size() != stops) {
            return Err(ProblemError::MatrixDimension {
                name: name.clone(),
                size: matrix.size(),
                stops,
            });
        }
        if let Some((name, stop)) = self.solutions.iter().find_map(|(name, solution)| {
            solution
                .visited()
                .find(|&stop| stop >= stops)
                .map(|stop| (name, stop))
        }) {
            return Err(ProblemError::StopOutOfRange {
                name: name.clone(),
                stop,
                stops,
            });
        }
        self.coordinates = coordinates;
        Ok(())
    }

    /// Index of the start/end stop.
    #[must_use]
    pub const fn depot_index(&self) -> usize {
        self.depot_index
    }

    /// The depot's coordinate, once stops are registered.
    #[must_use]
    pub fn depot(&self) -> Option<Coordinate> {
        self.coordinates.get(self.depot_index).copied()
    }

    /// Move the depot to another stop.
    ///
    /// # Errors
    ///
    /// [`ProblemError::DepotOutOfRange`] when `index` is not a stop.
    pub fn set_depot_index(&mut self, index: usize) -> Result<(), ProblemError> {
        if index >= self.coordinates.len() {
            return Err(ProblemError::DepotOutOfRange {
                depot: index,
                stops: self.coordinates.len(),
            });
        }
        self.depot_index = index;
        Ok(())
    }

    /// Demand per stop, when set.
    #[must_use]
    pub fn demands(&self) -> Option<&[u64]> {
        self.demands.as_deref()
    }

    /// Set one demand per stop. The depot's entry is conventionally zero.
    ///
    /// # Errors
    ///
    /// [`ProblemError::DemandMismatch`] when the length differs from the
    /// stop count.
    pub fn set_demands(&mut self, demands: Vec<u64>) -> Result<(), ProblemError> {
        check_demands(&demands, self.coordinates.len())?;
        self.demands = Some(demands);
        Ok(())
    }

    /// Number of vehicles, when a fleet is set.
    #[must_use]
    pub const fn vehicle_count(&self) -> Option<usize> {
        self.vehicle_count
    }

    /// Capacity per vehicle, when a fleet is set.
    #[must_use]
    pub fn capacities(&self) -> Option<&[u64]> {
        self.capacities.as_deref()
    }

    /// Set the fleet size and one capacity per vehicle.
    ///
    /// # Errors
    ///
    /// [`ProblemError::NoVehicles`] for zero vehicles and
    /// [`ProblemError::CapacityMismatch`] when the lengths differ.
    pub fn set_fleet(
        &mut self,
        vehicle_count: usize,
        capacities: Vec<u64>,
    ) -> Result<(), ProblemError> {
        if vehicle_count == 0 {
            return Err(ProblemError::NoVehicles);
        }
        if capacities.len() != vehicle_count {
            return Err(ProblemError::CapacityMismatch {
                vehicles: vehicle_count,
                capacities: capacities.len(),
            });
        }
        self.vehicle_count = Some(vehicle_count);
        self.capacities = Some(capacities);
        Ok(())
    }

    /// Register or replace the matrix stored under `name`.
    ///
    /// # Errors
    ///
    /// [`ProblemError::EmptyMatrix`] for a matrix over no stops and
    /// [`ProblemError::MatrixDimension`] when the matrix does not cover
    /// every stop.
    pub fn add_matrix(
        &mut self,
        name: impl Into<String>,
        matrix: CostMatrix,
    ) -> Result<(), ProblemError> {
        let name = name.into();
        if matrix.size() == 0 {
            return Err(ProblemError::EmptyMatrix { name });
        }
        if matrix.size() != self.coordinates.len() {
            return Err(ProblemError::MatrixDimension {
                name,
                size: matrix.size(),
                stops: self.coordinates.len(),
            });
        }
        self.matrices.insert(name, matrix);
        Ok(())
    }

    /// The matrix registered under `name`.
    ///
    /// # Errors
    ///
    /// [`ProblemError::MatrixNotFound`] when no such matrix exists.
    pub fn matrix(&self, name: &str) -> Result<&CostMatrix, ProblemError> {
        self.matrices
            .get(name)
            .ok_or_else(|| ProblemError::MatrixNotFound {
                name: name.to_owned(),
            })
    }

    /// Iterate over `(name, matrix)` pairs in name order.
    pub fn matrices(&self) -> impl Iterator<Item = (&str, &CostMatrix)> {
        self.matrices
            .iter()
            .map(|(name, matrix)| (name.as_str(), matrix))
    }

    /// Register or replace the solution stored under `name`.
    ///
    /// # Errors
    ///
    /// [`ProblemError::StopOutOfRange`] when a route visits an unknown stop.
    pub fn add_solution(
        &mut self,
        name: impl Into<String>,
        solution: Solution,
    ) -> Result<(), ProblemError> {
        let name = name.into();
        let stops = self.coordinates.len();
        if let Some(stop) = solution.visited().find(|&stop| stop >= stops) {
            return Err(ProblemError::StopOutOfRange { name, stop, stops });
        }
        self.solutions.insert(name, solution);
        Ok(())
    }

    /// The solution registered under `name`.
    ///
    /// # Errors
    ///
    /// [`ProblemError::SolutionNotFound`] when no such solution exists.
    pub fn solution(&self, name: &str) -> Result<&Solution, ProblemError> {
        self.solutions
            .get(name)
            .ok_or_else(|| ProblemError::SolutionNotFound {
                name: name.to_owned(),
            })
    }

    /// Iterate over `(name, solution)` pairs in name order.
    pub fn solutions(&self) -> impl Iterator<Item = (&str, &Solution)> {
        self.solutions
            .iter()
            .map(|(name, solution)| (name.as_str(), solution))
    }

    /// Build a solve request over the matrix `matrix_name`.
    ///
    /// The request is capacitated when both a fleet and demands are set, and
    /// single-vehicle otherwise.
    ///
    /// # Errors
    ///
    /// [`ProblemError::MatrixNotFound`] for an unknown matrix and
    /// [`ProblemError::Solve`] when the request preconditions fail.
    pub fn solve_request(&self, matrix_name: &str) -> Result<SolveRequest<'_>, ProblemError> {
        let matrix = self.matrix(matrix_name)?;
        let request = match (self.vehicle_count, &self.capacities, &self.demands) {
            (Some(vehicles), Some(capacities), Some(demands)) => SolveRequest::capacitated(
                matrix,
                self.depot_index,
                demands.clone(),
                vehicles,
                capacities.clone(),
            )?,
            _ => SolveRequest::single_vehicle(matrix, self.depot_index)?,
        };
        Ok(request)
    }

    /// Total cost of every solution under every registered matrix.
    ///
    /// Records are ordered by solution name, then matrix name. With a
    /// `baseline`, each record carries the fractional improvement over the
    /// baseline's total on the same matrix; otherwise improvement is zero.
    ///
    /// # Errors
    ///
    /// [`ProblemError::SolutionNotFound`] when `baseline` is not registered.
    pub fn metrics(&self, baseline: Option<&str>) -> Result<Vec<MetricRecord>, ProblemError> {
        let baseline = baseline.map(|name| self.solution(name)).transpose()?;
        let mut records = Vec::new();
        for (solution_name, solution) in &self.solutions {
            for (matrix_name, matrix) in &self.matrices {
                let total = solution.cost_under(matrix);
                let base = baseline.map(|b| b.cost_under(matrix));
                records.push(self.record(solution_name, matrix_name, total, base));
            }
        }
        Ok(records)
    }

    /// [`RoutingProblem::metrics`] plus one [`LIVE_ROUTE_METRIC`] record per
    /// solution.
    ///
    /// The live total asks `client` for the road distance along each route's
    /// full stop sequence. A failed query makes that solution's live total
    /// `+∞` and is logged; it never aborts the report.
    ///
    /// # Errors
    ///
    /// As for [`RoutingProblem::metrics`].
    pub fn metrics_with_live_route<C>(
        &self,
        baseline: Option<&str>,
        client: &C,
    ) -> Result<Vec<MetricRecord>, ProblemError>
    where
        C: CostQueryClient + ?Sized,
    {
        let baseline_live = baseline
            .map(|name| self.solution(name).map(|b| self.live_total(name, b, client)))
            .transpose()?;
        let matrix_records = self.metrics(baseline)?;
        let per_solution = self.matrices.len();
        let mut records = Vec::with_capacity(matrix_records.len() + self.solutions.len());
        let mut pending = matrix_records.into_iter();
        for (solution_name, solution) in &self.solutions {
            records.extend(pending.by_ref().take(per_solution));
            let total = match baseline {
                Some(name) if name == solution_name => baseline_live.unwrap_or(f64::INFINITY),
                _ => self.live_total(solution_name, solution, client),
            };
            records.push(self.record(solution_name, LIVE_ROUTE_METRIC, total, baseline_live));
        }
        Ok(records)
    }

    fn live_total<C>(&self, solution_name: &str, solution: &Solution, client: &C) -> f64
    where
        C: CostQueryClient + ?Sized,
    {
        solution
            .routes()
            .filter(|(_, stops)| stops.len() >= 2)
            .map(|(label, stops)| {
                let waypoints: Option<Vec<Coordinate>> = stops
                    .iter()
                    .map(|&stop| self.coordinates.get(stop).copied())
                    .collect();
                let Some(waypoints) = waypoints else {
                    return f64::INFINITY;
                };
                match client.route(&waypoints) {
                    Ok(route) => route.distance_m,
                    Err(err) => {
                        warn!(
                            "live route for {}/{solution_name}/{label} failed: {err}",
                            self.name
                        );
                        f64::INFINITY
                    }
                }
            })
            .sum()
    }

    fn record(
        &self,
        solution: &str,
        metric: &str,
        total: f64,
        baseline: Option<f64>,
    ) -> MetricRecord {
        MetricRecord {
            problem: self.name.clone(),
            solution: solution.to_owned(),
            metric: metric.to_owned(),
            total,
            improvement: improvement(total, baseline),
        }
    }
}

fn check_demands(demands: &[u64], stops: usize) -> Result<(), ProblemError> {
    if demands.len() == stops {
        Ok(())
    } else {
        Err(ProblemError::DemandMismatch {
            stops,
            demands: demands.len(),
        })
    }
}

impl TryFrom<ProblemRecord> for RoutingProblem {
    type Error = ProblemError;

    fn try_from(record: ProblemRecord) -> Result<Self, Self::Error> {
        let mut problem = Self::new(record.name);
        problem.set_coordinates(record.coordinates)?;
        if record.depot_index != 0 || !problem.coordinates.is_empty() {
            problem.set_depot_index(record.depot_index)?;
        }
        if let Some(demands) = record.demands {
            problem.set_demands(demands)?;
        }
        match (record.vehicle_count, record.capacities) {
            (None, None) => {}
            (vehicles, capacities) => {
                let capacities = capacities.unwrap_or_default();
                problem.set_fleet(vehicles.unwrap_or(capacities.len()), capacities)?;
            }
        }
        for (name, matrix) in record.matrices {
            problem.add_matrix(name, matrix)?;
        }
        for (name, solution) in record.solutions {
            problem.add_solution(name, solution)?;
        }
        Ok(problem)
    }
}

impl From<RoutingProblem> for ProblemRecord {
    fn from(problem: RoutingProblem) -> Self {
        Self {
            name: problem.name,
            coordinates: problem.coordinates,
            depot_index: problem.depot_index,
            matrices: problem.matrices,
            vehicle_count: problem.vehicle_count,
            capacities: problem.capacities,
            demands: problem.demands,
            solutions: problem.solutions,
        }
    }
}
