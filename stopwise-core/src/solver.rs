use std::time::Duration;

use thiserror::Error;

use crate::{CostMatrix, Solution};

/// Vehicle configuration of a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveMode {
    /// One vehicle visits every stop; no capacity limits.
    SingleVehicle,
    /// Several vehicles, each bounded by its capacity.
    Capacitated {
        /// Demand per stop; the depot's entry is ignored.
        demands: Vec<u64>,
        /// Capacity per vehicle.
        capacities: Vec<u64>,
    },
}

/// A validated solve request.
///
/// Constructors enforce every precondition, so a [`Solver`] receiving a
/// request can start searching immediately.
///
/// # Examples
/// ```rust
/// use stopwise_core::{CostMatrix, SolveError, SolveRequest};
///
/// let matrix = CostMatrix::from_rows(vec![vec![0.0; 3]; 3])?;
/// let request = SolveRequest::capacitated(&matrix, 0, vec![0, 1, 1], 2, vec![1, 1])?;
/// assert_eq!(request.vehicle_count(), 2);
///
/// let err = SolveRequest::capacitated(&matrix, 0, vec![0, 1, 1], 2, vec![1])
///     .expect_err("two vehicles, one capacity");
/// assert_eq!(err, SolveError::CapacityMismatch { vehicles: 2, capacities: 1 });
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRequest<'a> {
    matrix: &'a CostMatrix,
    depot: usize,
    mode: SolveMode,
}

impl<'a> SolveRequest<'a> {
    /// A single-vehicle request visiting every stop from `depot`.
    ///
    /// # Errors
    ///
    /// [`SolveError::EmptyProblem`] for a matrix with no stops and
    /// [`SolveError::DepotOutOfRange`] when `depot` is not a stop.
    pub fn single_vehicle(matrix: &'a CostMatrix, depot: usize) -> Result<Self, SolveError> {
        check_depot(matrix, depot)?;
        Ok(Self {
            matrix,
            depot,
            mode: SolveMode::SingleVehicle,
        })
    }

    /// A capacitated request for `vehicle_count` vehicles.
    ///
    /// # Errors
    ///
    /// As [`SolveRequest::single_vehicle`], plus [`SolveError::NoVehicles`],
    /// [`SolveError::CapacityMismatch`] when `capacities.len()` differs from
    /// `vehicle_count` and [`SolveError::DemandMismatch`] when `demands` does
    /// not have one entry per stop.
    pub fn capacitated(
        matrix: &'a CostMatrix,
        depot: usize,
        demands: Vec<u64>,
        vehicle_count: usize,
        capacities: Vec<u64>,
    ) -> Result<Self, SolveError> {
        check_depot(matrix, depot)?;
        if vehicle_count == 0 {
            return Err(SolveError::NoVehicles);
        }
        if capacities.len() != vehicle_count {
            return Err(SolveError::CapacityMismatch {
                vehicles: vehicle_count,
                capacities: capacities.len(),
            });
        }
        if demands.len() != matrix.size() {
            return Err(SolveError::DemandMismatch {
                stops: matrix.size(),
                demands: demands.len(),
            });
        }
        Ok(Self {
            matrix,
            depot,
            mode: SolveMode::Capacitated {
                demands,
                capacities,
            },
        })
    }

    /// The cost matrix to route over.
    #[must_use]
    pub const fn matrix(&self) -> &CostMatrix {
        self.matrix
    }

    /// Start and end stop of every route.
    #[must_use]
    pub const fn depot(&self) -> usize {
        self.depot
    }

    /// Vehicle configuration.
    #[must_use]
    pub const fn mode(&self) -> &SolveMode {
        &self.mode
    }

    /// Number of stops, depot included.
    #[must_use]
    pub const fn stop_count(&self) -> usize {
        self.matrix.size()
    }

    /// Number of vehicles; one in single-vehicle mode.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        match &self.mode {
            SolveMode::SingleVehicle => 1,
            SolveMode::Capacitated { capacities, .. } => capacities.len(),
        }
    }

    /// Capacity of `vehicle`, `None` when unconstrained or out of range.
    #[must_use]
    pub fn capacity(&self, vehicle: usize) -> Option<u64> {
        match &self.mode {
            SolveMode::SingleVehicle => None,
            SolveMode::Capacitated { capacities, .. } => capacities.get(vehicle).copied(),
        }
    }

    /// Demand of `stop`. Zero for the depot, for unknown stops and in
    /// single-vehicle mode.
    #[must_use]
    pub fn demand(&self, stop: usize) -> u64 {
        match &self.mode {
            SolveMode::Capacitated { demands, .. } if stop != self.depot => {
                demands.get(stop).copied().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

fn check_depot(matrix: &CostMatrix, depot: usize) -> Result<(), SolveError> {
    if matrix.size() == 0 {
        return Err(SolveError::EmptyProblem);
    }
    if depot >= matrix.size() {
        return Err(SolveError::DepotOutOfRange {
            depot,
            stops: matrix.size(),
        });
    }
    Ok(())
}

/// Counters describing how a solve went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Wall-clock time spent solving.
    pub elapsed: Duration,
    /// Improving moves applied during local search.
    pub improving_moves: u64,
    /// Penalty rounds run by the guided phase.
    pub guided_rounds: u64,
}

/// Response from a completed solve.
///
/// An empty [`Solution`] means no feasible assignment was found; it is a
/// reportable outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResponse {
    /// Routes keyed by label.
    pub solution: Solution,
    /// Final objective: arc cost plus span penalty. `+∞` when empty.
    pub objective: f64,
    /// Search counters.
    pub diagnostics: Diagnostics,
}

impl SolveResponse {
    /// The "no feasible solution" outcome.
    #[must_use]
    pub fn infeasible(diagnostics: Diagnostics) -> Self {
        Self {
            solution: Solution::new(),
            objective: f64::INFINITY,
            diagnostics,
        }
    }

    /// Whether no feasible solution was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solution.is_empty()
    }
}

/// Precondition failures rejected before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The matrix covers no stops.
    #[error("problem has no stops")]
    EmptyProblem,
    /// The depot index is not a stop.
    #[error("depot {depot} is out of range for {stops} stops")]
    DepotOutOfRange {
        /// Requested depot.
        depot: usize,
        /// Number of stops.
        stops: usize,
    },
    /// Capacitated mode with zero vehicles.
    #[error("capacitated routing needs at least one vehicle")]
    NoVehicles,
    /// Capacity list length differs from the vehicle count.
    #[error("{vehicles} vehicles but {capacities} capacities")]
    CapacityMismatch {
        /// Vehicle count.
        vehicles: usize,
        /// Capacity entries supplied.
        capacities: usize,
    },
    /// Demand list length differs from the stop count.
    #[error("{stops} stops but {demands} demands")]
    DemandMismatch {
        /// Number of stops.
        stops: usize,
        /// Demand entries supplied.
        demands: usize,
    },
}

/// Partition stops into depot-anchored routes.
///
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait Solver: Send + Sync {
    /// Solve a validated request.
    ///
    /// Returns an empty solution, not an error, when no feasible assignment
    /// exists.
    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveResponse, SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    struct IdentitySolver;

    impl Solver for IdentitySolver {
        fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveResponse, SolveError> {
            let depot = request.depot();
            let mut stops = vec![depot];
            stops.extend((0..request.stop_count()).filter(|&s| s != depot));
            stops.push(depot);
            let mut solution = Solution::new();
            solution.insert_route("tsp_1", stops);
            Ok(SolveResponse {
                objective: solution.cost_under(request.matrix()),
                solution,
                diagnostics: Diagnostics::default(),
            })
        }
    }

    #[fixture]
    fn matrix() -> CostMatrix {
        CostMatrix::from_rows(vec![vec![1.0; 4]; 4]).expect("square matrix")
    }

    #[rstest]
    fn solver_receives_validated_request(matrix: CostMatrix) {
        let request = SolveRequest::single_vehicle(&matrix, 2).expect("valid request");
        let response = IdentitySolver.solve(&request).expect("solve");
        assert_eq!(response.solution.route("tsp_1"), Some(&[2, 0, 1, 3, 2][..]));
        assert_eq!(response.objective, 4.0);
    }

    #[rstest]
    fn rejects_depot_out_of_range(matrix: CostMatrix) {
        let err = SolveRequest::single_vehicle(&matrix, 4).expect_err("depot out of range");
        assert_eq!(err, SolveError::DepotOutOfRange { depot: 4, stops: 4 });
    }

    #[rstest]
    #[case(0, vec![], SolveError::NoVehicles)]
    #[case(2, vec![5], SolveError::CapacityMismatch { vehicles: 2, capacities: 1 })]
    #[case(1, vec![5, 5], SolveError::CapacityMismatch { vehicles: 1, capacities: 2 })]
    fn rejects_bad_fleet(
        matrix: CostMatrix,
        #[case] vehicles: usize,
        #[case] capacities: Vec<u64>,
        #[case] expected: SolveError,
    ) {
        let err = SolveRequest::capacitated(&matrix, 0, vec![0, 1, 1, 1], vehicles, capacities)
            .expect_err("bad fleet");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn rejects_short_demands(matrix: CostMatrix) {
        let err = SolveRequest::capacitated(&matrix, 0, vec![0, 1], 1, vec![5])
            .expect_err("short demands");
        assert_eq!(err, SolveError::DemandMismatch { stops: 4, demands: 2 });
    }

    #[rstest]
    fn depot_demand_is_ignored(matrix: CostMatrix) {
        let request = SolveRequest::capacitated(&matrix, 1, vec![4, 9, 2, 3], 1, vec![5])
            .expect("valid request");
        assert_eq!(request.demand(1), 0);
        assert_eq!(request.demand(0), 4);
        assert_eq!(request.capacity(0), Some(5));
    }
}
