//! Facade crate for the Stopwise vehicle-routing pipeline.
//!
//! This crate re-exports the core domain types and exposes the native solver
//! and the OSRM cost-query client behind feature flags.

#![forbid(unsafe_code)]

pub use stopwise_core::{
    ArchiveError, Coordinate, CoordinateError, CostCell, CostMatrix, CostQueryClient, CostTables,
    DEFAULT_CONCURRENCY, Diagnostics, LIVE_ROUTE_METRIC, MatrixError, MetricRecord,
    MetricsReport, NetworkMatrixBuilder, ProblemArchive, ProblemError, QueryError, RoadRoute,
    RoutingProblem, Solution, SolveError, SolveMode, SolveRequest, SolveResponse, Solver,
    bulk_matrices, geodesic_matrix, improvement,
};

#[cfg(feature = "solver")]
pub use stopwise_solver::{LocalSearchSolver, SolverConfig, StopSignal};

#[cfg(feature = "osrm")]
pub use stopwise_osrm::{ClientBuildError, OsrmClient, OsrmClientConfig};
