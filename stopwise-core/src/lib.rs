//! Core domain types for the Stopwise routing pipeline.
//!
//! The crate holds everything that does not need a network stack or a
//! search engine: validated [`Coordinate`]s, two-state [`CostCell`]
//! matrices and their builders, the [`CostQueryClient`] seam to a road
//! network, the [`Solver`] seam with validated [`SolveRequest`]s, and the
//! [`RoutingProblem`] aggregate with its metrics and archive.

mod coordinate;
mod matrix;
mod problem;
mod query;
mod solution;
mod solver;

#[doc(hidden)]
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError};
pub use matrix::{
    CostCell, CostMatrix, DEFAULT_CONCURRENCY, MatrixError, NetworkMatrixBuilder, bulk_matrices,
    geodesic_matrix,
};
pub use problem::{
    ArchiveError, CSV_DELIMITER, LIVE_ROUTE_METRIC, MetricRecord, MetricsReport, ProblemArchive,
    ProblemError, RECORD_EXTENSION, RoutingProblem, improvement,
};
pub use query::{CostQueryClient, CostTables, QueryError, RoadRoute};
pub use solution::Solution;
pub use solver::{Diagnostics, SolveError, SolveMode, SolveRequest, SolveResponse, Solver};
