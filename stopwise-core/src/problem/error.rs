use camino::Utf8PathBuf;
use thiserror::Error;

use crate::SolveError;

/// Errors raised by [`crate::RoutingProblem`] mutators and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// The depot index is not a stop.
    #[error("depot {depot} is out of range for {stops} stops")]
    DepotOutOfRange {
        /// Requested depot.
        depot: usize,
        /// Number of stops.
        stops: usize,
    },
    /// Capacity list length differs from the vehicle count.
    #[error("{vehicles} vehicles but {capacities} capacities")]
    CapacityMismatch {
        /// Vehicle count.
        vehicles: usize,
        /// Capacity entries supplied.
        capacities: usize,
    },
    /// A fleet of zero vehicles was supplied.
    #[error("a fleet needs at least one vehicle")]
    NoVehicles,
    /// Demand list length differs from the stop count.
    #[error("{stops} stops but {demands} demands")]
    DemandMismatch {
        /// Number of stops.
        stops: usize,
        /// Demand entries supplied.
        demands: usize,
    },
    /// A matrix does not cover every stop.
    #[error("matrix {name} covers {size} stops, problem has {stops}")]
    MatrixDimension {
        /// Matrix name.
        name: String,
        /// Matrix size.
        size: usize,
        /// Number of stops.
        stops: usize,
    },
    /// A matrix covers no stops.
    #[error("matrix {name} covers no stops")]
    EmptyMatrix {
        /// Matrix name.
        name: String,
    },
    /// A solution refers to a stop that does not exist.
    #[error("solution {name} visits stop {stop}, problem has {stops}")]
    StopOutOfRange {
        /// Solution name.
        name: String,
        /// Offending stop index.
        stop: usize,
        /// Number of stops.
        stops: usize,
    },
    /// No matrix is registered under the name.
    #[error("no matrix named {name}")]
    MatrixNotFound {
        /// Requested name.
        name: String,
    },
    /// No solution is registered under the name.
    #[error("no solution named {name}")]
    SolutionNotFound {
        /// Requested name.
        name: String,
    },
    /// The solve request was rejected.
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Errors raised by [`crate::ProblemArchive`].
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The problem name cannot be used as a file name.
    #[error("invalid problem name {name:?}")]
    InvalidName {
        /// Rejected name.
        name: String,
    },
    /// The archive directory could not be created or opened.
    #[error("failed to open archive at {path}: {source}")]
    OpenRoot {
        /// Archive root.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Record path relative to the archive root.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Record path relative to the archive root.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// No record exists for the problem name.
    #[error("no archived problem named {name}")]
    NotFound {
        /// Requested name.
        name: String,
    },
    /// A problem could not be encoded as JSON.
    #[error("failed to encode problem {name}: {source}")]
    Encode {
        /// Problem name.
        name: String,
        /// Serialiser error.
        #[source]
        source: serde_json::Error,
    },
    /// A record is not valid JSON for a problem.
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// Record path relative to the archive root.
        path: Utf8PathBuf,
        /// Deserialiser error.
        #[source]
        source: serde_json::Error,
    },
    /// A record decoded but violates a problem invariant.
    #[error("record {path} is inconsistent: {source}")]
    InvalidRecord {
        /// Record path relative to the archive root.
        path: Utf8PathBuf,
        /// Violated invariant.
        #[source]
        source: ProblemError,
    },
}
