use thiserror::Error;

use crate::QueryError;

/// Errors raised while building or validating a [`crate::CostMatrix`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// No stops were supplied.
    #[error("at least one stop is required")]
    EmptyInput,
    /// A row did not have one cell per stop.
    #[error("row {row} has {actual} cells, expected {expected}")]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Number of rows in the matrix.
        expected: usize,
        /// Number of cells in the offending row.
        actual: usize,
    },
    /// The worker pool could not be created.
    #[error("failed to start worker pool: {message}")]
    WorkerPool {
        /// Description from the thread-pool builder.
        message: String,
    },
    /// The bulk table query failed; no partial matrix is produced.
    #[error("bulk table query failed: {0}")]
    Bulk(#[source] QueryError),
    /// The table response did not cover every stop.
    #[error("table response is {actual}x{actual}, expected {expected}x{expected}")]
    DimensionMismatch {
        /// Number of stops requested.
        expected: usize,
        /// Size of the returned table.
        actual: usize,
    },
}
