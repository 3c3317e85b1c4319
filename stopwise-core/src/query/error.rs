use thiserror::Error;

/// Errors from [`crate::CostQueryClient`] calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No coordinates were provided.
    #[error("at least one coordinate is required")]
    EmptyInput,

    /// A route query needs at least two waypoints.
    #[error("a route needs at least two waypoints, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },

    /// The request failed before a response was received.
    #[error("network error for {url}: {message}")]
    NetworkError {
        /// Requested URL.
        url: String,
        /// Error detail.
        message: String,
    },

    /// The routing service reported a failure code, e.g. `NoRoute`.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Service status code.
        code: String,
        /// Service message, empty when none was given.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Error detail.
        message: String,
    },

    /// A table response did not match the number of coordinates.
    #[error("expected a {expected}x{expected} table, got {rows} rows")]
    DimensionMismatch {
        /// Number of coordinates requested.
        expected: usize,
        /// Number of rows returned.
        rows: usize,
    },
}
