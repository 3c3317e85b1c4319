//! OSRM-backed road-network queries for Stopwise.
//!
//! Responsibilities:
//! - Implement [`stopwise_core::CostQueryClient`] over the OSRM HTTP API.
//! - Translate transport, status and payload failures into
//!   [`stopwise_core::QueryError`] variants.
//!
//! Boundaries:
//! - Do not encode routing rules (live in `stopwise-core` and
//!   `stopwise-solver`).
//! - Keep blocking calls off async executors; the client bridges to its own
//!   runtime when called from plain threads.
//!
//! Invariants:
//! - Thread-safe: one client may serve many matrix-builder workers at once.
//! - No global mutable state.

pub mod routing;

pub use routing::{
    ClientBuildError, DEFAULT_BASE_URL, DEFAULT_PROFILE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    OsrmClient, OsrmClientConfig,
};
