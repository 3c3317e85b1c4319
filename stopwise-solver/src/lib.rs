//! Native vehicle-routing solver for Stopwise.
//!
//! This crate provides [`LocalSearchSolver`], the default implementation of
//! the [`Solver`](stopwise_core::Solver) trait. It serves both solving modes
//! of a [`SolveRequest`](stopwise_core::SolveRequest): a single vehicle
//! touring every stop, and a capacitated fleet partitioning the stops.
//!
//! Solving has two phases. Construction extends each vehicle's route along
//! the cheapest reachable arc, then places any leftover stops by cheapest
//! insertion. Improvement runs best-improvement descent over relocate,
//! exchange and 2-opt moves and, when a time budget is set, guided local
//! search that penalises frequently used expensive arcs. The objective is the
//! total arc cost plus [`SolverConfig::span_cost_coefficient`] times the
//! spread between the longest and shortest route.
//!
//! No feasible assignment is reported as an empty solution rather than an
//! error.

#![forbid(unsafe_code)]

mod arcs;
mod config;
mod construction;
mod instance;
mod search;
mod solver;

#[doc(hidden)]
pub mod test_support;

pub use arcs::UNREACHABLE_ARC_COST;
pub use config::{
    DEFAULT_MAX_ROUTE_COST, DEFAULT_PENALTY_FACTOR, DEFAULT_SPAN_COST_COEFFICIENT,
    DEFAULT_STALL_ROUNDS, DEFAULT_TIME_LIMIT_SECS, SolverConfig, StopSignal,
};
pub use solver::{LocalSearchSolver, TSP_ROUTE_LABEL, vehicle_label};
