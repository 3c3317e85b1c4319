//! Solver tuning and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use stopwise_core::SolveMode;

/// Default time budget of the capacitated preset, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 100;

/// Default weight of the route span term in the capacitated preset.
pub const DEFAULT_SPAN_COST_COEFFICIENT: f64 = 1000.0;

/// Default per-route cost ceiling of the capacitated preset.
pub const DEFAULT_MAX_ROUTE_COST: f64 = 100_000.0;

/// Default scaling of guided-search penalties.
pub const DEFAULT_PENALTY_FACTOR: f64 = 0.1;

/// Default number of guided rounds without a new best before stopping.
pub const DEFAULT_STALL_ROUNDS: u64 = 250;

/// Shared flag asking a running solve to stop.
///
/// The improvement phase checks the flag between moves and returns the best
/// solution found so far once it is raised.
///
/// # Examples
///
/// ```
/// use stopwise_solver::StopSignal;
///
/// let signal = StopSignal::new();
/// let handle = signal.clone();
/// handle.stop();
/// assert!(signal.is_stopped());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// A lowered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Configuration for [`crate::LocalSearchSolver`].
///
/// Two presets mirror the solving modes: [`SolverConfig::single_vehicle`]
/// runs plain descent to a local optimum with no time limit, and
/// [`SolverConfig::capacitated`] runs guided local search under a
/// 100-second budget with a span penalty. [`Default`] is the capacitated
/// preset.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stopwise_solver::SolverConfig;
///
/// let config = SolverConfig::capacitated()
///     .with_time_limit(Duration::from_secs(2))
///     .with_span_cost_coefficient(10.0);
/// assert_eq!(config.time_limit, Some(Duration::from_secs(2)));
/// ```
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget for the improvement phase. `None` disables the
    /// guided phase and stops at the first local optimum.
    pub time_limit: Option<Duration>,
    /// Weight of `max - min` route cost added to the objective.
    pub span_cost_coefficient: f64,
    /// Scales guided-search penalties relative to the average arc cost.
    pub penalty_factor: f64,
    /// Upper bound on penalty rounds, unbounded when `None`.
    pub max_guided_rounds: Option<u64>,
    /// Stop after this many penalty rounds without a new best solution.
    pub stall_rounds: u64,
    /// Largest admissible cost of a single route.
    pub max_route_cost: Option<f64>,
    /// Cooperative cancellation flag.
    pub stop_signal: Option<StopSignal>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::capacitated()
    }
}

impl SolverConfig {
    /// Plain descent without a time limit or span term.
    #[must_use]
    pub const fn single_vehicle() -> Self {
        Self {
            time_limit: None,
            span_cost_coefficient: 0.0,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            max_guided_rounds: None,
            stall_rounds: DEFAULT_STALL_ROUNDS,
            max_route_cost: None,
            stop_signal: None,
        }
    }

    /// Guided local search with a 100-second budget, span coefficient 1000
    /// and a 100 000 per-route ceiling.
    #[must_use]
    pub const fn capacitated() -> Self {
        Self {
            time_limit: Some(Duration::from_secs(DEFAULT_TIME_LIMIT_SECS)),
            span_cost_coefficient: DEFAULT_SPAN_COST_COEFFICIENT,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            max_guided_rounds: None,
            stall_rounds: DEFAULT_STALL_ROUNDS,
            max_route_cost: Some(DEFAULT_MAX_ROUTE_COST),
            stop_signal: None,
        }
    }

    /// The preset matching `mode`.
    #[must_use]
    pub const fn for_mode(mode: &SolveMode) -> Self {
        match mode {
            SolveMode::SingleVehicle => Self::single_vehicle(),
            SolveMode::Capacitated { .. } => Self::capacitated(),
        }
    }

    /// Set the improvement time budget.
    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Remove the time budget, leaving plain descent.
    #[must_use]
    pub const fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    /// Set the span coefficient.
    #[must_use]
    pub const fn with_span_cost_coefficient(mut self, coefficient: f64) -> Self {
        self.span_cost_coefficient = coefficient;
        self
    }

    /// Set the guided-search penalty factor.
    #[must_use]
    pub const fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Cap the number of guided rounds.
    #[must_use]
    pub const fn with_max_guided_rounds(mut self, rounds: u64) -> Self {
        self.max_guided_rounds = Some(rounds);
        self
    }

    /// Set the stall limit.
    #[must_use]
    pub const fn with_stall_rounds(mut self, rounds: u64) -> Self {
        self.stall_rounds = rounds;
        self
    }

    /// Set or clear the per-route ceiling.
    #[must_use]
    pub const fn with_max_route_cost(mut self, ceiling: Option<f64>) -> Self {
        self.max_route_cost = ceiling;
        self
    }

    /// Attach a cancellation flag.
    #[must_use]
    pub fn with_stop_signal(mut self, signal: StopSignal) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    pub(crate) fn should_stop(&self) -> bool {
        self.stop_signal.as_ref().is_some_and(StopSignal::is_stopped)
    }
}
