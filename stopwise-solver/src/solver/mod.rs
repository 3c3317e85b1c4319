//! `LocalSearchSolver`: cheapest-arc construction followed by local search.

use std::time::Instant;

use log::{debug, warn};
use stopwise_core::{
    Diagnostics, Solution, SolveError, SolveMode, SolveRequest, SolveResponse, Solver,
};

use crate::config::SolverConfig;
use crate::construction::cheapest_arc_routes;
use crate::instance::Instance;
use crate::search::Search;

/// Label of the single route in single-vehicle mode.
pub const TSP_ROUTE_LABEL: &str = "tsp_1";

/// Label of vehicle `index` (zero-based) in capacitated mode.
#[must_use]
pub fn vehicle_label(index: usize) -> String {
    format!("vehicle_{}", index.saturating_add(1))
}

/// Native solver for single-vehicle tours and capacitated fleets.
///
/// Without an explicit configuration the solver picks the preset matching
/// each request's mode; see [`SolverConfig::for_mode`].
///
/// # Examples
///
/// ```
/// use stopwise_core::{CostMatrix, SolveRequest, Solver};
/// use stopwise_solver::LocalSearchSolver;
///
/// let matrix = CostMatrix::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.0],
///     vec![2.0, 1.0, 0.0],
/// ])?;
/// let request = SolveRequest::single_vehicle(&matrix, 0)?;
/// let response = LocalSearchSolver::new().solve(&request)?;
/// assert_eq!(response.solution.route("tsp_1"), Some(&[0, 1, 2, 0][..]));
/// assert_eq!(response.objective, 4.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalSearchSolver {
    config: Option<SolverConfig>,
}

impl LocalSearchSolver {
    /// A solver using the per-mode presets.
    #[must_use]
    pub const fn new() -> Self {
        Self { config: None }
    }

    /// A solver using `config` for every request.
    #[must_use]
    pub const fn with_config(config: SolverConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    /// Configuration applied to `mode`.
    #[must_use]
    pub fn config_for(&self, mode: &SolveMode) -> SolverConfig {
        self.config
            .clone()
            .unwrap_or_else(|| SolverConfig::for_mode(mode))
    }
}

impl Solver for LocalSearchSolver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveResponse, SolveError> {
        let started = Instant::now();
        let config = self.config_for(request.mode());
        let instance = Instance::from_request(request);

        if let Some(reason) = instance.capacity_shortfall() {
            warn!("no feasible assignment: {reason}");
            return Ok(SolveResponse::infeasible(Diagnostics {
                elapsed: started.elapsed(),
                ..Diagnostics::default()
            }));
        }

        let Some(initial) = cheapest_arc_routes(&instance, config.max_route_cost) else {
            warn!("no feasible assignment: a stop fits in no vehicle");
            return Ok(SolveResponse::infeasible(Diagnostics {
                elapsed: started.elapsed(),
                ..Diagnostics::default()
            }));
        };
        debug!(
            "initial routes built for {} stop(s) across {} vehicle(s)",
            request.stop_count(),
            instance.vehicle_count()
        );

        let outcome = Search::new(&instance, &config, started).run(initial);
        let diagnostics = Diagnostics {
            elapsed: started.elapsed(),
            improving_moves: outcome.improving_moves,
            guided_rounds: outcome.guided_rounds,
        };

        if let Some(reason) = rejection(&instance, &config, &outcome.routes) {
            warn!("no feasible assignment: {reason}");
            return Ok(SolveResponse::infeasible(diagnostics));
        }

        debug!(
            "search finished after {} move(s) and {} guided round(s); objective {}",
            diagnostics.improving_moves, diagnostics.guided_rounds, outcome.objective
        );
        Ok(SolveResponse {
            solution: label_routes(&instance, request.mode(), outcome.routes),
            objective: outcome.objective,
            diagnostics,
        })
    }
}

/// Why the final routes are not a valid answer, if they are not.
fn rejection(
    instance: &Instance,
    config: &SolverConfig,
    routes: &[Vec<usize>],
) -> Option<String> {
    let arcs = instance.arcs();
    let depot = instance.depot();
    routes.iter().enumerate().find_map(|(vehicle, route)| {
        if !arcs.route_is_reachable(depot, route) {
            return Some(format!(
                "route of {} uses an unreachable arc",
                vehicle_label(vehicle)
            ));
        }
        let cost = arcs.route_cost(depot, route);
        config
            .max_route_cost
            .filter(|&ceiling| cost > ceiling)
            .map(|ceiling| {
                format!(
                    "route of {} costs {cost}, above the ceiling of {ceiling}",
                    vehicle_label(vehicle)
                )
            })
    })
}

fn label_routes(instance: &Instance, mode: &SolveMode, routes: Vec<Vec<usize>>) -> Solution {
    let depot = instance.depot();
    routes
        .into_iter()
        .enumerate()
        .map(|(vehicle, route)| {
            let label = match mode {
                SolveMode::SingleVehicle => TSP_ROUTE_LABEL.to_owned(),
                SolveMode::Capacitated { .. } => vehicle_label(vehicle),
            };
            let mut stops = Vec::with_capacity(route.len() + 2);
            stops.push(depot);
            stops.extend(route);
            stops.push(depot);
            (label, stops)
        })
        .collect()
}

#[cfg(test)]
mod tests;
