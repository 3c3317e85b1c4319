//! Best-improvement descent with guided local search on top.
//!
//! Descent applies the best improving relocate, exchange or 2-opt move until
//! none remains. When a time budget is configured the guided phase then
//! penalises the arcs of the current local optimum with the highest
//! `cost / (1 + penalty)` utility and descends again on the augmented cost,
//! keeping the best solution under the true objective. The phase ends at the
//! deadline, when the stop signal is raised, after the configured number of
//! rounds, or after a run of rounds without a new best.
#![expect(
    clippy::float_arithmetic,
    reason = "move evaluation compares route costs"
)]

mod moves;

use std::time::Instant;

use crate::arcs::legs;
use crate::config::SolverConfig;
use crate::instance::Instance;

use moves::{Change, for_each_candidate};

/// Moves must beat the incumbent by more than this to count.
const EPSILON: f64 = 1.0e-10;

/// Routes together with their cached costs.
#[derive(Debug, Clone)]
struct Plan {
    routes: Vec<Vec<usize>>,
    costs: Vec<f64>,
    augmented: Vec<f64>,
}

/// Routes and counters returned by [`Search::run`].
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub(crate) routes: Vec<Vec<usize>>,
    pub(crate) objective: f64,
    pub(crate) improving_moves: u64,
    pub(crate) guided_rounds: u64,
}

/// A rewritten route with its true and augmented cost.
#[derive(Debug, Clone)]
struct Rewrite {
    vehicle: usize,
    route: Vec<usize>,
    cost: f64,
    augmented: f64,
}

/// Per-arc penalty counts and their weight.
#[derive(Debug, Clone)]
struct Penalties {
    counts: Vec<u32>,
    lambda: f64,
}

/// One improvement run over a fixed instance.
pub(crate) struct Search<'a> {
    instance: &'a Instance,
    config: &'a SolverConfig,
    deadline: Option<Instant>,
    penalties: Penalties,
    improving_moves: u64,
    guided_rounds: u64,
}

impl<'a> Search<'a> {
    pub(crate) fn new(instance: &'a Instance, config: &'a SolverConfig, started: Instant) -> Self {
        let size = instance.arcs().size();
        Self {
            instance,
            config,
            deadline: config.time_limit.map(|limit| started + limit),
            penalties: Penalties {
                counts: vec![0; size * size],
                lambda: 0.0,
            },
            improving_moves: 0,
            guided_rounds: 0,
        }
    }

    /// Improve `routes` until a stopping condition holds.
    pub(crate) fn run(mut self, routes: Vec<Vec<usize>>) -> Outcome {
        let mut plan = self.plan(routes);
        let mut best = plan.clone();
        let mut best_objective = self.objective(&best);
        self.descend(&mut plan, &mut best, &mut best_objective);

        if self.config.time_limit.is_some() {
            let mut stall = 0_u64;
            while self.may_continue(best_objective, stall) {
                if !self.penalise(&mut plan) {
                    break;
                }
                self.guided_rounds += 1;
                let before = best_objective;
                self.descend(&mut plan, &mut best, &mut best_objective);
                stall = if best_objective < before - EPSILON {
                    0
                } else {
                    stall + 1
                };
            }
        }

        Outcome {
            routes: best.routes,
            objective: best_objective,
            improving_moves: self.improving_moves,
            guided_rounds: self.guided_rounds,
        }
    }

    fn may_continue(&self, best_objective: f64, stall: u64) -> bool {
        !self.interrupted()
            && best_objective > EPSILON
            && stall < self.config.stall_rounds
            && self
                .config
                .max_guided_rounds
                .is_none_or(|rounds| self.guided_rounds < rounds)
    }

    fn interrupted(&self) -> bool {
        self.config.should_stop()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn plan(&self, routes: Vec<Vec<usize>>) -> Plan {
        let costs = routes.iter().map(|route| self.true_cost(route)).collect();
        let augmented = routes.iter().map(|route| self.augmented_cost(route)).collect();
        Plan {
            routes,
            costs,
            augmented,
        }
    }

    fn true_cost(&self, route: &[usize]) -> f64 {
        self.instance.arcs().route_cost(self.instance.depot(), route)
    }

    fn augmented_cost(&self, route: &[usize]) -> f64 {
        let arcs = self.instance.arcs();
        legs(self.instance.depot(), route)
            .map(|(from, to)| arcs.cost(from, to) + self.penalty(from, to))
            .sum()
    }

    fn penalty(&self, from: usize, to: usize) -> f64 {
        let count = self
            .instance
            .arcs()
            .index(from, to)
            .and_then(|idx| self.penalties.counts.get(idx))
            .copied()
            .unwrap_or(0);
        self.penalties.lambda * f64::from(count)
    }

    fn span(&self, costs: impl Iterator<Item = f64> + Clone) -> f64 {
        if self.instance.vehicle_count() < 2 {
            return 0.0;
        }
        let max = costs.clone().fold(f64::NEG_INFINITY, f64::max);
        let min = costs.fold(f64::INFINITY, f64::min);
        self.config.span_cost_coefficient * (max - min)
    }

    /// Arc cost plus span term, without penalties.
    fn objective(&self, plan: &Plan) -> f64 {
        plan.costs.iter().sum::<f64>() + self.span(plan.costs.iter().copied())
    }

    /// Run descent to a local optimum of the augmented objective, recording
    /// any plan that improves the true objective.
    fn descend(&mut self, plan: &mut Plan, best: &mut Plan, best_objective: &mut f64) {
        while !self.interrupted() {
            let Some(change) = self.best_move(plan) else {
                break;
            };
            for rewrite in change {
                if let (Some(route), Some(cost), Some(augmented)) = (
                    plan.routes.get_mut(rewrite.vehicle),
                    plan.costs.get_mut(rewrite.vehicle),
                    plan.augmented.get_mut(rewrite.vehicle),
                ) {
                    *route = rewrite.route;
                    *cost = rewrite.cost;
                    *augmented = rewrite.augmented;
                }
            }
            self.improving_moves += 1;
            let objective = self.objective(plan);
            if objective < *best_objective - EPSILON {
                *best = plan.clone();
                *best_objective = objective;
            }
        }
    }

    fn best_move(&self, plan: &Plan) -> Option<Vec<Rewrite>> {
        let current = self.score(plan, &[]);
        let mut best: Option<(f64, Vec<Rewrite>)> = None;
        for_each_candidate(&plan.routes, &mut |change: Change| {
            let Some(priced) = self.price(plan, change) else {
                return;
            };
            let score = self.score(plan, &priced);
            let threshold = best.as_ref().map_or(current - EPSILON, |(s, _)| *s);
            if score < threshold {
                best = Some((score, priced));
            }
        });
        best.map(|(_, change)| change)
    }

    /// Attach true and augmented costs to a candidate, or reject it when a
    /// rewritten route breaks its vehicle's capacity or grows past the
    /// route ceiling.
    fn price(&self, plan: &Plan, change: Change) -> Option<Vec<Rewrite>> {
        change
            .into_iter()
            .map(|(vehicle, route)| {
                if self.instance.load(&route) > self.instance.capacity(vehicle) {
                    return None;
                }
                let cost = self.true_cost(&route);
                if let Some(ceiling) = self.config.max_route_cost {
                    let previous = plan.costs.get(vehicle).copied().unwrap_or(0.0);
                    if cost > ceiling && cost > previous + EPSILON {
                        return None;
                    }
                }
                let augmented = self.augmented_cost(&route);
                Some(Rewrite {
                    vehicle,
                    route,
                    cost,
                    augmented,
                })
            })
            .collect()
    }

    /// Augmented objective of `plan` with `change` applied.
    fn score(&self, plan: &Plan, change: &[Rewrite]) -> f64 {
        let lookup = |vehicle: usize| {
            change
                .iter()
                .find(|rewrite| rewrite.vehicle == vehicle)
                .map(|rewrite| (rewrite.cost, rewrite.augmented))
        };
        let entries = (0..plan.routes.len()).map(|vehicle| {
            lookup(vehicle).unwrap_or_else(|| {
                (
                    plan.costs.get(vehicle).copied().unwrap_or(0.0),
                    plan.augmented.get(vehicle).copied().unwrap_or(0.0),
                )
            })
        });
        let augmented: f64 = entries.clone().map(|(_, a)| a).sum();
        augmented + self.span(entries.map(|(c, _)| c))
    }

    /// Penalise the highest-utility arcs of `plan` and refresh its augmented
    /// costs. Returns `false` when the plan uses no arcs.
    fn penalise(&mut self, plan: &mut Plan) -> bool {
        let depot = self.instance.depot();
        let used: Vec<(usize, usize)> = plan
            .routes
            .iter()
            .flat_map(|route| legs(depot, route).collect::<Vec<_>>())
            .collect();
        let Some(arc_count) = u32::try_from(used.len()).ok().filter(|&n| n > 0) else {
            return false;
        };
        if self.penalties.lambda <= 0.0 {
            let total: f64 = plan.costs.iter().sum();
            self.penalties.lambda =
                (self.config.penalty_factor * total / f64::from(arc_count)).max(EPSILON);
        }

        let arcs = self.instance.arcs();
        let utility = |from: usize, to: usize| {
            let count = arcs
                .index(from, to)
                .and_then(|idx| self.penalties.counts.get(idx))
                .copied()
                .unwrap_or(0);
            arcs.cost(from, to) / (1.0 + f64::from(count))
        };
        let peak = used
            .iter()
            .map(|&(from, to)| utility(from, to))
            .fold(f64::NEG_INFINITY, f64::max);
        let targets: Vec<usize> = used
            .iter()
            .filter(|&&(from, to)| utility(from, to) >= peak - EPSILON)
            .filter_map(|&(from, to)| arcs.index(from, to))
            .collect();
        for idx in targets {
            if let Some(count) = self.penalties.counts.get_mut(idx) {
                *count = count.saturating_add(1);
            }
        }

        plan.augmented = plan
            .routes
            .iter()
            .map(|route| self.augmented_cost(route))
            .collect();
        true
    }
}
