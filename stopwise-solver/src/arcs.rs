//! Dense arc-cost table used by the search.
#![expect(
    clippy::float_arithmetic,
    reason = "route costs are sums of arc costs"
)]

use stopwise_core::{CostCell, CostMatrix};

/// Cost assigned to an unreachable arc so the search can still compare
/// candidates that use one. Any final route using such an arc is rejected.
pub const UNREACHABLE_ARC_COST: f64 = 1.0e12;

/// Row-major copy of a [`CostMatrix`] with unreachable cells priced at
/// [`UNREACHABLE_ARC_COST`].
#[derive(Debug, Clone)]
pub(crate) struct ArcCosts {
    size: usize,
    costs: Vec<f64>,
    reachable: Vec<bool>,
}

impl ArcCosts {
    pub(crate) fn from_matrix(matrix: &CostMatrix) -> Self {
        let size = matrix.size();
        let mut costs = Vec::with_capacity(size * size);
        let mut reachable = Vec::with_capacity(size * size);
        for from in 0..size {
            for to in 0..size {
                match matrix.get(from, to) {
                    Some(CostCell::Cost(cost)) => {
                        costs.push(cost);
                        reachable.push(true);
                    }
                    Some(CostCell::Unreachable) | None => {
                        costs.push(UNREACHABLE_ARC_COST);
                        reachable.push(false);
                    }
                }
            }
        }
        Self {
            size,
            costs,
            reachable,
        }
    }

    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn index(&self, from: usize, to: usize) -> Option<usize> {
        (from < self.size && to < self.size).then(|| from * self.size + to)
    }

    pub(crate) fn cost(&self, from: usize, to: usize) -> f64 {
        self.index(from, to)
            .and_then(|idx| self.costs.get(idx))
            .copied()
            .unwrap_or(UNREACHABLE_ARC_COST)
    }

    pub(crate) fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.index(from, to)
            .and_then(|idx| self.reachable.get(idx))
            .copied()
            .unwrap_or(false)
    }

    /// Cost of `depot -> route... -> depot`.
    pub(crate) fn route_cost(&self, depot: usize, route: &[usize]) -> f64 {
        legs(depot, route).map(|(from, to)| self.cost(from, to)).sum()
    }

    /// Whether every leg of the closed route is reachable.
    pub(crate) fn route_is_reachable(&self, depot: usize, route: &[usize]) -> bool {
        legs(depot, route).all(|(from, to)| self.is_reachable(from, to))
    }
}

/// Consecutive `(from, to)` pairs of a depot-anchored route. An empty route
/// has no legs.
pub(crate) fn legs(depot: usize, route: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let closed = !route.is_empty();
    let stops = closed
        .then_some(depot)
        .into_iter()
        .chain(route.iter().copied())
        .chain(closed.then_some(depot));
    let next = stops.clone().skip(1);
    stops.zip(next)
}
