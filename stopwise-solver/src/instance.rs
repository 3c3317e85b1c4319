//! Search-side view of a validated solve request.

use stopwise_core::SolveRequest;

use crate::arcs::ArcCosts;

/// Arc costs, depot, per-stop demand and per-vehicle capacity.
///
/// Single-vehicle requests get one vehicle with unbounded capacity and zero
/// demand everywhere.
#[derive(Debug, Clone)]
pub(crate) struct Instance {
    arcs: ArcCosts,
    depot: usize,
    demands: Vec<u64>,
    capacities: Vec<u64>,
}

impl Instance {
    pub(crate) fn from_request(request: &SolveRequest<'_>) -> Self {
        let arcs = ArcCosts::from_matrix(request.matrix());
        let demands = (0..request.stop_count())
            .map(|stop| request.demand(stop))
            .collect();
        let capacities = (0..request.vehicle_count())
            .map(|vehicle| request.capacity(vehicle).unwrap_or(u64::MAX))
            .collect();
        Self {
            arcs,
            depot: request.depot(),
            demands,
            capacities,
        }
    }

    pub(crate) const fn arcs(&self) -> &ArcCosts {
        &self.arcs
    }

    pub(crate) const fn depot(&self) -> usize {
        self.depot
    }

    pub(crate) fn vehicle_count(&self) -> usize {
        self.capacities.len()
    }

    pub(crate) fn capacity(&self, vehicle: usize) -> u64 {
        self.capacities.get(vehicle).copied().unwrap_or(0)
    }

    pub(crate) fn demand(&self, stop: usize) -> u64 {
        self.demands.get(stop).copied().unwrap_or(0)
    }

    /// Every stop except the depot, in index order.
    pub(crate) fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.arcs.size()).filter(move |&stop| stop != self.depot)
    }

    pub(crate) fn load(&self, route: &[usize]) -> u64 {
        route
            .iter()
            .fold(0_u64, |acc, &stop| acc.saturating_add(self.demand(stop)))
    }

    /// Why the fleet cannot carry the demand, if it cannot.
    pub(crate) fn capacity_shortfall(&self) -> Option<String> {
        let total_demand = self
            .customers()
            .fold(0_u64, |acc, stop| acc.saturating_add(self.demand(stop)));
        let total_capacity = self
            .capacities
            .iter()
            .fold(0_u64, |acc, &cap| acc.saturating_add(cap));
        if total_demand > total_capacity {
            return Some(format!(
                "total demand {total_demand} exceeds fleet capacity {total_capacity}"
            ));
        }
        let largest = self.capacities.iter().copied().max().unwrap_or(0);
        self.customers()
            .find(|&stop| self.demand(stop) > largest)
            .map(|stop| {
                format!(
                    "stop {stop} demands {} but the largest vehicle holds {largest}",
                    self.demand(stop)
                )
            })
    }
}
