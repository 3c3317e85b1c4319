//! Named sets of vehicle routes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CostMatrix;

/// A mapping from route label to an ordered sequence of stop indices.
///
/// An empty solution is the explicit "no feasible solution" outcome.
///
/// # Examples
///
/// ```
/// use stopwise_core::Solution;
///
/// let mut solution = Solution::new();
/// solution.insert_route("tsp_1", vec![0, 2, 1, 0]);
/// assert!(solution.is_depot_anchored(0));
/// assert_eq!(solution.route("tsp_1"), Some(&[0, 2, 1, 0][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution {
    routes: BTreeMap<String, Vec<usize>>,
}

impl Solution {
    /// An empty solution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the route stored under `label`.
    pub fn insert_route(&mut self, label: impl Into<String>, stops: Vec<usize>) {
        self.routes.insert(label.into(), stops);
    }

    /// The route stored under `label`.
    #[must_use]
    pub fn route(&self, label: &str) -> Option<&[usize]> {
        self.routes.get(label).map(Vec::as_slice)
    }

    /// Iterate over `(label, stops)` pairs in label order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.routes
            .iter()
            .map(|(label, stops)| (label.as_str(), stops.as_slice()))
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the solution carries no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Whether every route starts and ends at `depot`.
    #[must_use]
    pub fn is_depot_anchored(&self, depot: usize) -> bool {
        self.routes
            .values()
            .all(|stops| stops.first() == Some(&depot) && stops.last() == Some(&depot))
    }

    /// Every stop index in visiting order, across routes in label order.
    pub fn visited(&self) -> impl Iterator<Item = usize> + '_ {
        self.routes.values().flatten().copied()
    }

    /// Total cost of all routes under `matrix`, `+∞` if any leg is
    /// unreachable.
    #[must_use]
    pub fn cost_under(&self, matrix: &CostMatrix) -> f64 {
        self.routes
            .values()
            .map(|stops| matrix.path_cost(stops))
            .sum()
    }
}

impl FromIterator<(String, Vec<usize>)> for Solution {
    fn from_iter<I: IntoIterator<Item = (String, Vec<usize>)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}
