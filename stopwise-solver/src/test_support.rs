//! Test-only utilities for `stopwise-solver`.
//!
//! Planar fixtures and route inspection helpers shared by unit tests,
//! behavioural tests and benchmarks.
#![expect(
    clippy::float_arithmetic,
    reason = "planar distances need floating-point arithmetic"
)]

use stopwise_core::{CostCell, CostMatrix, Solution};

/// Symmetric matrix of straight-line distances between planar points.
///
/// # Examples
///
/// ```rust
/// use stopwise_solver::test_support::planar_matrix;
///
/// let matrix = planar_matrix(&[(0.0, 0.0), (3.0, 4.0)]);
/// assert_eq!(matrix.cost(0, 1), 5.0);
/// ```
#[must_use]
pub fn planar_matrix(points: &[(f64, f64)]) -> CostMatrix {
    let point = |idx: usize| points.get(idx).copied().unwrap_or_default();
    CostMatrix::from_fn(points.len(), |from, to| {
        let (ax, ay) = point(from);
        let (bx, by) = point(to);
        CostCell::Cost((ax - bx).hypot(ay - by))
    })
}

/// Corners of the unit square, anticlockwise from the origin.
pub const UNIT_SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

/// Total demand carried by each route of `solution`, in label order. The
/// depot is skipped.
#[must_use]
pub fn route_loads(solution: &Solution, demands: &[u64], depot: usize) -> Vec<(String, u64)> {
    solution
        .routes()
        .map(|(label, stops)| {
            let load = stops
                .iter()
                .filter(|&&stop| stop != depot)
                .map(|&stop| demands.get(stop).copied().unwrap_or(0))
                .sum();
            (label.to_owned(), load)
        })
        .collect()
}

/// Non-depot stops of `solution`, sorted, with repeats kept.
#[must_use]
pub fn visited_stops(solution: &Solution, depot: usize) -> Vec<usize> {
    let mut stops: Vec<usize> = solution
        .routes()
        .flat_map(|(_, stops)| stops.iter().copied())
        .filter(|&stop| stop != depot)
        .collect();
    stops.sort_unstable();
    stops
}
