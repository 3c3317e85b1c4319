//! Golden-route regression tests.
//!
//! Each case is small enough that the optimum is known by hand, so the solver
//! must reach it exactly.

use std::time::Duration;

use rstest::rstest;
use stopwise_core::{CostMatrix, SolveRequest, Solver};
use stopwise_solver::test_support::{UNIT_SQUARE, planar_matrix};
use stopwise_solver::{LocalSearchSolver, SolverConfig, TSP_ROUTE_LABEL};

/// Stops on a 3 x 2 grid with unit spacing; the optimal tour is the
/// perimeter of length 6.
const GRID: [(f64, f64); 6] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (2.0, 0.0),
    (2.0, 1.0),
    (1.0, 1.0),
    (0.0, 1.0),
];

fn tour_cost(matrix: &CostMatrix, depot: usize) -> (Vec<usize>, f64) {
    let request = SolveRequest::single_vehicle(matrix, depot).expect("request");
    let response = LocalSearchSolver::new().solve(&request).expect("solve");
    let route = response
        .solution
        .route(TSP_ROUTE_LABEL)
        .expect("single route")
        .to_vec();
    (route, response.objective)
}

#[rstest]
#[case(&UNIT_SQUARE[..], 4.0)]
#[case(&GRID[..], 6.0)]
fn tour_reaches_known_optimum(#[case] points: &[(f64, f64)], #[case] optimum: f64) {
    let matrix = planar_matrix(points);
    let (route, objective) = tour_cost(&matrix, 0);
    assert!((objective - optimum).abs() < 1e-9, "objective {objective}");
    assert!((matrix.path_cost(&route) - optimum).abs() < 1e-9);
}

#[rstest]
fn scrambled_grid_still_finds_perimeter() {
    let scrambled = [
        (0.0, 0.0),
        (2.0, 1.0),
        (1.0, 0.0),
        (0.0, 1.0),
        (2.0, 0.0),
        (1.0, 1.0),
    ];
    let matrix = planar_matrix(&scrambled);
    let (_, objective) = tour_cost(&matrix, 0);
    assert!((objective - 6.0).abs() < 1e-9, "objective {objective}");
}

#[rstest]
fn balanced_fleet_on_a_line() {
    let points = [(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0), (2.0, 0.0), (-2.0, 0.0)];
    let matrix = planar_matrix(&points);
    let request = SolveRequest::capacitated(&matrix, 0, vec![0, 1, 1, 1, 1], 2, vec![2, 2])
        .expect("request");
    let config = SolverConfig::capacitated()
        .with_time_limit(Duration::from_millis(300))
        .with_max_guided_rounds(25);
    let response = LocalSearchSolver::with_config(config)
        .solve(&request)
        .expect("solve");
    assert!((response.objective - 8.0).abs() < 1e-9);
    let mut groups: Vec<Vec<usize>> = response
        .solution
        .routes()
        .map(|(_, stops)| {
            let mut inner: Vec<usize> = stops.iter().copied().filter(|&stop| stop != 0).collect();
            inner.sort_unstable();
            inner
        })
        .collect();
    groups.sort();
    assert_eq!(groups, vec![vec![1, 3], vec![2, 4]]);
}
