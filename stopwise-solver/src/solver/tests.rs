//! Tests for the `LocalSearchSolver`.

use std::time::Duration;

use super::*;
use rstest::{fixture, rstest};
use stopwise_core::{CostCell, CostMatrix};

use crate::StopSignal;
use crate::test_support::{UNIT_SQUARE, planar_matrix, route_loads, visited_stops};

fn quick() -> SolverConfig {
    SolverConfig::capacitated()
        .with_time_limit(Duration::from_millis(200))
        .with_max_guided_rounds(20)
}

#[fixture]
fn square() -> CostMatrix {
    planar_matrix(&UNIT_SQUARE)
}

#[rstest]
fn single_vehicle_tour_follows_the_square(square: CostMatrix) {
    let request = SolveRequest::single_vehicle(&square, 0).expect("request");
    let response = LocalSearchSolver::new().solve(&request).expect("solve");
    let tour = response.solution.route(TSP_ROUTE_LABEL).expect("tour");
    assert_eq!(tour.first(), Some(&0));
    assert_eq!(tour.last(), Some(&0));
    assert!((response.objective - 4.0).abs() < 1e-9);
    assert_eq!(response.diagnostics.guided_rounds, 0);
}

#[rstest]
fn single_stop_problem_returns_depot_loop() {
    let matrix = CostMatrix::from_rows(vec![vec![0.0]]).expect("matrix");
    let request = SolveRequest::single_vehicle(&matrix, 0).expect("request");
    let response = LocalSearchSolver::new().solve(&request).expect("solve");
    assert_eq!(response.solution.route(TSP_ROUTE_LABEL), Some(&[0, 0][..]));
    assert_eq!(response.objective, 0.0);
}

#[rstest]
fn depot_need_not_be_stop_zero(square: CostMatrix) {
    let request = SolveRequest::single_vehicle(&square, 2).expect("request");
    let response = LocalSearchSolver::new().solve(&request).expect("solve");
    assert!(response.solution.is_depot_anchored(2));
    assert_eq!(visited_stops(&response.solution, 2), vec![0, 1, 3]);
}

#[rstest]
fn capacitated_routes_respect_capacity() {
    let points = [
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (0.0, 1.0),
        (0.0, 2.0),
        (1.0, 1.0),
    ];
    let matrix = planar_matrix(&points);
    let demands = vec![0, 3, 3, 3, 3, 3];
    let request = SolveRequest::capacitated(&matrix, 0, demands.clone(), 2, vec![6, 9])
        .expect("request");
    let response = LocalSearchSolver::with_config(quick())
        .solve(&request)
        .expect("solve");
    let loads = route_loads(&response.solution, &demands, 0);
    let labels: Vec<&str> = loads.iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(labels, ["vehicle_1", "vehicle_2"]);
    for ((_, load), capacity) in loads.iter().zip([6, 9]) {
        assert!(*load <= capacity);
    }
    assert_eq!(visited_stops(&response.solution, 0), vec![1, 2, 3, 4, 5]);
}

#[rstest]
fn idle_vehicle_gets_a_depot_loop(square: CostMatrix) {
    let request = SolveRequest::capacitated(&square, 0, vec![0, 1, 1, 1], 2, vec![10, 10])
        .expect("request");
    let config = quick().with_span_cost_coefficient(0.0);
    let response = LocalSearchSolver::with_config(config)
        .solve(&request)
        .expect("solve");
    assert_eq!(response.solution.len(), 2);
    assert!(
        response
            .solution
            .routes()
            .any(|(_, stops)| stops == [0, 0])
    );
    assert!((response.objective - 4.0).abs() < 1e-9);
}

#[rstest]
fn span_coefficient_balances_routes() {
    let points = [(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0), (2.0, 0.0), (-2.0, 0.0)];
    let matrix = planar_matrix(&points);
    let request =
        SolveRequest::capacitated(&matrix, 0, vec![0, 1, 1, 1, 1], 2, vec![10, 10])
            .expect("request");
    let response = LocalSearchSolver::with_config(quick())
        .solve(&request)
        .expect("solve");
    let mut costs: Vec<f64> = response
        .solution
        .routes()
        .map(|(_, stops)| matrix.path_cost(stops))
        .collect();
    costs.sort_by(f64::total_cmp);
    assert_eq!(costs, vec![4.0, 4.0]);
}

#[rstest]
fn demand_above_fleet_capacity_is_infeasible(square: CostMatrix) {
    let request = SolveRequest::capacitated(&square, 0, vec![0, 5, 5, 5], 2, vec![6, 6])
        .expect("request");
    let response = LocalSearchSolver::new().solve(&request).expect("solve");
    assert!(response.is_empty());
    assert_eq!(response.objective, f64::INFINITY);
}

#[rstest]
fn exactly_fitting_fleet_is_solved() {
    let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)];
    let matrix = planar_matrix(&points);
    let demands = vec![0, 2, 3, 3, 4];
    let request = SolveRequest::capacitated(&matrix, 0, demands.clone(), 2, vec![6, 6])
        .expect("request");
    let response = LocalSearchSolver::with_config(quick())
        .solve(&request)
        .expect("solve");
    assert!(!response.is_empty());
    assert!(response.solution.is_depot_anchored(0));
    for (_, load) in route_loads(&response.solution, &demands, 0) {
        assert_eq!(load, 6);
    }
    assert_eq!(visited_stops(&response.solution, 0), vec![1, 2, 3, 4]);
}

#[rstest]
fn unreachable_stop_yields_empty_solution() {
    let matrix = CostMatrix::from_fn(3, |from, to| {
        if from == 2 || to == 2 {
            CostCell::Unreachable
        } else {
            CostCell::Cost(1.0)
        }
    });
    let request = SolveRequest::single_vehicle(&matrix, 0).expect("request");
    let response = LocalSearchSolver::new().solve(&request).expect("solve");
    assert!(response.is_empty());
}

#[rstest]
fn route_ceiling_rejects_long_tours(square: CostMatrix) {
    let config = SolverConfig::single_vehicle().with_max_route_cost(Some(3.0));
    let request = SolveRequest::single_vehicle(&square, 0).expect("request");
    let response = LocalSearchSolver::with_config(config)
        .solve(&request)
        .expect("solve");
    assert!(response.is_empty());
}

#[rstest]
fn raised_stop_signal_still_returns_a_solution(square: CostMatrix) {
    let signal = StopSignal::new();
    signal.stop();
    let config = quick().with_stop_signal(signal);
    let request = SolveRequest::single_vehicle(&square, 0).expect("request");
    let response = LocalSearchSolver::with_config(config)
        .solve(&request)
        .expect("solve");
    assert_eq!(visited_stops(&response.solution, 0), vec![1, 2, 3]);
    assert_eq!(response.diagnostics.improving_moves, 0);
}

#[rstest]
#[case(SolveMode::SingleVehicle, None, None)]
#[case(
    SolveMode::Capacitated { demands: vec![], capacities: vec![] },
    Some(Duration::from_secs(100)),
    Some(100_000.0)
)]
fn presets_follow_the_mode(
    #[case] mode: SolveMode,
    #[case] limit: Option<Duration>,
    #[case] ceiling: Option<f64>,
) {
    let config = LocalSearchSolver::new().config_for(&mode);
    assert_eq!(config.time_limit, limit);
    assert_eq!(config.max_route_cost, ceiling);
}

#[rstest]
fn vehicle_labels_are_one_based() {
    assert_eq!(vehicle_label(0), "vehicle_1");
    assert_eq!(vehicle_label(9), "vehicle_10");
}
