//! Property-based tests for the local search solver.
//!
//! # Invariants tested
//!
//! - **Coverage:** every non-depot stop appears in exactly one route, once.
//! - **Anchoring:** every route starts and ends at the depot.
//! - **Capacity:** no vehicle carries more than its capacity.
//! - **Tight packing:** a fleet whose capacities exactly match a partition of
//!   the demand is always solved.
//! - **Objective:** the reported objective matches the route costs.

use std::time::Duration;

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stopwise_core::{SolveRequest, Solver};
use stopwise_solver::test_support::{planar_matrix, route_loads, visited_stops};
use stopwise_solver::{LocalSearchSolver, SolverConfig, vehicle_label};

fn scattered_points(seed: u64, count: usize) -> Vec<(f64, f64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect()
}

/// Demands of `groups` flattened and shuffled, with each group's sum as one
/// vehicle's capacity, so the capacities admit an exact packing.
fn exact_fleet(seed: u64, groups: &[Vec<u64>]) -> (Vec<u64>, Vec<u64>) {
    let mut demands: Vec<u64> = groups.iter().flatten().copied().collect();
    demands.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let capacities = groups.iter().map(|group| group.iter().sum()).collect();
    (demands, capacities)
}

fn quick() -> SolverConfig {
    SolverConfig::capacitated()
        .with_time_limit(Duration::from_millis(50))
        .with_max_guided_rounds(5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn tour_visits_every_stop_once(
        seed in any::<u64>(),
        count in 1_usize..10,
        depot_pick in any::<usize>(),
    ) {
        let matrix = planar_matrix(&scattered_points(seed, count));
        let depot = depot_pick % count;
        let request = SolveRequest::single_vehicle(&matrix, depot).expect("request");
        let response = LocalSearchSolver::with_config(SolverConfig::single_vehicle())
            .solve(&request)
            .expect("solve");
        prop_assert!(response.solution.is_depot_anchored(depot));
        let expected: Vec<usize> = (0..count).filter(|&stop| stop != depot).collect();
        prop_assert_eq!(visited_stops(&response.solution, depot), expected);
        let cost = response.solution.cost_under(&matrix);
        prop_assert!((cost - response.objective).abs() < 1e-6);
    }

    #[test]
    fn fleet_never_exceeds_capacity(
        seed in any::<u64>(),
        demands in prop::collection::vec(1_u64..5, 2..9),
        vehicles in 1_usize..4,
    ) {
        let count = demands.len() + 1;
        let matrix = planar_matrix(&scattered_points(seed, count));
        let mut all_demands = vec![0];
        all_demands.extend(demands.iter().copied());
        let total: u64 = demands.iter().sum();
        let vehicle_count = u64::try_from(vehicles).expect("small fleet");
        let capacity = total.div_ceil(vehicle_count) + 4;
        let capacities = vec![capacity; vehicles];
        let request = SolveRequest::capacitated(
            &matrix,
            0,
            all_demands.clone(),
            vehicles,
            capacities,
        )
        .expect("request");
        let response = LocalSearchSolver::with_config(quick()).solve(&request).expect("solve");
        prop_assert!(!response.is_empty());
        prop_assert!(response.solution.is_depot_anchored(0));
        for (_, load) in route_loads(&response.solution, &all_demands, 0) {
            prop_assert!(load <= capacity);
        }
        let expected: Vec<usize> = (1..count).collect();
        prop_assert_eq!(visited_stops(&response.solution, 0), expected);
    }

    #[test]
    fn exactly_packable_fleet_is_always_solved(
        seed in any::<u64>(),
        groups in prop::collection::vec(prop::collection::vec(1_u64..6, 1..4), 1..4),
    ) {
        let (demands, capacities) = exact_fleet(seed, &groups);
        let count = demands.len() + 1;
        let matrix = planar_matrix(&scattered_points(seed, count));
        let mut all_demands = vec![0];
        all_demands.extend(demands.iter().copied());
        let request = SolveRequest::capacitated(
            &matrix,
            0,
            all_demands.clone(),
            capacities.len(),
            capacities.clone(),
        )
        .expect("request");
        let response = LocalSearchSolver::with_config(quick()).solve(&request).expect("solve");
        prop_assert!(!response.is_empty());
        prop_assert!(response.solution.is_depot_anchored(0));
        for (vehicle, capacity) in capacities.iter().enumerate() {
            let label = vehicle_label(vehicle);
            let load = route_loads(&response.solution, &all_demands, 0)
                .into_iter()
                .find(|(route, _)| *route == label)
                .map_or(0, |(_, load)| load);
            prop_assert!(load <= *capacity);
        }
        let expected: Vec<usize> = (1..count).collect();
        prop_assert_eq!(visited_stops(&response.solution, 0), expected);
    }
}
