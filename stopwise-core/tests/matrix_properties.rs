//! Property tests for matrix construction and metrics.

use proptest::prelude::*;
use stopwise_core::test_support::ScriptedQueryClient;
use stopwise_core::{
    Coordinate, CostCell, NetworkMatrixBuilder, RoutingProblem, Solution, geodesic_matrix,
};

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (-89.0_f64..89.0, -179.0_f64..179.0)
        .prop_map(|(lat, lon)| Coordinate::new(lat, lon).expect("in-range coordinate"))
}

fn distinct_stops(max: usize) -> impl Strategy<Value = Vec<Coordinate>> {
    prop::collection::vec(coordinate(), 1..max).prop_map(|mut stops| {
        stops.dedup_by(|a, b| a == b);
        stops
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn geodesic_matrix_is_symmetric_with_zero_diagonal(stops in prop::collection::vec(coordinate(), 1..12)) {
        let matrix = geodesic_matrix(&stops).expect("non-empty stops");
        prop_assert!(matrix.is_symmetric());
        for i in 0..stops.len() {
            prop_assert_eq!(matrix.get(i, i), Some(CostCell::ZERO));
        }
        prop_assert!(!matrix.has_unreachable());
    }

    #[test]
    fn single_failed_direction_is_repaired_from_reverse(
        stops in distinct_stops(6),
        seed in any::<u64>(),
    ) {
        let n = stops.len();
        prop_assume!(n >= 2);
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { (i * 10 + j + 1) as f64 }).collect())
            .collect();
        let from = usize::try_from(seed % n as u64).expect("index fits");
        let to = (from + 1) % n;
        let client = ScriptedQueryClient::new(stops.clone(), rows).with_failing_pair(from, to);
        let matrix = NetworkMatrixBuilder::new()
            .with_concurrency(3)
            .build(&client, &stops)
            .expect("matrix");
        prop_assert_eq!(matrix.get(from, to), matrix.get(to, from));
        prop_assert!(!matrix.has_unreachable());
    }

    #[test]
    fn baseline_compared_with_itself_improves_by_zero(
        stops in distinct_stops(8),
    ) {
        let n = stops.len();
        let mut problem = RoutingProblem::new("prop");
        problem.set_coordinates(stops.clone()).expect("coordinates");
        problem
            .add_matrix("geodesic", geodesic_matrix(&stops).expect("matrix"))
            .expect("register matrix");
        let mut tour: Vec<usize> = (0..n).collect();
        tour.push(0);
        let mut solution = Solution::new();
        solution.insert_route("tsp_1", tour);
        problem.add_solution("base", solution).expect("register solution");
        for record in problem.metrics(Some("base")).expect("metrics") {
            prop_assert_eq!(record.improvement, 0.0);
        }
    }
}
