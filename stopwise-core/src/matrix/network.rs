//! Road-network matrices built from routing queries.
//!
//! [`NetworkMatrixBuilder`] fans one point-to-point query per ordered pair
//! out over a bounded rayon pool. Results come back to the calling thread,
//! which owns the only writable grid. Failed cells are repaired from the
//! reverse direction or marked unreachable. [`bulk_matrices`] asks for the
//! whole table in a single request and fails as a unit.

use log::{debug, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use super::{CostCell, CostMatrix, MatrixError};
use crate::{Coordinate, CostQueryClient, CostTables};

/// Default number of in-flight pairwise queries.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Builds a [`CostMatrix`] from concurrent pairwise route queries.
///
/// # Examples
///
/// ```
/// use stopwise_core::{Coordinate, CostCell, NetworkMatrixBuilder};
/// use stopwise_core::test_support::ScriptedQueryClient;
///
/// let stops = vec![Coordinate::new(0.0, 0.0)?, Coordinate::new(0.0, 1.0)?];
/// let client = ScriptedQueryClient::new(stops.clone(), vec![vec![0.0, 5.0], vec![7.0, 0.0]])
///     .with_failing_pair(1, 0);
/// let matrix = NetworkMatrixBuilder::new().with_concurrency(2).build(&client, &stops)?;
/// // The failed 1 -> 0 query is repaired from 0 -> 1.
/// assert_eq!(matrix.get(1, 0), Some(CostCell::Cost(5.0)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkMatrixBuilder {
    concurrency: usize,
}

impl Default for NetworkMatrixBuilder {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl NetworkMatrixBuilder {
    /// A builder with [`DEFAULT_CONCURRENCY`] workers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count. Zero is raised to one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Configured worker count.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Query every ordered pair `(i, j)`, `i != j`, and assemble the matrix.
    ///
    /// A failed query never aborts the batch. After all queries finish, a
    /// failed cell `(i, j)` takes the value of `(j, i)` when that direction
    /// succeeded, otherwise it becomes [`CostCell::Unreachable`].
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::EmptyInput`] for no coordinates and
    /// [`MatrixError::WorkerPool`] when the pool cannot start.
    pub fn build<C>(
        &self,
        client: &C,
        coordinates: &[Coordinate],
    ) -> Result<CostMatrix, MatrixError>
    where
        C: CostQueryClient + ?Sized,
    {
        if coordinates.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        let n = coordinates.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();
        debug!(
            "querying {} ordered pairs with {} workers",
            pairs.len(),
            self.concurrency
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()
            .map_err(|err| MatrixError::WorkerPool {
                message: err.to_string(),
            })?;
        let outcomes: Vec<((usize, usize), Option<f64>)> = pool.install(|| {
            pairs
                .par_iter()
                .map(|&pair| (pair, query_pair(client, coordinates, pair)))
                .collect()
        });

        let mut resolved = vec![None; n * n];
        for ((i, j), outcome) in outcomes {
            if let Some(slot) = resolved.get_mut(i * n + j) {
                *slot = outcome;
            }
        }
        Ok(repair(n, &resolved))
    }
}

fn query_pair<C>(client: &C, coordinates: &[Coordinate], (i, j): (usize, usize)) -> Option<f64>
where
    C: CostQueryClient + ?Sized,
{
    let (Some(from), Some(to)) = (coordinates.get(i), coordinates.get(j)) else {
        return None;
    };
    match client.route(&[*from, *to]) {
        Ok(route) if route.distance_m.is_finite() && route.distance_m >= 0.0 => {
            Some(route.distance_m)
        }
        Ok(route) => {
            warn!("route query {i} -> {j} returned invalid distance {}", route.distance_m);
            None
        }
        Err(err) => {
            warn!("route query {i} -> {j} failed: {err}");
            None
        }
    }
}

fn repair(n: usize, resolved: &[Option<f64>]) -> CostMatrix {
    let cell = |i: usize, j: usize| resolved.get(i * n + j).copied().flatten();
    CostMatrix::from_fn(n, |i, j| match (cell(i, j), cell(j, i)) {
        (Some(value), _) => CostCell::Cost(value),
        (None, Some(reverse)) => {
            debug!("repaired cell {i} -> {j} from reverse direction");
            CostCell::Cost(reverse)
        }
        (None, None) => {
            warn!("no route between {i} and {j} in either direction; marking unreachable");
            CostCell::Unreachable
        }
    })
}

/// Fetch distance and duration tables in one bulk request.
///
/// # Errors
///
/// Returns [`MatrixError::EmptyInput`] for no coordinates,
/// [`MatrixError::Bulk`] when the request fails and
/// [`MatrixError::DimensionMismatch`] when a returned table does not cover
/// every coordinate. No partial result is produced.
pub fn bulk_matrices<C>(client: &C, coordinates: &[Coordinate]) -> Result<CostTables, MatrixError>
where
    C: CostQueryClient + ?Sized,
{
    if coordinates.is_empty() {
        return Err(MatrixError::EmptyInput);
    }
    let tables = client.table(coordinates).map_err(MatrixError::Bulk)?;
    for size in [tables.distances.size(), tables.durations.size()] {
        if size != coordinates.len() {
            return Err(MatrixError::DimensionMismatch {
                expected: coordinates.len(),
                actual: size,
            });
        }
    }
    debug!("bulk table covered {} stops", coordinates.len());
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryError;
    use crate::test_support::ScriptedQueryClient;
    use rstest::{fixture, rstest};

    #[fixture]
    fn stops() -> Vec<Coordinate> {
        [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
            .into_iter()
            .map(|(lat, lon)| Coordinate::new(lat, lon).expect("valid coordinate"))
            .collect()
    }

    #[fixture]
    fn client(stops: Vec<Coordinate>) -> ScriptedQueryClient {
        ScriptedQueryClient::new(
            stops,
            vec![
                vec![0.0, 10.0, 20.0],
                vec![11.0, 0.0, 30.0],
                vec![21.0, 31.0, 0.0],
            ],
        )
    }

    #[rstest]
    fn all_pairs_succeed(stops: Vec<Coordinate>, client: ScriptedQueryClient) {
        let matrix = NetworkMatrixBuilder::new()
            .build(&client, &stops)
            .expect("matrix");
        assert_eq!(matrix.get(0, 1), Some(CostCell::Cost(10.0)));
        assert_eq!(matrix.get(1, 0), Some(CostCell::Cost(11.0)));
        assert_eq!(matrix.get(2, 2), Some(CostCell::ZERO));
        assert_eq!(client.route_calls(), 6, "diagonal must never be queried");
    }

    #[rstest]
    fn one_failed_direction_copies_reverse(stops: Vec<Coordinate>, client: ScriptedQueryClient) {
        let client = client.with_failing_pair(2, 0);
        let matrix = NetworkMatrixBuilder::new()
            .with_concurrency(3)
            .build(&client, &stops)
            .expect("matrix");
        assert_eq!(matrix.get(2, 0), Some(CostCell::Cost(20.0)));
        assert_eq!(matrix.get(0, 2), Some(CostCell::Cost(20.0)));
    }

    #[rstest]
    fn both_failed_directions_are_unreachable(
        stops: Vec<Coordinate>,
        client: ScriptedQueryClient,
    ) {
        let client = client.with_failing_pair(0, 1).with_failing_pair(1, 0);
        let matrix = NetworkMatrixBuilder::new()
            .build(&client, &stops)
            .expect("matrix");
        assert_eq!(matrix.get(0, 1), Some(CostCell::Unreachable));
        assert_eq!(matrix.get(1, 0), Some(CostCell::Unreachable));
        assert_eq!(matrix.get(1, 2), Some(CostCell::Cost(30.0)));
    }

    #[rstest]
    fn zero_concurrency_is_raised_to_one() {
        assert_eq!(NetworkMatrixBuilder::new().with_concurrency(0).concurrency(), 1);
    }

    #[rstest]
    fn network_mode_rejects_empty_input(client: ScriptedQueryClient) {
        let err = NetworkMatrixBuilder::new()
            .build(&client, &[])
            .expect_err("no stops");
        assert_eq!(err, MatrixError::EmptyInput);
    }

    #[rstest]
    fn bulk_failure_produces_no_matrix(stops: Vec<Coordinate>, client: ScriptedQueryClient) {
        let failure = QueryError::ServiceError {
            code: "NoTable".into(),
            message: "table failed".into(),
        };
        let client = client.with_table_error(failure.clone());
        let err = bulk_matrices(&client, &stops).expect_err("bulk failure");
        assert_eq!(err, MatrixError::Bulk(failure));
    }

    #[rstest]
    fn bulk_returns_distances_and_durations(stops: Vec<Coordinate>, client: ScriptedQueryClient) {
        let tables = bulk_matrices(&client, &stops).expect("tables");
        assert_eq!(tables.distances.get(0, 2), Some(CostCell::Cost(20.0)));
        assert_eq!(tables.durations.get(0, 2), Some(CostCell::Cost(2.0)));
    }
}
