//! Square cost matrices and the builders that fill them.
//!
//! A [`CostMatrix`] is an `n×n` grid of [`CostCell`] values where `n` is the
//! number of stops. Row `i`, column `j` holds the cost of travelling from
//! stop `i` to stop `j`. The diagonal is always zero.
//!
//! Three builders are provided:
//!
//! - [`geodesic_matrix`] computes great-circle distances locally.
//! - [`NetworkMatrixBuilder`] issues one routing query per ordered pair on a
//!   bounded worker pool and repairs failures from the reverse direction.
//! - [`bulk_matrices`] issues a single table query for the whole set.

mod cell;
mod error;
mod geodesic;
mod network;

pub use cell::CostCell;
pub use error::MatrixError;
pub use geodesic::geodesic_matrix;
pub use network::{DEFAULT_CONCURRENCY, NetworkMatrixBuilder, bulk_matrices};

use serde::{Deserialize, Serialize};

/// An `n×n` matrix of travel costs.
///
/// Stored row-major. Serialised as a nested array of numbers and `null`
/// values, one inner array per row.
///
/// # Examples
///
/// ```
/// use stopwise_core::{CostCell, CostMatrix};
///
/// let matrix = CostMatrix::from_rows(vec![
///     vec![0.0, 2.0],
///     vec![3.0, 0.0],
/// ])?;
/// assert_eq!(matrix.get(0, 1), Some(CostCell::Cost(2.0)));
/// assert!(!matrix.is_symmetric());
/// # Ok::<(), stopwise_core::MatrixError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<CostCell>>", into = "Vec<Vec<CostCell>>")]
pub struct CostMatrix {
    size: usize,
    cells: Vec<CostCell>,
}

impl CostMatrix {
    /// Build a matrix of `size` stops, filling every off-diagonal cell with
    /// `cost(i, j)`.
    pub fn from_fn<F>(size: usize, mut cost: F) -> Self
    where
        F: FnMut(usize, usize) -> CostCell,
    {
        let cells = (0..size)
            .flat_map(|i| (0..size).map(move |j| (i, j)))
            .map(|(i, j)| if i == j { CostCell::ZERO } else { cost(i, j) })
            .collect();
        Self { size, cells }
    }

    /// Build a matrix from raw rows.
    ///
    /// Negative, NaN or infinite values become [`CostCell::Unreachable`] and
    /// the diagonal is forced to zero.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::EmptyInput`] for no rows and
    /// [`MatrixError::NotSquare`] when any row length differs from the row
    /// count.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        Self::from_cells(
            rows.into_iter()
                .map(|row| row.into_iter().map(CostCell::from_value).collect())
                .collect(),
        )
    }

    /// Build a matrix from rows of cells. See [`CostMatrix::from_rows`].
    ///
    /// # Errors
    ///
    /// As for [`CostMatrix::from_rows`].
    pub fn from_cells(rows: Vec<Vec<CostCell>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(MatrixError::EmptyInput);
        }
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(MatrixError::NotSquare {
                row,
                expected: size,
                actual: cells.len(),
            });
        }
        let cells = rows
            .into_iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.into_iter().enumerate().map(move |(j, cell)| {
                    if i == j {
                        CostCell::ZERO
                    } else {
                        CostCell::from(Option::<f64>::from(cell))
                    }
                })
            })
            .collect();
        Ok(Self { size, cells })
    }

    /// Number of stops covered by the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The cell for travelling from `from` to `to`, or `None` when either
    /// index is out of range.
    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> Option<CostCell> {
        if from >= self.size || to >= self.size {
            return None;
        }
        self.cells.get(from * self.size + to).copied()
    }

    /// Cost of `from → to` as a float, `+∞` when unreachable or out of range.
    #[must_use]
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.get(from, to).map_or(f64::INFINITY, CostCell::value)
    }

    /// Iterate over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[CostCell]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Whether `m[i][j] == m[j][i]` for every pair.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| ((i + 1)..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Whether any off-diagonal cell is unreachable.
    #[must_use]
    pub fn has_unreachable(&self) -> bool {
        self.cells.iter().any(|cell| !cell.is_reachable())
    }

    /// Sum of consecutive leg costs along `path`.
    ///
    /// Returns `+∞` when a leg is unreachable or an index is out of range.
    /// Paths shorter than two stops cost zero.
    #[must_use]
    pub fn path_cost(&self, path: &[usize]) -> f64 {
        path.windows(2)
            .map(|leg| match leg {
                [from, to] => self.cost(*from, *to),
                _ => 0.0,
            })
            .sum()
    }
}

impl TryFrom<Vec<Vec<CostCell>>> for CostMatrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<CostCell>>) -> Result<Self, Self::Error> {
        Self::from_cells(rows)
    }
}

impl From<CostMatrix> for Vec<Vec<CostCell>> {
    fn from(matrix: CostMatrix) -> Self {
        matrix.rows().map(<[CostCell]>::to_vec).collect()
    }
}
