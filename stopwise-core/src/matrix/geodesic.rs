//! Great-circle distance matrices.

use super::{CostCell, CostMatrix, MatrixError};
use crate::Coordinate;

/// Build a symmetric matrix of geodesic surface distances in metres.
///
/// Each unordered pair is computed once and mirrored, so the result is
/// exactly symmetric. No network access is needed and every cell is
/// reachable.
///
/// # Errors
///
/// Returns [`MatrixError::EmptyInput`] when `coordinates` is empty.
///
/// # Examples
///
/// ```
/// use stopwise_core::{Coordinate, geodesic_matrix};
///
/// let stops = [Coordinate::new(0.0, 0.0)?, Coordinate::new(0.0, 1.0)?];
/// let matrix = geodesic_matrix(&stops)?;
/// assert!(matrix.is_symmetric());
/// assert!((matrix.cost(0, 1) - 111_319.49).abs() < 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn geodesic_matrix(coordinates: &[Coordinate]) -> Result<CostMatrix, MatrixError> {
    if coordinates.is_empty() {
        return Err(MatrixError::EmptyInput);
    }
    let n = coordinates.len();
    let mut upper = vec![0.0_f64; n * n];
    for (i, from) in coordinates.iter().enumerate() {
        for (j, to) in coordinates.iter().enumerate().skip(i + 1) {
            if let Some(slot) = upper.get_mut(i * n + j) {
                *slot = from.geodesic_distance(*to);
            }
        }
    }
    Ok(CostMatrix::from_fn(n, |i, j| {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        upper
            .get(lo * n + hi)
            .copied()
            .map_or(CostCell::Unreachable, CostCell::from_value)
    }))
}
