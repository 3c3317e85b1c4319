//! Two-state matrix cells.

use serde::{Deserialize, Serialize};

/// A single cost between two stops.
///
/// A cell either holds a computed, non-negative cost or the
/// [`CostCell::Unreachable`] sentinel. Downstream cost computations treat the
/// sentinel as `+∞`. Persisted as a JSON number or `null`.
///
/// # Examples
///
/// ```
/// use stopwise_core::CostCell;
///
/// assert_eq!(CostCell::from_value(12.5), CostCell::Cost(12.5));
/// assert_eq!(CostCell::from_value(-1.0), CostCell::Unreachable);
/// assert_eq!(CostCell::Unreachable.value(), f64::INFINITY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum CostCell {
    /// A computed cost.
    Cost(f64),
    /// No cost could be obtained in either direction.
    Unreachable,
}

impl CostCell {
    /// Zero-cost cell, used on the diagonal.
    pub const ZERO: Self = Self::Cost(0.0);

    /// Wrap a raw value, mapping negative, NaN or infinite inputs to
    /// [`CostCell::Unreachable`].
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Self::Cost(value)
        } else {
            Self::Unreachable
        }
    }

    /// The cost, with the sentinel mapped to `f64::INFINITY`.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Cost(value) => value,
            Self::Unreachable => f64::INFINITY,
        }
    }

    /// Whether the cell holds a computed cost.
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Cost(_))
    }
}

impl From<Option<f64>> for CostCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unreachable, Self::from_value)
    }
}

impl From<CostCell> for Option<f64> {
    fn from(cell: CostCell) -> Self {
        match cell {
            CostCell::Cost(value) => Some(value),
            CostCell::Unreachable => None,
        }
    }
}
