//! Enumeration types shared by the ledger, the effect interpreter and the
//! requirement evaluator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// How a fractional resource delta is turned into a whole number.
///
/// The rules are deliberately asymmetric around zero; see
/// `kingdom_ledger::rounding::round` for the exact semantics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum RoundingMode {
    /// Ceiling for non-negative values, floor for negative values.
    Up,
    /// Floor for non-negative values, ceiling for negative values.
    Down,
    /// Floor, then add one when the fractional remainder is at least 0.5.
    #[default]
    Nearest,
}

// ---------------------------------------------------------------------------
// Bound reconciliation
// ---------------------------------------------------------------------------

/// What to do when a mutation would leave a resource outside its bounds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Reconciliation {
    /// Silently clamp the value into `[lowerBound, upperBound]`.
    Clamp,
    /// Refuse the mutation with a bound violation error.
    #[default]
    Reject,
}

// ---------------------------------------------------------------------------
// Resource groups
// ---------------------------------------------------------------------------

/// How a group's parent value is derived from its children.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum GroupRelation {
    /// The parent equals the sum of every child amount.
    #[default]
    SumOfAll,
}

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

/// Direction of a resource delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DeltaKind {
    /// Increase the stored value.
    Add,
    /// Decrease the stored value.
    Remove,
}

// ---------------------------------------------------------------------------
// Requirement comparison
// ---------------------------------------------------------------------------

/// Comparison operator used by `evaluator.compare` requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CompareOperator {
    /// `left < right`
    Lt,
    /// `left <= right`
    Lte,
    /// `left > right`
    Gt,
    /// `left >= right`
    Gte,
    /// `left == right`
    Eq,
    /// `left != right`
    Ne,
}

impl CompareOperator {
    /// Apply the operator to two resolved operand values.
    pub fn holds(self, left: f64, right: f64) -> bool {
        // Adding 0.0 folds -0.0 into 0.0, which total_cmp would order apart.
        let ordering = (left + 0.0).total_cmp(&(right + 0.0));
        match self {
            Self::Lt => ordering.is_lt(),
            Self::Lte => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Gte => ordering.is_ge(),
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
        }
    }

    /// Human-readable phrase used in requirement failure messages.
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::Lt => "less than",
            Self::Lte => "at most",
            Self::Gt => "greater than",
            Self::Gte => "at least",
            Self::Eq => "exactly",
            Self::Ne => "different from",
        }
    }
}
