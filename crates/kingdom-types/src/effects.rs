//! Declarative effect and requirement definitions.
//!
//! Both are data-only `{type, method, params}` instructions authored in the
//! content files. The effect interpreter and the requirement evaluator in
//! `kingdom-effects` dispatch on the `(type, method)` pair and parse `params`
//! into typed structs at that boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::enums::{CompareOperator, Reconciliation};
use crate::ids::{BuildingId, DevelopmentId, ResourceId};

fn empty_params() -> Value {
    Value::Object(serde_json::Map::new())
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Metadata attached to an effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EffectMeta {
    /// Bound handling for resource mutations. Absent means reject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<Reconciliation>,
    /// Attribution of the effect (passive id, building id, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A single declarative effect.
///
/// Treated as read-only during interpretation; applying an effect never
/// mutates the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EffectDef {
    /// Effect family, e.g. `resource`, `land`, `phase_skip`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Operation within the family, e.g. `add`, `till`.
    pub method: String,
    /// Handler-specific parameters.
    #[serde(default = "empty_params")]
    pub params: Value,
    /// Optional metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EffectMeta>,
    /// Repeat count multiplied into the caller's `mult`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u32>,
}

impl EffectDef {
    /// Create an effect with empty params.
    pub fn new(kind: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            method: method.into(),
            params: empty_params(),
            meta: None,
            repeat: None,
        }
    }

    /// Return a copy with the given params.
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Return a copy with the given metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: EffectMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Return a copy with `reconciliation: clamp` metadata.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        let mut meta = self.meta.take().unwrap_or_default();
        meta.reconciliation = Some(Reconciliation::Clamp);
        self.meta = Some(meta);
        self
    }

    /// Return a copy with a repeat count.
    #[must_use]
    pub const fn repeated(mut self, repeat: u32) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// The `type.method` key used in logs and error messages.
    pub fn key(&self) -> String {
        format!("{}.{}", self.kind, self.method)
    }

    /// The reconciliation policy requested by the metadata.
    pub fn reconciliation(&self) -> Reconciliation {
        self.meta
            .as_ref()
            .and_then(|meta| meta.reconciliation)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// A declarative requirement node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RequirementDef {
    /// Requirement family; `evaluator` is the only built-in one.
    #[serde(rename = "type")]
    pub kind: String,
    /// Operation within the family; `compare` is the only built-in one.
    pub method: String,
    /// Requirement-specific parameters.
    #[serde(default = "empty_params")]
    pub params: Value,
}

impl RequirementDef {
    /// Build an `evaluator.compare` requirement.
    pub fn compare(left: Operand, operator: CompareOperator, right: Operand) -> Self {
        let params = CompareParams {
            left,
            right,
            operator,
        };
        Self {
            kind: "evaluator".to_owned(),
            method: "compare".to_owned(),
            params: serde_json::to_value(params).unwrap_or_else(|_| empty_params()),
        }
    }
}

/// A value source that an evaluator can resolve to a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "params", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum EvaluatorOperand {
    /// Current amount of a resource.
    Resource {
        /// The resource to read.
        key: ResourceId,
    },
    /// Current amount of a stat-like resource (`maxPopulation`, `armyStrength`).
    Stat {
        /// The stat to read.
        key: ResourceId,
    },
    /// Population count, total when no role is given.
    Population {
        /// Population role to count; absent means every role.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<ResourceId>,
    },
    /// 1 when the player owns the building, otherwise 0.
    Building {
        /// The building to look for.
        id: BuildingId,
    },
    /// Number of lands the player owns.
    Land {},
    /// Number of developments with this id across the player's lands.
    Development {
        /// The development to count.
        id: DevelopmentId,
    },
}

/// One side of a comparison: a literal or an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum Operand {
    /// A literal number.
    Literal(f64),
    /// A nested evaluator.
    Evaluator(EvaluatorOperand),
}

/// Parameters of `evaluator.compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CompareParams {
    /// Left operand.
    pub left: Operand,
    /// Right operand.
    pub right: Operand,
    /// Comparison applied as `left <operator> right`.
    pub operator: CompareOperator,
}

/// Resolved operand values of a failed comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FailureDetails {
    /// Resolved left value.
    pub left: f64,
    /// Resolved right value.
    pub right: f64,
}

/// Structured description of an unmet requirement.
///
/// Returned as data, never raised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RequirementFailure {
    /// The requirement that failed.
    pub requirement: RequirementDef,
    /// Resolved operand values.
    pub details: FailureDetails,
    /// Message suitable for display.
    pub message: String,
}
