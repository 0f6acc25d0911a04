//! Error types for the kingdom-effects crate.
//!
//! Every variant is a contract violation by content or by the caller. They
//! propagate to the session, which turns them into a failed action. Unmet
//! requirements are not errors; see [`crate::requirements`].

use std::path::PathBuf;

use kingdom_ledger::LedgerError;
use kingdom_types::{ActionId, BuildingId, DevelopmentId, LandId, PassiveId, ResourceId};

/// Errors raised while applying effects or evaluating requirements.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// A ledger operation failed (unknown resource, bound violation, ...).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// No handler is registered for the `(type, method)` pair.
    #[error("unknown effect: {kind}.{method}")]
    UnknownEffect {
        /// Effect family.
        kind: String,
        /// Effect method.
        method: String,
    },

    /// Effect params did not match the handler's expected shape.
    #[error("invalid params for {effect}: {reason}")]
    InvalidParams {
        /// The `type.method` key of the effect.
        effect: String,
        /// What was wrong.
        reason: String,
    },

    /// A percent-based delta evaluated to NaN or infinity.
    #[error("percent delta for {resource} is not finite: {value}")]
    NonFiniteResult {
        /// The resource the delta targets.
        resource: ResourceId,
        /// The computed value.
        value: f64,
    },

    /// A malformed or negative upper-bound increase.
    #[error("invalid upper bound increase for {resource}: {reason}")]
    InvalidBoundIncrease {
        /// The resource whose bound was being raised.
        resource: ResourceId,
        /// What was wrong.
        reason: String,
    },

    /// `land.till` without a `landId`.
    #[error("land.till requires a landId")]
    MissingLandId,

    /// No land with the given id.
    #[error("land not found: {0}")]
    LandNotFound(LandId),

    /// `phase_skip` effect without a source.
    #[error("{effect} requires a non-empty source")]
    MissingSource {
        /// The `type.method` key of the effect.
        effect: String,
    },

    /// The building id is not in the content registry.
    #[error("unknown building: {0}")]
    UnknownBuilding(BuildingId),

    /// The development id is not in the content registry.
    #[error("unknown development: {0}")]
    UnknownDevelopment(DevelopmentId),

    /// The passive id is neither inline nor in the content registry.
    #[error("unknown passive: {0}")]
    UnknownPassive(PassiveId),

    /// Every candidate land is full.
    #[error("no free development slot (land: {})", .land.as_ref().map_or("any", LandId::as_str))]
    NoFreeSlot {
        /// The land that was asked for, if any.
        land: Option<LandId>,
    },

    /// A passive with the same id is already active.
    #[error("passive already active: {0}")]
    DuplicatePassive(PassiveId),

    /// No evaluator for the requirement's `(type, method)` pair.
    #[error("unknown requirement: {kind}.{method}")]
    UnknownRequirement {
        /// Requirement family.
        kind: String,
        /// Requirement method.
        method: String,
    },
}

/// Errors raised while loading and validating static content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The content file could not be read.
    #[error("failed to read content file {path}: {source}")]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The content is not valid JSON for the content schema.
    #[error("failed to parse content: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource or group definitions are inconsistent.
    #[error("invalid resource catalog: {0}")]
    Catalog(#[from] LedgerError),

    /// Two content records of the same kind share an id.
    #[error("duplicate {kind} id: {id}")]
    Duplicate {
        /// Record kind (`building`, `action`, ...).
        kind: &'static str,
        /// The repeated id.
        id: String,
    },

    /// An effect or requirement inside a record is not usable.
    #[error("{owner}: {source}")]
    InvalidRecord {
        /// The record containing the definition, e.g. `action:expand`.
        owner: String,
        /// The underlying problem.
        source: EffectError,
    },

    /// An action cost names an unknown resource.
    #[error("action {action} costs unknown resource {resource}")]
    UnknownCostResource {
        /// The action.
        action: ActionId,
        /// The missing resource.
        resource: ResourceId,
    },
}
