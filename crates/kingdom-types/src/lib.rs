//! Shared type definitions for the Kingdom Builder rules engine.
//!
//! This crate is the single source of truth for all types used across the
//! Kingdom workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the React front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`enums`] -- Rounding, reconciliation, group relations, comparison operators
//! - [`resources`] -- ResourceV2 definitions, bounds, groups, tier tracks
//! - [`effects`] -- Declarative effect and requirement definitions
//! - [`content`] -- Buildings, developments, actions and passive definitions
//! - [`structs`] -- Runtime records (lands, passive records)
//! - [`snapshot`] -- Immutable snapshots and action outcomes

pub mod content;
pub mod effects;
pub mod enums;
pub mod ids;
pub mod resources;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use content::{ActionDefinition, BuildingDefinition, DevelopmentDefinition, PassiveDefinition};
pub use effects::{
    CompareParams, EffectDef, EffectMeta, EvaluatorOperand, FailureDetails, Operand,
    RequirementDef, RequirementFailure,
};
pub use enums::{CompareOperator, DeltaKind, GroupRelation, Reconciliation, RoundingMode};
pub use ids::{
    ActionId, BuildingId, DevelopmentId, GroupId, LandId, PassiveId, PhaseId, PlayerId,
    ResourceId, SessionId, SourceId, StepId,
};
pub use resources::{
    GlobalActionCost, ParentDisplay, ResourceAmounts, ResourceBounds, ResourceDefinition,
    ResourceGain, ResourceGroupDefinition, TierDefinition, TierTrack,
};
pub use snapshot::{
    ActionOutcome, GameProgress, GroupSnapshot, PlayerSnapshot, ResourceSnapshot,
    SessionSnapshot, SkipSnapshot,
};
pub use structs::{Land, PassiveMeta, PassiveRecord};
