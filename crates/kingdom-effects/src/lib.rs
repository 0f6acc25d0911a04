//! Effect interpreter, requirement evaluator and per-player rule state for
//! the Kingdom Builder rules engine.
//!
//! This crate is the logic layer between `kingdom-types` (data) and
//! `kingdom-core` (session orchestration). Everything here is synchronous
//! and runs to completion inside a single session operation.
//!
//! # Modules
//!
//! - [`registry`] -- The `(type, method)` dispatch table ([`EffectRegistry`])
//! - [`handlers`] -- Built-in effect handlers
//! - [`context`] -- The player-scoped execution context ([`EffectContext`])
//! - [`requirements`] -- Requirement evaluation ([`RequirementEvaluator`])
//! - [`skip`] -- Phase and step suppression ([`SkipRegistry`])
//! - [`passives`] -- Active passives and the [`PassiveGrantor`] capability
//! - [`tiers`] -- Tier-track passive swapping
//! - [`content`] -- Static content loading and validation ([`ContentRegistry`])
//! - [`player`] -- Per-player state ([`PlayerState`])
//! - [`config`] -- Rule parameters ([`RulesConfig`])
//! - [`error`] -- Error types ([`EffectError`], [`ContentError`])

pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod handlers;
pub mod passives;
pub mod player;
pub mod registry;
pub mod requirements;
pub mod skip;
pub mod tiers;

// Re-export primary types at crate root for convenience.
pub use config::RulesConfig;
pub use content::{ContentFile, ContentRegistry};
pub use context::EffectContext;
pub use error::{ContentError, EffectError};
pub use handlers::building::{add_building, remove_building};
pub use handlers::land::till_land;
pub use handlers::resource::resolve_percent_delta;
pub use passives::{ActivePassive, PassiveGrantor, PassiveRegistry, add_passive, remove_passive};
pub use player::PlayerState;
pub use registry::{EffectHandler, EffectRegistry};
pub use requirements::{EvaluationMode, RequirementEvaluator, evaluate_requirements};
pub use skip::SkipRegistry;
pub use tiers::sync_tiers;
