//! Static content definitions: passives, buildings, developments, actions.
//!
//! Content is authored as JSON and shared with the front end, so every
//! record uses camelCase field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::effects::{EffectDef, RequirementDef};
use crate::ids::{ActionId, BuildingId, DevelopmentId, PassiveId, PhaseId, ResourceId};

/// A passive bundle: effects applied while active plus phase triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PassiveDefinition {
    /// Unique passive id.
    pub id: PassiveId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Free-form detail text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Effects applied when the passive is added and reverted on removal.
    #[serde(default)]
    pub effects: Vec<EffectDef>,
    /// Effects run each time the owner enters the keyed phase.
    #[serde(default)]
    pub on_phase: BTreeMap<PhaseId, Vec<EffectDef>>,
    /// Phase whose start removes this passive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_on_phase: Option<PhaseId>,
}

impl PassiveDefinition {
    /// Create an empty passive with just an id.
    pub fn new(id: impl Into<PassiveId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            icon: None,
            detail: None,
            effects: Vec::new(),
            on_phase: BTreeMap::new(),
            remove_on_phase: None,
        }
    }
}

/// A building a player can own at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BuildingDefinition {
    /// Unique building id.
    pub id: BuildingId,
    /// Display name.
    pub name: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Passives granted when the building is added.
    #[serde(default)]
    pub passives: Vec<PassiveDefinition>,
}

/// A development that occupies one slot on a land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DevelopmentDefinition {
    /// Unique development id.
    pub id: DevelopmentId,
    /// Display name.
    pub name: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Effects applied when built and reverted when removed.
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// An action a player can take during an action phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActionDefinition {
    /// Unique action id.
    pub id: ActionId,
    /// Display name.
    pub name: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Resource costs paid before the effects run.
    #[serde(default)]
    pub costs: BTreeMap<ResourceId, f64>,
    /// Preconditions checked before anything is paid.
    #[serde(default)]
    pub requirements: Vec<RequirementDef>,
    /// Effects applied in order.
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}
