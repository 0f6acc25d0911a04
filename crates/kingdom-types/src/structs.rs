//! Runtime records owned by a player: lands and active passive records.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{DevelopmentId, LandId, PassiveId, PhaseId};

/// A land tile with development slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Land {
    /// Land id, unique per player.
    pub id: LandId,
    /// Number of development slots.
    pub slots_max: u32,
    /// Whether the land has been tilled at least once.
    #[serde(default)]
    pub tilled: bool,
    /// Developments built on the land, one per slot.
    #[serde(default)]
    pub developments: Vec<DevelopmentId>,
}

impl Land {
    /// A fresh, untilled land with no developments.
    pub fn new(id: impl Into<LandId>, slots_max: u32) -> Self {
        Self {
            id: id.into(),
            slots_max,
            tilled: false,
            developments: Vec::new(),
        }
    }

    /// Number of slots not yet occupied by a development.
    pub fn free_slots(&self) -> u32 {
        let used = u32::try_from(self.developments.len()).unwrap_or(u32::MAX);
        self.slots_max.saturating_sub(used)
    }
}

/// Attribution and lifetime information of an active passive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PassiveMeta {
    /// Effect or passive that added this passive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Owning entity (`building:<id>`, `tier:<resource>`), removed together.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Phase whose start removes the passive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_on_phase: Option<PhaseId>,
}

/// Public view of an active passive attached to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PassiveRecord {
    /// Passive id.
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
    /// Attribution and lifetime.
    #[serde(default)]
    pub meta: PassiveMeta,
}
