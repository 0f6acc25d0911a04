//! Immutable snapshots handed to the transport layer and the UI.
//!
//! Every snapshot is plain owned data: nothing in here borrows from or
//! points back into live engine state, so consumers may keep and compare
//! snapshots across time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::effects::RequirementFailure;
use crate::enums::GroupRelation;
use crate::ids::{ActionId, BuildingId, GroupId, PhaseId, PlayerId, ResourceId, SessionId, SourceId, StepId};
use crate::resources::{ResourceBounds, ResourceGain};
use crate::structs::{Land, PassiveRecord};

/// Group layout as exposed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GroupSnapshot {
    /// Group id.
    pub id: GroupId,
    /// Id of the derived parent resource.
    pub parent_id: ResourceId,
    /// Relation used for the rollup.
    pub relation: GroupRelation,
    /// Children in display order.
    pub child_ids: Vec<ResourceId>,
}

/// Resource state of one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResourceSnapshot {
    /// Current amounts, parents included.
    pub amounts: BTreeMap<ResourceId, f64>,
    /// Current bounds of every bounded resource.
    pub bounds: BTreeMap<ResourceId, ResourceBounds>,
    /// Deterministic display order without duplicates.
    pub ordered: Vec<ResourceId>,
    /// Group layout.
    pub groups: Vec<GroupSnapshot>,
}

/// Active skip sources of one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SkipSnapshot {
    /// Skipped phases and the sources skipping them.
    pub phases: BTreeMap<PhaseId, Vec<SourceId>>,
    /// Skipped steps per phase and the sources skipping them.
    pub steps: BTreeMap<PhaseId, BTreeMap<StepId, Vec<SourceId>>>,
}

/// Everything the UI needs about one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerSnapshot {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Resource state.
    pub resources: ResourceSnapshot,
    /// Owned lands.
    pub lands: Vec<Land>,
    /// Owned buildings.
    pub buildings: Vec<BuildingId>,
    /// Active passives.
    pub passives: Vec<PassiveRecord>,
    /// Skipped phases and steps.
    pub skips: SkipSnapshot,
    /// Active tier id per tier-tracked resource.
    pub tiers: BTreeMap<ResourceId, String>,
}

/// Turn position of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameProgress {
    /// Turn number, starting at 1.
    pub turn: u32,
    /// Player whose turn it is.
    pub active_player: PlayerId,
    /// Current phase.
    pub phase: PhaseId,
    /// Current step within the phase.
    pub step: StepId,
    /// Whether actions may be performed in the current phase.
    pub action_phase: bool,
}

/// Snapshot of a whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SessionSnapshot {
    /// Session id.
    pub session_id: SessionId,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Turn position.
    pub game: GameProgress,
    /// Players in turn order.
    pub players: Vec<PlayerSnapshot>,
    /// Most recent resource changes, newest last.
    pub recent_gains: Vec<ResourceGain>,
}

/// Result of asking the session to perform an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum ActionOutcome {
    /// The action ran; lists the resource changes it caused.
    #[serde(rename_all = "camelCase")]
    Completed {
        /// The action performed.
        action_id: ActionId,
        /// Resource changes caused by costs and effects.
        gains: Vec<ResourceGain>,
    },
    /// Requirements were not met; nothing changed.
    #[serde(rename_all = "camelCase")]
    Rejected {
        /// The action attempted.
        action_id: ActionId,
        /// Every unmet requirement.
        failures: Vec<RequirementFailure>,
    },
}

impl ActionOutcome {
    /// Whether the action ran.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The first unmet requirement, if the action was rejected.
    pub fn first_failure(&self) -> Option<&RequirementFailure> {
        match self {
            Self::Completed { .. } => None,
            Self::Rejected { failures, .. } => failures.first(),
        }
    }
}
