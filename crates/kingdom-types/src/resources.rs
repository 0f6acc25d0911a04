//! ResourceV2 definitions: resources, bounds, groups, tier tracks and the
//! gain records emitted when values change.
//!
//! Definitions are created from static content at load time and never change
//! during a session. Only the per-player amounts and bounds move.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::content::PassiveDefinition;
use crate::enums::GroupRelation;
use crate::ids::{GroupId, PlayerId, ResourceId};

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Optional lower and upper bounds of a resource amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResourceBounds {
    /// Smallest permitted amount, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    /// Largest permitted amount, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

impl ResourceBounds {
    /// Bounds with neither side set.
    pub const UNBOUNDED: Self = Self {
        lower_bound: None,
        upper_bound: None,
    };

    /// Build bounds from both optional sides.
    pub const fn new(lower_bound: Option<f64>, upper_bound: Option<f64>) -> Self {
        Self {
            lower_bound,
            upper_bound,
        }
    }

    /// Whether neither side is set.
    pub const fn is_unbounded(&self) -> bool {
        self.lower_bound.is_none() && self.upper_bound.is_none()
    }

    /// Whether `value` lies within the bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound.is_none_or(|lower| value >= lower)
            && self.upper_bound.is_none_or(|upper| value <= upper)
    }

    /// Clamp `value` into the bounds. The lower bound wins if the two cross.
    pub fn clamp(&self, value: f64) -> f64 {
        let mut clamped = value;
        if let Some(upper) = self.upper_bound {
            clamped = clamped.min(upper);
        }
        if let Some(lower) = self.lower_bound {
            clamped = clamped.max(lower);
        }
        clamped
    }
}

// ---------------------------------------------------------------------------
// Resource definitions
// ---------------------------------------------------------------------------

/// A per-action cost automatically charged for every action a player takes.
///
/// Used for action points: the resource carrying this marker is deducted by
/// `amount` whenever any action executes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GlobalActionCost {
    /// Amount deducted per action.
    pub amount: f64,
}

/// One tier of a tier track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TierDefinition {
    /// Tier identifier, unique within the track.
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Inclusive lower edge of the tier.
    pub min: f64,
    /// Inclusive upper edge of the tier, open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Passive granted while the resource sits in this tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<PassiveDefinition>,
}

impl TierDefinition {
    /// Whether `amount` falls inside this tier.
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && self.max.is_none_or(|max| amount <= max)
    }
}

/// Ordered tiers attached to a resource (for example happiness moods).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TierTrack {
    /// Tiers in ascending order. The first tier containing the amount wins.
    pub tiers: Vec<TierDefinition>,
}

impl TierTrack {
    /// Return the tier containing `amount`, if any.
    pub fn tier_for(&self, amount: f64) -> Option<&TierDefinition> {
        self.tiers.iter().find(|tier| tier.contains(amount))
    }
}

/// Static definition of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResourceDefinition {
    /// Unique resource id.
    pub id: ResourceId,
    /// Display label.
    #[serde(alias = "displayLabel")]
    pub label: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Longer description for tooltips.
    #[serde(default)]
    pub description: String,
    /// Sort key used when building the ordered resource list.
    #[serde(default)]
    pub order: i32,
    /// Default lower bound seeded into every player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    /// Default upper bound seeded into every player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
    /// Whether the UI renders the amount as a percentage.
    #[serde(default)]
    pub display_as_percent: bool,
    /// Group this resource belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Cost charged for every action, if this resource is an action currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_action_cost: Option<GlobalActionCost>,
    /// Tier track whose tiers grant passives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_track: Option<TierTrack>,
}

impl ResourceDefinition {
    /// Minimal definition with only an id and label; handy for tests and
    /// for synthesising group parents.
    pub fn new(id: impl Into<ResourceId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: String::new(),
            description: String::new(),
            order: 0,
            lower_bound: None,
            upper_bound: None,
            display_as_percent: false,
            group_id: None,
            global_action_cost: None,
            tier_track: None,
        }
    }

    /// The default bounds declared by this definition.
    pub const fn default_bounds(&self) -> ResourceBounds {
        ResourceBounds::new(self.lower_bound, self.upper_bound)
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Display information for a group's derived parent resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ParentDisplay {
    /// Resource id of the rollup value.
    pub id: ResourceId,
    /// Display label.
    pub label: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Longer description for tooltips.
    #[serde(default)]
    pub description: String,
    /// Whether the UI renders the rollup as a percentage.
    #[serde(default)]
    pub display_as_percent: bool,
}

/// A set of child resources whose values roll up into a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResourceGroupDefinition {
    /// Unique group id.
    pub id: GroupId,
    /// Sort key relative to other top-level entries.
    #[serde(default)]
    pub order: i32,
    /// The derived parent resource.
    #[serde(alias = "parentDisplay")]
    pub parent: ParentDisplay,
    /// How the parent value is derived.
    #[serde(default)]
    pub relation: GroupRelation,
    /// Explicitly listed children. Resources may also join via `groupId`.
    #[serde(default)]
    pub child_ids: Vec<ResourceId>,
}

// ---------------------------------------------------------------------------
// Gains
// ---------------------------------------------------------------------------

/// A recorded change in a resource amount, kept for the recent-gain feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResourceGain {
    /// Player whose resource changed, once attributed by the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    /// The resource that changed.
    pub resource_id: ResourceId,
    /// Signed change in amount.
    pub amount: f64,
}

/// Per-resource amounts keyed by resource id.
pub type ResourceAmounts = BTreeMap<ResourceId, f64>;
