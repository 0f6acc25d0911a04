//! Global rule parameters consulted by effect handlers and evaluators.
//!
//! These values correspond to the `rules` section of `kingdom-config.yaml`.
//! The [`RulesConfig`] struct bundles every tunable so that callers
//! (session, tests) can override defaults.

use kingdom_types::ResourceId;
use serde::{Deserialize, Serialize};

/// Rule parameters shared by all players of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Hard cap on development slots per land (default: 2).
    ///
    /// `land.till` never raises `slots_max` beyond this value.
    #[serde(default = "default_max_slots_per_land")]
    pub max_slots_per_land: u32,

    /// Slots a freshly added land starts with (default: 1).
    #[serde(default = "default_base_land_slots")]
    pub base_land_slots: u32,

    /// Resource read by a `population` operand without a role
    /// (default: `population_total`).
    #[serde(default = "default_population_resource")]
    pub population_resource: ResourceId,

    /// Stat whose comparison against total population yields the capacity
    /// message (default: `maxPopulation`).
    #[serde(default = "default_max_population_stat")]
    pub max_population_stat: ResourceId,
}

const fn default_max_slots_per_land() -> u32 {
    2
}

const fn default_base_land_slots() -> u32 {
    1
}

fn default_population_resource() -> ResourceId {
    ResourceId::new("population_total")
}

fn default_max_population_stat() -> ResourceId {
    ResourceId::new("maxPopulation")
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_slots_per_land: default_max_slots_per_land(),
            base_land_slots: default_base_land_slots(),
            population_resource: default_population_resource(),
            max_population_stat: default_max_population_stat(),
        }
    }
}

impl RulesConfig {
    /// Slots for a new land, never above the per-land cap.
    pub fn initial_land_slots(&self) -> u32 {
        self.base_land_slots.min(self.max_slots_per_land)
    }
}
