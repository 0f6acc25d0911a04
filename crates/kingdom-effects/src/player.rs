//! Mutable per-player game state.

use std::collections::{BTreeMap, BTreeSet};

use kingdom_ledger::{PlayerResources, ResourceCatalog, resource_snapshot};
use kingdom_types::{BuildingId, Land, LandId, PlayerId, PlayerSnapshot, ResourceId};
use serde::{Deserialize, Serialize};

use crate::passives::PassiveRegistry;
use crate::skip::SkipRegistry;

/// Everything the engine tracks about one player.
///
/// Owned exclusively by its session. Serialises to plain JSON for the
/// session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Resource amounts and bounds.
    pub resources: PlayerResources,
    /// Owned lands in acquisition order.
    #[serde(default)]
    pub lands: Vec<Land>,
    /// Owned buildings. A set: each building is owned at most once.
    #[serde(default)]
    pub buildings: BTreeSet<BuildingId>,
    /// Active passives.
    #[serde(default)]
    pub passives: PassiveRegistry,
    /// Phase and step suppression.
    #[serde(default)]
    pub skips: SkipRegistry,
    /// Active tier id per tier-tracked resource.
    #[serde(default)]
    pub tiers: BTreeMap<ResourceId, String>,
    /// Counter used to mint land ids.
    #[serde(default)]
    land_counter: u32,
}

impl PlayerState {
    /// A fresh player with resources seeded from the catalog.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, catalog: &ResourceCatalog) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resources: PlayerResources::new(catalog),
            lands: Vec::new(),
            buildings: BTreeSet::new(),
            passives: PassiveRegistry::default(),
            skips: SkipRegistry::new(),
            tiers: BTreeMap::new(),
            land_counter: 0,
        }
    }

    /// Mint the next land id (`<player>-L<n>`).
    pub fn next_land_id(&mut self) -> LandId {
        self.land_counter = self.land_counter.saturating_add(1);
        LandId::new(format!("{}-L{}", self.id, self.land_counter))
    }

    /// Look up an owned land.
    pub fn land(&self, id: &str) -> Option<&Land> {
        self.lands.iter().find(|land| land.id.as_str() == id)
    }

    /// Look up an owned land mutably.
    pub fn land_mut(&mut self, id: &str) -> Option<&mut Land> {
        self.lands.iter_mut().find(|land| land.id.as_str() == id)
    }

    /// Number of developments with `id` across all lands.
    pub fn development_count(&self, id: &str) -> usize {
        self.lands
            .iter()
            .flat_map(|land| land.developments.iter())
            .filter(|dev| dev.as_str() == id)
            .count()
    }

    /// Owned, independent view for the session snapshot.
    pub fn snapshot(&self, catalog: &ResourceCatalog) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            resources: resource_snapshot(catalog, &self.resources),
            lands: self.lands.clone(),
            buildings: self.buildings.iter().cloned().collect(),
            passives: self.passives.records(),
            skips: self.skips.snapshot(),
            tiers: self.tiers.clone(),
        }
    }
}
