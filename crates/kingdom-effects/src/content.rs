//! Static content: resources, groups, buildings, developments, actions and
//! declared passives.
//!
//! Content is authored as a single JSON document and loaded once per
//! session. [`ContentRegistry::validate`] checks every effect and
//! requirement against the dispatch table so that a typo in a content file
//! fails at load time instead of in the middle of an action.

use std::collections::BTreeMap;
use std::path::Path;

use kingdom_ledger::ResourceCatalog;
use kingdom_types::{
    ActionDefinition, BuildingDefinition, CompareParams, DevelopmentDefinition, EffectDef,
    PassiveDefinition, RequirementDef, ResourceDefinition, ResourceGroupDefinition,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{ContentError, EffectError};
use crate::registry::EffectRegistry;
use crate::requirements;

/// Wire form of a content document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFile {
    /// Resource definitions.
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
    /// Resource groups.
    #[serde(default)]
    pub groups: Vec<ResourceGroupDefinition>,
    /// Buildings.
    #[serde(default)]
    pub buildings: Vec<BuildingDefinition>,
    /// Developments.
    #[serde(default)]
    pub developments: Vec<DevelopmentDefinition>,
    /// Actions.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
    /// Passives that effects may add by id.
    #[serde(default)]
    pub passives: Vec<PassiveDefinition>,
}

/// Indexed, immutable content of a session.
#[derive(Debug, Clone, Default)]
pub struct ContentRegistry {
    catalog: ResourceCatalog,
    buildings: BTreeMap<String, BuildingDefinition>,
    developments: BTreeMap<String, DevelopmentDefinition>,
    actions: BTreeMap<String, ActionDefinition>,
    passives: BTreeMap<String, PassiveDefinition>,
}

fn index<T>(
    kind: &'static str,
    records: Vec<T>,
    id: impl Fn(&T) -> String,
) -> Result<BTreeMap<String, T>, ContentError> {
    let mut map = BTreeMap::new();
    for record in records {
        let key = id(&record);
        if map.contains_key(&key) {
            return Err(ContentError::Duplicate { kind, id: key });
        }
        map.insert(key, record);
    }
    Ok(map)
}

impl ContentRegistry {
    /// Index a parsed content document.
    pub fn new(file: ContentFile) -> Result<Self, ContentError> {
        let catalog = ResourceCatalog::new(file.resources, file.groups)?;
        Ok(Self {
            catalog,
            buildings: index("building", file.buildings, |b| b.id.to_string())?,
            developments: index("development", file.developments, |d| d.id.to_string())?,
            actions: index("action", file.actions, |a| a.id.to_string())?,
            passives: index("passive", file.passives, |p| p.id.to_string())?,
        })
    }

    /// Parse content from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, ContentError> {
        Self::new(serde_json::from_value(value)?)
    }

    /// Parse content from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load content from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            resources = content.catalog.definitions().count(),
            buildings = content.buildings.len(),
            developments = content.developments.len(),
            actions = content.actions.len(),
            "content loaded"
        );
        Ok(content)
    }

    /// The resource catalog.
    pub const fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// Look up a building.
    pub fn building(&self, id: &str) -> Option<&BuildingDefinition> {
        self.buildings.get(id)
    }

    /// Look up a development.
    pub fn development(&self, id: &str) -> Option<&DevelopmentDefinition> {
        self.developments.get(id)
    }

    /// Look up an action.
    pub fn action(&self, id: &str) -> Option<&ActionDefinition> {
        self.actions.get(id)
    }

    /// Look up a declared passive.
    pub fn passive(&self, id: &str) -> Option<&PassiveDefinition> {
        self.passives.get(id)
    }

    /// All actions, ordered by id.
    pub fn actions(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.values()
    }

    /// Check every effect and requirement against `registry`.
    ///
    /// Effects must have a registered handler; requirements must name a
    /// known evaluator and carry well-formed params; action costs must name
    /// known resources.
    pub fn validate(&self, registry: &EffectRegistry) -> Result<(), ContentError> {
        for building in self.buildings.values() {
            for passive in &building.passives {
                check_passive(registry, &format!("building:{}", building.id), passive)?;
            }
        }
        for development in self.developments.values() {
            check_effects(registry, &format!("development:{}", development.id), &development.effects)?;
        }
        for passive in self.passives.values() {
            check_passive(registry, &format!("passive:{}", passive.id), passive)?;
        }
        for (resource, track) in self.catalog.tier_tracks() {
            for tier in &track.tiers {
                if let Some(passive) = &tier.passive {
                    check_passive(registry, &format!("tier:{resource}:{}", tier.id), passive)?;
                }
            }
        }
        for action in self.actions.values() {
            let owner = format!("action:{}", action.id);
            check_effects(registry, &owner, &action.effects)?;
            check_requirements(&owner, &action.requirements)?;
            if let Some(resource) = action.costs.keys().find(|id| !self.catalog.contains(id.as_str())) {
                return Err(ContentError::UnknownCostResource {
                    action: action.id.clone(),
                    resource: resource.clone(),
                });
            }
        }
        Ok(())
    }
}

fn check_passive(registry: &EffectRegistry, owner: &str, passive: &PassiveDefinition) -> Result<(), ContentError> {
    check_effects(registry, owner, &passive.effects)?;
    for effects in passive.on_phase.values() {
        check_effects(registry, owner, effects)?;
    }
    Ok(())
}

fn check_effects(registry: &EffectRegistry, owner: &str, effects: &[EffectDef]) -> Result<(), ContentError> {
    for effect in effects {
        if !registry.contains(&effect.kind, &effect.method) {
            return Err(ContentError::InvalidRecord {
                owner: owner.to_owned(),
                source: EffectError::UnknownEffect {
                    kind: effect.kind.clone(),
                    method: effect.method.clone(),
                },
            });
        }
    }
    Ok(())
}

fn check_requirements(owner: &str, requirements: &[RequirementDef]) -> Result<(), ContentError> {
    for requirement in requirements {
        requirements::compare_params(requirement)
            .map(|_: CompareParams| ())
            .map_err(|source| ContentError::InvalidRecord {
                owner: owner.to_owned(),
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn indexes_records_by_id() {
        let content = ContentRegistry::from_value(json!({
            "resources": [{ "id": "gold", "label": "Gold" }],
            "buildings": [{ "id": "mill", "name": "Mill" }],
            "actions": [{ "id": "tax", "name": "Tax", "costs": { "gold": 1 } }]
        }))
        .unwrap();
        assert!(content.building("mill").is_some());
        assert!(content.action("tax").is_some());
        assert!(content.catalog().contains("gold"));
        assert!(content.validate(&EffectRegistry::with_builtin()).is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = ContentRegistry::from_value(json!({
            "buildings": [{ "id": "mill", "name": "Mill" }, { "id": "mill", "name": "Mill 2" }]
        }));
        assert!(matches!(result, Err(ContentError::Duplicate { kind: "building", .. })));
    }

    #[test]
    fn unknown_effects_fail_validation() {
        let content = ContentRegistry::from_value(json!({
            "developments": [{ "id": "farm", "name": "Farm", "effects": [
                { "type": "resource", "method": "transmute" }
            ] }]
        }))
        .unwrap();
        let err = content.validate(&EffectRegistry::with_builtin());
        assert!(matches!(
            err,
            Err(ContentError::InvalidRecord { source: EffectError::UnknownEffect { .. }, .. })
        ));
    }

    #[test]
    fn malformed_requirements_fail_validation() {
        let registry = EffectRegistry::with_builtin();
        let unknown = ContentRegistry::from_value(json!({
            "actions": [{ "id": "a", "name": "A", "requirements": [
                { "type": "oracle", "method": "ask" }
            ] }]
        }))
        .unwrap();
        assert!(matches!(
            unknown.validate(&registry),
            Err(ContentError::InvalidRecord { source: EffectError::UnknownRequirement { .. }, .. })
        ));

        let malformed = ContentRegistry::from_value(json!({
            "actions": [{ "id": "a", "name": "A", "requirements": [
                { "type": "evaluator", "method": "compare", "params": { "left": 1 } }
            ] }]
        }))
        .unwrap();
        assert!(matches!(
            malformed.validate(&registry),
            Err(ContentError::InvalidRecord { source: EffectError::InvalidParams { .. }, .. })
        ));
    }

    #[test]
    fn costs_must_name_known_resources() {
        let content = ContentRegistry::from_value(json!({
            "actions": [{ "id": "tax", "name": "Tax", "costs": { "mana": 1 } }]
        }))
        .unwrap();
        assert!(matches!(
            content.validate(&EffectRegistry::with_builtin()),
            Err(ContentError::UnknownCostResource { .. })
        ));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            ContentRegistry::from_json("{ not json"),
            Err(ContentError::Parse(_))
        ));
    }
}
