//! Active passives and the capability to grant them.
//!
//! A passive is a bundle of effects applied when it becomes active and
//! reverted when it is removed, plus phase triggers that run each time the
//! owner enters a phase. Passives are attached to a player through
//! [`add_passive`] and detached through [`remove_passive`]; both run
//! synchronously inside the effect that caused them.
//!
//! Content records that grant passives (buildings) implement
//! [`PassiveGrantor`]. Granting is resolved through the trait rather than a
//! function stored on the record, so content stays plain serialisable data.

use kingdom_types::{BuildingDefinition, EffectDef, PassiveDefinition, PassiveId, PassiveMeta, PassiveRecord, PhaseId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::EffectContext;
use crate::error::EffectError;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A passive attached to a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePassive {
    /// The definition the passive was created from.
    pub definition: PassiveDefinition,
    /// Attribution and lifetime.
    pub meta: PassiveMeta,
}

impl ActivePassive {
    /// Public view of the passive.
    pub fn record(&self) -> PassiveRecord {
        PassiveRecord {
            id: self.definition.id.clone(),
            name: self.definition.name.clone(),
            icon: self.definition.icon.clone(),
            detail: self.definition.detail.clone(),
            meta: self.meta.clone(),
        }
    }
}

/// Active passives of one player, in activation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassiveRegistry {
    active: Vec<ActivePassive>,
}

impl PassiveRegistry {
    /// Whether a passive with `id` is active.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Look up an active passive.
    pub fn get(&self, id: &str) -> Option<&ActivePassive> {
        self.active.iter().find(|p| p.definition.id.as_str() == id)
    }

    /// Attach a passive. Fails if one with the same id is active.
    pub fn insert(&mut self, passive: ActivePassive) -> Result<(), EffectError> {
        if self.contains(passive.definition.id.as_str()) {
            return Err(EffectError::DuplicatePassive(passive.definition.id));
        }
        self.active.push(passive);
        Ok(())
    }

    /// Detach a passive, returning it if it was active.
    pub fn remove(&mut self, id: &str) -> Option<ActivePassive> {
        let index = self.active.iter().position(|p| p.definition.id.as_str() == id)?;
        Some(self.active.remove(index))
    }

    /// Ids of passives owned by `owner`.
    pub fn owned_by(&self, owner: &str) -> Vec<PassiveId> {
        self.active
            .iter()
            .filter(|p| p.meta.owner.as_deref() == Some(owner))
            .map(|p| p.definition.id.clone())
            .collect()
    }

    /// Ids of passives that expire when `phase` starts.
    pub fn expiring_on(&self, phase: &str) -> Vec<PassiveId> {
        self.active
            .iter()
            .filter(|p| p.meta.remove_on_phase.as_ref().is_some_and(|id| id.as_str() == phase))
            .map(|p| p.definition.id.clone())
            .collect()
    }

    /// Phase triggers for `phase`, as owned `(passive, effects)` pairs.
    pub fn triggers_for(&self, phase: &PhaseId) -> Vec<(PassiveId, Vec<EffectDef>)> {
        self.active
            .iter()
            .filter_map(|p| {
                p.definition
                    .on_phase
                    .get(phase)
                    .filter(|effects| !effects.is_empty())
                    .map(|effects| (p.definition.id.clone(), effects.clone()))
            })
            .collect()
    }

    /// Public views of every active passive.
    pub fn records(&self) -> Vec<PassiveRecord> {
        self.active.iter().map(ActivePassive::record).collect()
    }

    /// Number of active passives.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no passive is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Attach / detach
// ---------------------------------------------------------------------------

/// Owner tag of passives granted by a building.
pub fn building_owner(building: &str) -> String {
    format!("building:{building}")
}

/// Owner tag of passives granted by a tier track.
pub fn tier_owner(resource: &str) -> String {
    format!("tier:{resource}")
}

/// Attach `definition` to the context's player and apply its effects.
pub fn add_passive(
    ctx: &mut EffectContext<'_>,
    definition: &PassiveDefinition,
    mut meta: PassiveMeta,
) -> Result<(), EffectError> {
    if meta.remove_on_phase.is_none() {
        meta.remove_on_phase.clone_from(&definition.remove_on_phase);
    }
    ctx.player.passives.insert(ActivePassive {
        definition: definition.clone(),
        meta,
    })?;
    debug!(passive = %definition.id, effects = definition.effects.len(), "passive added");
    ctx.apply_all(&definition.effects)
}

/// Detach the passive `id` and revert its effects in reverse order.
///
/// Removing a passive that is not active is a no-op and returns `false`.
pub fn remove_passive(ctx: &mut EffectContext<'_>, id: &str) -> Result<bool, EffectError> {
    let Some(passive) = ctx.player.passives.remove(id) else {
        return Ok(false);
    };
    for effect in passive.definition.effects.iter().rev() {
        if let Some(inverse) = invert_effect(effect) {
            ctx.apply(&inverse, 1)?;
        }
    }
    debug!(passive = %id, "passive removed");
    Ok(true)
}

/// Detach every passive owned by `owner`.
pub fn remove_owned_passives(ctx: &mut EffectContext<'_>, owner: &str) -> Result<usize, EffectError> {
    let owned = ctx.player.passives.owned_by(owner);
    for id in &owned {
        remove_passive(ctx, id.as_str())?;
    }
    Ok(owned.len())
}

/// The effect that undoes `effect`, if it has one.
///
/// Additive resource changes and structural additions are reverted by their
/// counterpart. A percent change is reverted by the same percent of the
/// amount at removal time, which is not an exact inverse. Effects without a
/// counterpart (bound increases, land additions, tilling) persist.
///
/// The inverse keeps the original `repeat` and `source`, so a grant applied
/// three times is reverted three times. Its reconciliation is always
/// `clamp`: a grant already spent below its bound reverts to the bound
/// instead of failing.
pub fn invert_effect(effect: &EffectDef) -> Option<EffectDef> {
    let method = match (effect.kind.as_str(), effect.method.as_str()) {
        ("resource" | "phase_skip", "add") => "remove",
        ("resource" | "phase_skip", "remove") => "add",
        ("building" | "passive" | "development", "add") => "remove",
        _ => return None,
    };
    let mut inverse = effect.clone();
    method.clone_into(&mut inverse.method);
    Some(inverse.clamped())
}

// ---------------------------------------------------------------------------
// Granting capability
// ---------------------------------------------------------------------------

/// A content record that registers passives when it takes effect.
pub trait PassiveGrantor {
    /// Register this record's passives on the context's player.
    ///
    /// Runs synchronously inside the effect that triggered it. Returns the
    /// ids of the passives it attached.
    fn grant(&self, ctx: &mut EffectContext<'_>) -> Result<Vec<PassiveId>, EffectError>;
}

impl PassiveGrantor for BuildingDefinition {
    fn grant(&self, ctx: &mut EffectContext<'_>) -> Result<Vec<PassiveId>, EffectError> {
        let owner = building_owner(self.id.as_str());
        let mut granted = Vec::with_capacity(self.passives.len());
        for passive in &self.passives {
            let meta = PassiveMeta {
                source: Some(owner.clone()),
                owner: Some(owner.clone()),
                remove_on_phase: None,
            };
            add_passive(ctx, passive, meta)?;
            granted.push(passive.id.clone());
        }
        Ok(granted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_types::Reconciliation;
    use serde_json::json;

    use super::*;

    fn passive(id: &str, owner: Option<&str>, expires: Option<&str>) -> ActivePassive {
        ActivePassive {
            definition: PassiveDefinition::new(id),
            meta: PassiveMeta {
                source: None,
                owner: owner.map(str::to_owned),
                remove_on_phase: expires.map(PhaseId::new),
            },
        }
    }

    #[test]
    fn registry_rejects_duplicates() {
        let mut registry = PassiveRegistry::default();
        assert!(registry.insert(passive("festival", None, None)).is_ok());
        assert_eq!(
            registry.insert(passive("festival", None, None)),
            Err(EffectError::DuplicatePassive(PassiveId::new("festival")))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_filters_by_owner_and_expiry() {
        let mut registry = PassiveRegistry::default();
        registry.insert(passive("a", Some("building:mill"), None)).ok();
        registry.insert(passive("b", Some("building:mill"), Some("upkeep"))).ok();
        registry.insert(passive("c", None, Some("upkeep"))).ok();

        let owned = registry.owned_by("building:mill");
        assert_eq!(owned, vec![PassiveId::new("a"), PassiveId::new("b")]);
        assert_eq!(registry.expiring_on("upkeep").len(), 2);
        assert!(registry.remove("b").is_some());
        assert!(registry.remove("b").is_none());
        assert_eq!(registry.records().len(), 2);
    }

    #[test]
    fn inversion_table() {
        let add = EffectDef::new("resource", "add").with_params(json!({ "resourceId": "gold", "amount": 2 }));
        assert_eq!(invert_effect(&add).map(|e| e.method), Some("remove".to_owned()));
        let skip = EffectDef::new("phase_skip", "remove");
        assert_eq!(invert_effect(&skip).map(|e| e.method), Some("add".to_owned()));
        let building = EffectDef::new("building", "add");
        assert_eq!(invert_effect(&building).map(|e| e.method), Some("remove".to_owned()));
        assert!(invert_effect(&EffectDef::new("land", "till")).is_none());
        assert!(invert_effect(&EffectDef::new("resource", "increase_upper_bound")).is_none());
    }

    #[test]
    fn inverse_keeps_repeat_and_clamps() {
        let grant = EffectDef::new("resource", "add")
            .with_params(json!({ "resourceId": "gold", "amount": 2 }))
            .repeated(3);
        let inverse = invert_effect(&grant).unwrap();
        assert_eq!(inverse.repeat, Some(3));
        assert_eq!(inverse.reconciliation(), Reconciliation::Clamp);
        assert_eq!(inverse.params, grant.params);
    }
}
