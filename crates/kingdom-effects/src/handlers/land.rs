//! Land handlers.

use kingdom_types::{EffectDef, Land, LandId};
use serde::Deserialize;
use tracing::debug;

use crate::config::RulesConfig;
use crate::context::EffectContext;
use crate::error::EffectError;
use crate::player::PlayerState;
use crate::registry::parse_params;

/// Params of `land.add`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandAddParams {
    /// Lands added per application (default: 1).
    #[serde(default)]
    pub count: Option<u32>,
    /// Starting slots; defaults to the rules' base slots.
    #[serde(default)]
    pub slots: Option<u32>,
}

/// Params of `land.till`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TillParams {
    /// The land to till.
    #[serde(default)]
    pub land_id: Option<String>,
}

/// `land.add`
pub fn handle_add(ctx: &mut EffectContext<'_>, effect: &EffectDef, mult: u32) -> Result<(), EffectError> {
    let params: LandAddParams = parse_params(effect)?;
    let slots = params
        .slots
        .map_or_else(|| ctx.rules.initial_land_slots(), |slots| slots.min(ctx.rules.max_slots_per_land));
    let count = params.count.unwrap_or(1).saturating_mul(mult);
    for _ in 0..count {
        let id = ctx.player.next_land_id();
        debug!(player = %ctx.player.id, land = %id, slots, "land added");
        ctx.player.lands.push(Land::new(id, slots));
    }
    Ok(())
}

/// `land.till`
pub fn handle_till(ctx: &mut EffectContext<'_>, effect: &EffectDef, mult: u32) -> Result<(), EffectError> {
    let params: TillParams = parse_params(effect)?;
    let land_id = params
        .land_id
        .filter(|id| !id.is_empty())
        .map(LandId::new)
        .ok_or(EffectError::MissingLandId)?;
    for _ in 0..mult {
        till_land(ctx.player, ctx.rules, &land_id)?;
    }
    Ok(())
}

/// Add one development slot to `land_id`, never beyond
/// [`RulesConfig::max_slots_per_land`].
///
/// Returns the land's slot count afterwards. Tilling a land at or above the
/// cap is not an error; it just leaves the count unchanged.
pub fn till_land(player: &mut PlayerState, rules: &RulesConfig, land_id: &LandId) -> Result<u32, EffectError> {
    let land = player
        .land_mut(land_id.as_str())
        .ok_or_else(|| EffectError::LandNotFound(land_id.clone()))?;
    if land.slots_max < rules.max_slots_per_land {
        land.slots_max = land.slots_max.saturating_add(1);
    }
    land.tilled = true;
    debug!(land = %land_id, slots_max = land.slots_max, "land tilled");
    Ok(land.slots_max)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handlers::fixtures::{Harness, player};

    #[test]
    fn add_creates_lands_with_base_slots() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        ctx.apply(&EffectDef::new("land", "add").with_params(json!({ "count": 2 })), 1)
            .unwrap();
        assert_eq!(ctx.player.lands.len(), 2);
        assert!(ctx.player.lands.iter().all(|land| land.slots_max == 1));
        assert_eq!(ctx.player.lands.last().map(|l| l.id.as_str()), Some("A-L2"));
    }

    #[test]
    fn till_caps_at_rule_maximum() {
        let h = Harness::new();
        let mut p = player(&h.content);
        p.lands.push(Land::new("A-L1", 2));
        let rules = RulesConfig {
            max_slots_per_land: 2,
            ..RulesConfig::default()
        };
        let mut ctx = EffectContext::new(&h.registry, &h.content, &rules, &mut p);
        let till = EffectDef::new("land", "till").with_params(json!({ "landId": "A-L1" }));
        ctx.apply(&till, 1).unwrap();
        ctx.apply(&till, 3).unwrap();
        assert_eq!(ctx.player.land("A-L1").map(|l| l.slots_max), Some(2));
    }

    #[test]
    fn till_never_lowers_a_land_above_the_cap() {
        let h = Harness::new();
        let mut p = player(&h.content);
        p.lands.push(Land::new("A-L1", 4));
        let rules = RulesConfig {
            max_slots_per_land: 2,
            ..RulesConfig::default()
        };
        let slots = till_land(&mut p, &rules, &LandId::new("A-L1")).unwrap();
        assert_eq!(slots, 4);
        assert!(p.land("A-L1").is_some_and(|l| l.tilled && l.slots_max == 4));
    }

    #[test]
    fn till_increments_below_cap() {
        let h = Harness::new();
        let mut p = player(&h.content);
        p.lands.push(Land::new("A-L1", 1));
        let slots = till_land(&mut p, &h.rules, &LandId::new("A-L1")).unwrap();
        assert_eq!(slots, 2);
        assert!(p.land("A-L1").is_some_and(|l| l.tilled));
    }

    #[test]
    fn till_requires_an_existing_land_id() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        let missing = EffectDef::new("land", "till");
        assert_eq!(ctx.apply(&missing, 1), Err(EffectError::MissingLandId));
        let empty = EffectDef::new("land", "till").with_params(json!({ "landId": "" }));
        assert_eq!(ctx.apply(&empty, 1), Err(EffectError::MissingLandId));
        let unknown = EffectDef::new("land", "till").with_params(json!({ "landId": "B-L9" }));
        assert_eq!(
            ctx.apply(&unknown, 1),
            Err(EffectError::LandNotFound(LandId::new("B-L9")))
        );
    }
}
