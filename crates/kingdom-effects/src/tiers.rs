//! Tier tracks: passives granted while a resource sits within a range.
//!
//! After every batch of mutations the session calls [`sync_tiers`]. For
//! each tier-tracked resource the active tier is recomputed; when it
//! changes, the passives of the old tier are detached (and reverted) and the
//! passive of the new tier is attached.

use kingdom_types::PassiveMeta;
use tracing::info;

use crate::context::EffectContext;
use crate::error::EffectError;
use crate::passives::{add_passive, remove_owned_passives, tier_owner};

/// Bring every tier-tracked resource's active tier up to date.
///
/// Returns the number of tracks whose tier changed.
pub fn sync_tiers(ctx: &mut EffectContext<'_>) -> Result<usize, EffectError> {
    let catalog = ctx.catalog();
    let mut changed = 0_usize;

    for (resource, track) in catalog.tier_tracks() {
        let amount = ctx.player.resources.amount(resource.as_str());
        let next = track.tier_for(amount);
        let current = ctx.player.tiers.get(resource).map(String::as_str);
        if current == next.map(|tier| tier.id.as_str()) {
            continue;
        }

        let owner = tier_owner(resource.as_str());
        remove_owned_passives(ctx, &owner)?;
        match next {
            Some(tier) => {
                ctx.player.tiers.insert(resource.clone(), tier.id.clone());
                if let Some(passive) = &tier.passive {
                    let meta = PassiveMeta {
                        source: Some(format!("{owner}:{}", tier.id)),
                        owner: Some(owner.clone()),
                        remove_on_phase: None,
                    };
                    add_passive(ctx, passive, meta)?;
                }
            }
            None => {
                ctx.player.tiers.remove(resource);
            }
        }
        info!(
            player = %ctx.player.id,
            resource = %resource,
            tier = next.map_or("none", |tier| tier.id.as_str()),
            "tier changed"
        );
        changed = changed.saturating_add(1);
    }
    Ok(changed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_ledger::ResourceDelta;
    use serde_json::json;

    use super::*;
    use crate::config::RulesConfig;
    use crate::content::ContentRegistry;
    use crate::player::PlayerState;
    use crate::registry::EffectRegistry;

    fn content() -> ContentRegistry {
        ContentRegistry::from_value(json!({
            "resources": [
                { "id": "gold", "label": "Gold" },
                { "id": "happiness", "label": "Happiness", "lowerBound": -10, "upperBound": 10,
                  "tierTrack": { "tiers": [
                    { "id": "unrest", "label": "Unrest", "min": -10, "max": -1,
                      "passive": { "id": "unrest_penalty", "effects": [
                        { "type": "phase_skip", "method": "add",
                          "params": { "phaseId": "growth", "source": "unrest" } }
                      ] } },
                    { "id": "content", "label": "Content", "min": 0, "max": 4 },
                    { "id": "joyful", "label": "Joyful", "min": 5,
                      "passive": { "id": "joyful_bonus", "effects": [
                        { "type": "resource", "method": "add",
                          "params": { "resourceId": "gold", "amount": 1 } }
                      ] } }
                  ] } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn tier_passives_are_swapped_when_the_tier_changes() {
        let content = content();
        let registry = EffectRegistry::with_builtin();
        let rules = RulesConfig::default();
        let mut player = PlayerState::new("A", "Alice", content.catalog());
        let mut ctx = EffectContext::new(&registry, &content, &rules, &mut player);

        assert_eq!(sync_tiers(&mut ctx).unwrap(), 1);
        assert_eq!(ctx.player.tiers.get("happiness").map(String::as_str), Some("content"));
        assert_eq!(sync_tiers(&mut ctx).unwrap(), 0);

        let catalog = content.catalog();
        ctx.player.resources.apply(catalog, &ResourceDelta::add("happiness", 6.0)).unwrap();
        sync_tiers(&mut ctx).unwrap();
        assert!(ctx.player.passives.contains("joyful_bonus"));
        assert!((ctx.player.resources.amount("gold") - 1.0).abs() < f64::EPSILON);

        ctx.player.resources.apply(catalog, &ResourceDelta::remove("happiness", 9.0)).unwrap();
        sync_tiers(&mut ctx).unwrap();
        assert!(!ctx.player.passives.contains("joyful_bonus"));
        assert!(ctx.player.passives.contains("unrest_penalty"));
        assert!(ctx.player.resources.amount("gold").abs() < f64::EPSILON);
        assert!(ctx.player.skips.is_phase_skipped("growth"));
        assert_eq!(ctx.player.tiers.get("happiness").map(String::as_str), Some("unrest"));
    }
}
