//! Development handlers.
//!
//! A development occupies one slot of a land. Adding one applies its
//! effects; removing one reverts them.

use kingdom_types::{DevelopmentId, EffectDef, LandId};
use serde::Deserialize;
use tracing::debug;

use crate::context::EffectContext;
use crate::error::EffectError;
use crate::passives::invert_effect;
use crate::registry::parse_params;

/// Params of `development.add` and `development.remove`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentParams {
    /// The development.
    pub id: DevelopmentId,
    /// Target land. Without it the first land with a free slot (for `add`)
    /// or containing the development (for `remove`) is used.
    #[serde(default)]
    pub land_id: Option<LandId>,
}

/// `development.add`
pub fn handle_add(ctx: &mut EffectContext<'_>, effect: &EffectDef, mult: u32) -> Result<(), EffectError> {
    let params: DevelopmentParams = parse_params(effect)?;
    for _ in 0..mult {
        add_development(ctx, &params.id, params.land_id.as_ref())?;
    }
    Ok(())
}

/// `development.remove`
pub fn handle_remove(ctx: &mut EffectContext<'_>, effect: &EffectDef, mult: u32) -> Result<(), EffectError> {
    let params: DevelopmentParams = parse_params(effect)?;
    for _ in 0..mult {
        remove_development(ctx, &params.id, params.land_id.as_ref())?;
    }
    Ok(())
}

/// Build `id` on a land and apply its effects. Returns the land used.
pub fn add_development(
    ctx: &mut EffectContext<'_>,
    id: &DevelopmentId,
    land_id: Option<&LandId>,
) -> Result<LandId, EffectError> {
    let content = ctx.content;
    let development = content
        .development(id.as_str())
        .ok_or_else(|| EffectError::UnknownDevelopment(id.clone()))?;

    let land = match land_id {
        Some(land_id) => {
            let land = ctx
                .player
                .land_mut(land_id.as_str())
                .ok_or_else(|| EffectError::LandNotFound(land_id.clone()))?;
            if land.free_slots() == 0 {
                return Err(EffectError::NoFreeSlot {
                    land: Some(land_id.clone()),
                });
            }
            land
        }
        None => ctx
            .player
            .lands
            .iter_mut()
            .find(|land| land.free_slots() > 0)
            .ok_or(EffectError::NoFreeSlot { land: None })?,
    };
    land.developments.push(id.clone());
    let used = land.id.clone();

    debug!(player = %ctx.player.id, development = %id, land = %used, "development added");
    ctx.apply_all(&development.effects)?;
    Ok(used)
}

/// Remove one `id` from a land and revert its effects.
///
/// Returns the land it was removed from, or `None` when no land holds it.
pub fn remove_development(
    ctx: &mut EffectContext<'_>,
    id: &DevelopmentId,
    land_id: Option<&LandId>,
) -> Result<Option<LandId>, EffectError> {
    let content = ctx.content;
    let development = content
        .development(id.as_str())
        .ok_or_else(|| EffectError::UnknownDevelopment(id.clone()))?;

    let land = match land_id {
        Some(land_id) => Some(
            ctx.player
                .land_mut(land_id.as_str())
                .ok_or_else(|| EffectError::LandNotFound(land_id.clone()))?,
        )
        .filter(|land| land.developments.contains(id)),
        None => ctx
            .player
            .lands
            .iter_mut()
            .find(|land| land.developments.contains(id)),
    };
    let Some(land) = land else {
        return Ok(None);
    };
    if let Some(index) = land.developments.iter().position(|dev| dev == id) {
        land.developments.remove(index);
    }
    let used = land.id.clone();

    for effect in development.effects.iter().rev() {
        if let Some(inverse) = invert_effect(effect) {
            ctx.apply(&inverse, 1)?;
        }
    }
    debug!(player = %ctx.player.id, development = %id, land = %used, "development removed");
    Ok(Some(used))
}
