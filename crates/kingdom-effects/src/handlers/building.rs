//! Building handlers.
//!
//! Buildings are a set: adding an owned building changes nothing. Adding a
//! new one grants its passives synchronously through [`PassiveGrantor`];
//! removing it detaches every passive it owns.

use kingdom_types::{BuildingId, EffectDef};
use serde::Deserialize;
use tracing::debug;

use crate::context::EffectContext;
use crate::error::EffectError;
use crate::passives::{PassiveGrantor, building_owner, remove_owned_passives};
use crate::registry::parse_params;

/// Params of `building.add` and `building.remove`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingParams {
    /// The building.
    pub id: BuildingId,
}

/// `building.add`
pub fn handle_add(ctx: &mut EffectContext<'_>, effect: &EffectDef, _mult: u32) -> Result<(), EffectError> {
    let params: BuildingParams = parse_params(effect)?;
    add_building(ctx, &params.id)?;
    Ok(())
}

/// `building.remove`
pub fn handle_remove(ctx: &mut EffectContext<'_>, effect: &EffectDef, _mult: u32) -> Result<(), EffectError> {
    let params: BuildingParams = parse_params(effect)?;
    remove_building(ctx, &params.id)?;
    Ok(())
}

/// Add `id` to the player's buildings and grant its passives.
///
/// Returns `false` (and does nothing) if the building is already owned.
pub fn add_building(ctx: &mut EffectContext<'_>, id: &BuildingId) -> Result<bool, EffectError> {
    let content = ctx.content;
    let building = content
        .building(id.as_str())
        .ok_or_else(|| EffectError::UnknownBuilding(id.clone()))?;
    if !ctx.player.buildings.insert(id.clone()) {
        return Ok(false);
    }
    let granted = building.grant(ctx)?;
    debug!(player = %ctx.player.id, building = %id, passives = granted.len(), "building added");
    Ok(true)
}

/// Remove `id` from the player's buildings and detach its passives.
///
/// Returns `false` if the building was not owned.
pub fn remove_building(ctx: &mut EffectContext<'_>, id: &BuildingId) -> Result<bool, EffectError> {
    if !ctx.player.buildings.remove(id) {
        return Ok(false);
    }
    let removed = remove_owned_passives(ctx, &building_owner(id.as_str()))?;
    debug!(player = %ctx.player.id, building = %id, passives = removed, "building removed");
    Ok(true)
}
