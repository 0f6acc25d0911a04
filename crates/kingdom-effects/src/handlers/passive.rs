//! Passive handlers.

use kingdom_types::{EffectDef, PassiveDefinition, PassiveId, PassiveMeta};
use serde::Deserialize;

use crate::context::EffectContext;
use crate::error::EffectError;
use crate::passives::{add_passive, remove_passive};
use crate::registry::parse_params;

/// Params of `passive.remove`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveRemoveParams {
    /// The passive to detach.
    pub id: PassiveId,
}

/// `passive.add`
///
/// Params are a passive definition. A bare `{ "id": ... }` refers to a
/// passive declared in the content registry.
pub fn handle_add(ctx: &mut EffectContext<'_>, effect: &EffectDef, _mult: u32) -> Result<(), EffectError> {
    let inline: PassiveDefinition = parse_params(effect)?;
    let content = ctx.content;
    let is_reference = inline.effects.is_empty() && inline.on_phase.is_empty();
    let definition = match content.passive(inline.id.as_str()) {
        Some(declared) if is_reference => declared,
        _ => &inline,
    };
    let meta = PassiveMeta {
        source: effect.meta.as_ref().and_then(|meta| meta.source.clone()),
        owner: None,
        remove_on_phase: None,
    };
    add_passive(ctx, definition, meta)
}

/// `passive.remove`
///
/// Removing a passive that is not active is a no-op.
pub fn handle_remove(ctx: &mut EffectContext<'_>, effect: &EffectDef, _mult: u32) -> Result<(), EffectError> {
    let params: PassiveRemoveParams = parse_params(effect)?;
    remove_passive(ctx, params.id.as_str())?;
    Ok(())
}
