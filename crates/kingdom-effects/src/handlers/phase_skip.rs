//! Phase and step suppression handlers.

use kingdom_types::{EffectDef, PhaseId, SourceId, StepId};
use serde::Deserialize;
use tracing::debug;

use crate::context::EffectContext;
use crate::error::EffectError;
use crate::registry::parse_params;

/// Params of `phase_skip.add` and `phase_skip.remove`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipParams {
    /// The phase to suppress.
    pub phase_id: PhaseId,
    /// Suppress only this step of the phase.
    #[serde(default)]
    pub step_id: Option<StepId>,
    /// Attribution; required and non-empty.
    #[serde(default)]
    pub source: Option<String>,
}

impl SkipParams {
    fn source(&self, effect: &EffectDef) -> Result<SourceId, EffectError> {
        self.source
            .as_deref()
            .map(str::trim)
            .filter(|source| !source.is_empty())
            .map(SourceId::new)
            .ok_or_else(|| EffectError::MissingSource {
                effect: effect.key(),
            })
    }
}

/// `phase_skip.add`
pub fn handle_add(ctx: &mut EffectContext<'_>, effect: &EffectDef, _mult: u32) -> Result<(), EffectError> {
    let params: SkipParams = parse_params(effect)?;
    let source = params.source(effect)?;
    let added = match &params.step_id {
        Some(step) => ctx.player.skips.add_step(&params.phase_id, step, &source),
        None => ctx.player.skips.add_phase(&params.phase_id, &source),
    };
    debug!(phase = %params.phase_id, step = ?params.step_id, %source, added, "skip added");
    Ok(())
}

/// `phase_skip.remove`
///
/// Removing a source that was never added is a no-op.
pub fn handle_remove(ctx: &mut EffectContext<'_>, effect: &EffectDef, _mult: u32) -> Result<(), EffectError> {
    let params: SkipParams = parse_params(effect)?;
    let source = params.source(effect)?;
    let removed = match &params.step_id {
        Some(step) => ctx.player.skips.remove_step(&params.phase_id, step, &source),
        None => ctx.player.skips.remove_phase(&params.phase_id, &source),
    };
    debug!(phase = %params.phase_id, step = ?params.step_id, %source, removed, "skip removed");
    Ok(())
}
