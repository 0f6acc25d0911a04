//! The effect dispatch table.
//!
//! Effects are data: `{type, method, params, meta, repeat}`. The registry
//! maps each `(type, method)` pair to a typed handler function. Handlers
//! parse `params` into their own structs with [`parse_params`], so a
//! malformed effect is rejected at the dispatch boundary with
//! [`EffectError::InvalidParams`] before anything is mutated.

use std::collections::BTreeMap;

use kingdom_types::EffectDef;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::context::EffectContext;
use crate::error::EffectError;
use crate::handlers;

/// Signature shared by every effect handler.
///
/// `mult` is the effective repeat count: the caller's multiplier times the
/// effect's own `repeat`. Numeric handlers scale their delta by it before
/// rounding; structural handlers run that many times.
pub type EffectHandler = fn(&mut EffectContext<'_>, &EffectDef, u32) -> Result<(), EffectError>;

/// Dispatch table keyed by `(type, method)`.
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    handlers: BTreeMap<(String, String), EffectHandler>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl EffectRegistry {
    /// A registry with no handlers.
    pub const fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// A registry with every built-in handler.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        handlers::register_builtin(&mut registry);
        registry
    }

    /// Register (or replace) the handler for `(kind, method)`.
    pub fn register(&mut self, kind: &str, method: &str, handler: EffectHandler) {
        self.handlers
            .insert((kind.to_owned(), method.to_owned()), handler);
    }

    /// Whether a handler exists for `(kind, method)`.
    pub fn contains(&self, kind: &str, method: &str) -> bool {
        self.handlers
            .contains_key(&(kind.to_owned(), method.to_owned()))
    }

    /// Registered `type.method` keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.handlers
            .keys()
            .map(|(kind, method)| format!("{kind}.{method}"))
    }

    /// Dispatch `effect` to its handler.
    pub fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        effect: &EffectDef,
        mult: u32,
    ) -> Result<(), EffectError> {
        let handler = self
            .handlers
            .get(&(effect.kind.clone(), effect.method.clone()))
            .ok_or_else(|| EffectError::UnknownEffect {
                kind: effect.kind.clone(),
                method: effect.method.clone(),
            })?;
        let mult = mult.saturating_mul(effect.repeat.unwrap_or(1));
        debug!(effect = %effect.key(), mult, player = %ctx.player.id, "applying effect");
        handler(ctx, effect, mult)
    }
}

/// Parse the effect's params into the handler's typed struct.
pub fn parse_params<T: DeserializeOwned>(effect: &EffectDef) -> Result<T, EffectError> {
    serde_json::from_value(effect.params.clone()).map_err(|err| EffectError::InvalidParams {
        effect: effect.key(),
        reason: err.to_string(),
    })
}
