//! The player-scoped execution context handed to effect handlers.

use kingdom_ledger::{ResourceCatalog, ResourceChange};
use kingdom_types::{EffectDef, ResourceGain};

use crate::config::RulesConfig;
use crate::content::ContentRegistry;
use crate::error::EffectError;
use crate::player::PlayerState;
use crate::registry::EffectRegistry;

/// Everything a handler may read or mutate while applying an effect.
///
/// The static parts (registry, content, rules) are shared borrows; only the
/// player is mutable. Resource changes are collected in `gains` so the
/// session can build its recent-gain feed.
#[derive(Debug)]
pub struct EffectContext<'a> {
    /// Handler dispatch table.
    pub registry: &'a EffectRegistry,
    /// Static content (catalog, buildings, developments, ...).
    pub content: &'a ContentRegistry,
    /// Global rule parameters.
    pub rules: &'a RulesConfig,
    /// The player the effects apply to.
    pub player: &'a mut PlayerState,
    /// Resource changes recorded so far, oldest first.
    pub gains: Vec<ResourceGain>,
}

impl<'a> EffectContext<'a> {
    /// Build a context for `player`.
    pub const fn new(
        registry: &'a EffectRegistry,
        content: &'a ContentRegistry,
        rules: &'a RulesConfig,
        player: &'a mut PlayerState,
    ) -> Self {
        Self {
            registry,
            content,
            rules,
            player,
            gains: Vec::new(),
        }
    }

    /// The resource catalog.
    pub const fn catalog(&self) -> &'a ResourceCatalog {
        self.content.catalog()
    }

    /// Apply one effect with multiplier `mult`.
    pub fn apply(&mut self, effect: &EffectDef, mult: u32) -> Result<(), EffectError> {
        let registry = self.registry;
        registry.apply(self, effect, mult)
    }

    /// Apply effects left to right; each sees the mutations of the previous.
    pub fn apply_all(&mut self, effects: &[EffectDef]) -> Result<(), EffectError> {
        for effect in effects {
            self.apply(effect, 1)?;
        }
        Ok(())
    }

    /// Record the gains of a ledger change, attributed to the player.
    pub fn record(&mut self, change: &ResourceChange) {
        let player = self.player.id.clone();
        self.gains.extend(change.gains().into_iter().map(|mut gain| {
            gain.player_id = Some(player.clone());
            gain
        }));
    }

    /// Take the gains recorded so far.
    pub fn take_gains(&mut self) -> Vec<ResourceGain> {
        std::mem::take(&mut self.gains)
    }
}
