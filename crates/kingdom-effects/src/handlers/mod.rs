//! Built-in effect handlers.
//!
//! # Submodules
//!
//! - [`resource`] -- `resource.add`, `resource.remove`, `resource.increase_upper_bound`.
//! - [`land`] -- `land.add`, `land.till`.
//! - [`building`] -- `building.add`, `building.remove`.
//! - [`development`] -- `development.add`, `development.remove`.
//! - [`passive`] -- `passive.add`, `passive.remove`.
//! - [`phase_skip`] -- `phase_skip.add`, `phase_skip.remove`.

pub mod building;
pub mod development;
pub mod land;
pub mod passive;
pub mod phase_skip;
pub mod resource;

use crate::registry::EffectRegistry;

/// Register every built-in handler on `registry`.
pub fn register_builtin(registry: &mut EffectRegistry) {
    registry.register("resource", "add", resource::handle_add);
    registry.register("resource", "remove", resource::handle_remove);
    registry.register(
        "resource",
        "increase_upper_bound",
        resource::handle_increase_upper_bound,
    );
    registry.register("land", "add", land::handle_add);
    registry.register("land", "till", land::handle_till);
    registry.register("building", "add", building::handle_add);
    registry.register("building", "remove", building::handle_remove);
    registry.register("development", "add", development::handle_add);
    registry.register("development", "remove", development::handle_remove);
    registry.register("passive", "add", passive::handle_add);
    registry.register("passive", "remove", passive::handle_remove);
    registry.register("phase_skip", "add", phase_skip::handle_add);
    registry.register("phase_skip", "remove", phase_skip::handle_remove);
}
