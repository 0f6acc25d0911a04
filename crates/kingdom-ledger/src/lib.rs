//! ResourceV2 ledger for the Kingdom Builder rules engine.
//!
//! Every per-player resource amount lives in a [`PlayerResources`] ledger.
//! The ledger never stores a non-finite value, never leaves an amount
//! outside its bounds, and keeps every group parent equal to the rollup of
//! its children.
//!
//! # Architecture
//!
//! - [`catalog`] -- The [`ResourceCatalog`]: registered definitions and groups.
//! - [`delta`] -- The [`ResourceDelta`] builder for validated mutations.
//! - [`rounding`] -- The engine's rounding policy ([`round`]).
//! - [`ledger`] -- The [`PlayerResources`] state and its mutation methods.
//! - [`groups`] -- Parent rollups and the deterministic display order.
//! - [`snapshot`] -- Deep-copied [`ResourceSnapshot`] views.
//!
//! # Usage
//!
//! ```
//! use kingdom_ledger::{PlayerResources, ResourceCatalog, ResourceDelta};
//! use kingdom_types::ResourceDefinition;
//!
//! let catalog = ResourceCatalog::new(vec![ResourceDefinition::new("gold", "Gold")], Vec::new())
//!     .ok();
//! if let Some(catalog) = catalog {
//!     let mut resources = PlayerResources::new(&catalog);
//!     let change = resources.apply(&catalog, &ResourceDelta::add("gold", 3.0));
//!     assert!(change.is_ok());
//!     assert!((resources.amount("gold") - 3.0).abs() < f64::EPSILON);
//! }
//! ```
//!
//! [`ResourceSnapshot`]: kingdom_types::ResourceSnapshot

pub mod catalog;
pub mod delta;
pub mod groups;
pub mod ledger;
pub mod rounding;
pub mod snapshot;

// Re-export primary types at crate root.
pub use catalog::ResourceCatalog;
pub use delta::ResourceDelta;
pub use ledger::{PlayerResources, ResourceChange, RollupChange};
pub use rounding::round;
pub use snapshot::resource_snapshot;

use kingdom_types::{GroupId, ResourceBounds, ResourceId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the catalog and the ledger.
///
/// All of them are contract violations by the caller (malformed content or
/// a malformed effect) and are meant to propagate, not to be recovered from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// The resource id has no registered definition.
    #[error("unknown resource: {0}")]
    UnknownResource(ResourceId),

    /// A delta or a resulting amount was NaN or infinite.
    #[error("invalid amount for {resource}: {amount} is not finite")]
    InvalidAmount {
        /// The resource being mutated.
        resource: ResourceId,
        /// The offending value.
        amount: f64,
    },

    /// The resource is a group parent and can only change through its children.
    #[error("resource {0} is derived from its group and cannot be mutated directly")]
    DerivedResource(ResourceId),

    /// A mutation would leave the amount outside its bounds and clamping was
    /// not requested.
    #[error("resource {resource} would become {attempted}, outside bounds {bounds:?}")]
    BoundViolation {
        /// The resource being mutated.
        resource: ResourceId,
        /// The amount the mutation would have produced.
        attempted: f64,
        /// The bounds in force.
        bounds: ResourceBounds,
    },

    /// Bounds whose lower side exceeds the upper side.
    #[error("invalid bounds for {resource}: {bounds:?}")]
    InvalidBounds {
        /// The resource whose bounds were being set.
        resource: ResourceId,
        /// The rejected bounds.
        bounds: ResourceBounds,
    },

    /// Two definitions (or a definition and a group parent) share an id.
    #[error("duplicate resource id: {0}")]
    DuplicateResource(ResourceId),

    /// Two groups share an id.
    #[error("duplicate group id: {0}")]
    DuplicateGroup(GroupId),

    /// A resource names a group that does not exist.
    #[error("resource {resource} references unknown group {group}")]
    UnknownGroup {
        /// The resource declaring the membership.
        resource: ResourceId,
        /// The missing group.
        group: GroupId,
    },

    /// A group lists a child that is not a registered resource.
    #[error("group {group} lists unregistered child {child}")]
    UnknownGroupChild {
        /// The group.
        group: GroupId,
        /// The missing child.
        child: ResourceId,
    },

    /// A resource was placed in two groups.
    #[error("resource {resource} belongs to both {first} and {second}")]
    ResourceInMultipleGroups {
        /// The resource.
        resource: ResourceId,
        /// The first group claiming it.
        first: GroupId,
        /// The second group claiming it.
        second: GroupId,
    },
}
