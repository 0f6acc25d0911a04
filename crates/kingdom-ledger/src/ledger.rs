//! Per-player resource state.
//!
//! [`PlayerResources`] owns the amounts and the live bounds of one player.
//! All mutation goes through [`PlayerResources::apply`],
//! [`PlayerResources::set_amount`] and [`PlayerResources::set_bounds`],
//! which enforce the ledger invariants:
//!
//! - every stored key has a definition in the catalog;
//! - every amount is finite;
//! - every amount lies within its bounds after each mutation;
//! - every group parent equals the rollup of its children.
//!
//! A mutation that would break a bound either clamps (when the caller asked
//! for [`Reconciliation::Clamp`]) or fails and leaves the state untouched.

use std::collections::BTreeMap;

use kingdom_types::{Reconciliation, ResourceBounds, ResourceGain, ResourceId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LedgerError;
use crate::catalog::ResourceCatalog;
use crate::delta::ResourceDelta;
use crate::groups;

// ---------------------------------------------------------------------------
// Change records
// ---------------------------------------------------------------------------

/// Before/after values of a group parent after a child changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupChange {
    /// The parent resource.
    pub parent: ResourceId,
    /// Parent value before the recomputation.
    pub previous: f64,
    /// Parent value after the recomputation.
    pub current: f64,
}

/// Outcome of a single ledger mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceChange {
    /// The resource that was written.
    pub resource: ResourceId,
    /// Amount before the mutation.
    pub previous: f64,
    /// Amount after the mutation (after rounding and clamping).
    pub current: f64,
    /// Parent recomputation, when the resource belongs to a group.
    pub rollup: Option<RollupChange>,
}

impl ResourceChange {
    /// Signed change of the written resource.
    pub fn delta(&self) -> f64 {
        self.current - self.previous
    }

    /// Gain records for the resource and its parent, skipping zero changes.
    pub fn gains(&self) -> Vec<ResourceGain> {
        let mut gains = Vec::with_capacity(2);
        push_gain(&mut gains, &self.resource, self.previous, self.current);
        if let Some(rollup) = &self.rollup {
            push_gain(&mut gains, &rollup.parent, rollup.previous, rollup.current);
        }
        gains
    }
}

fn push_gain(gains: &mut Vec<ResourceGain>, resource: &ResourceId, previous: f64, current: f64) {
    let amount = current - previous;
    if amount.abs() > f64::EPSILON {
        gains.push(ResourceGain {
            player_id: None,
            resource_id: resource.clone(),
            amount,
        });
    }
}

// ---------------------------------------------------------------------------
// Player resources
// ---------------------------------------------------------------------------

/// Amounts and live bounds of one player.
///
/// Serialises as plain JSON (`{"amounts": {...}, "bounds": {...}}`). Since
/// amounts are always finite, the JSON round-trip is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResources {
    amounts: BTreeMap<ResourceId, f64>,
    #[serde(default)]
    bounds: BTreeMap<ResourceId, ResourceBounds>,
}

impl PlayerResources {
    /// Seed a player from the catalog.
    ///
    /// Every non-derived resource starts at zero clamped into its default
    /// bounds; parents start at the rollup of their children.
    pub fn new(catalog: &ResourceCatalog) -> Self {
        let mut resources = Self::default();
        for def in catalog.definitions() {
            if catalog.is_parent(def.id.as_str()) {
                continue;
            }
            let bounds = def.default_bounds();
            resources.amounts.insert(def.id.clone(), bounds.clamp(0.0));
            if !bounds.is_unbounded() {
                resources.bounds.insert(def.id.clone(), bounds);
            }
        }
        resources.rebuild_rollups(catalog);
        resources
    }

    /// Current amount of `id`, zero when never written.
    pub fn amount(&self, id: &str) -> f64 {
        self.amounts.get(id).copied().unwrap_or(0.0)
    }

    /// Current amount of `id`, failing if the resource is unknown.
    pub fn amount_of(&self, catalog: &ResourceCatalog, id: &str) -> Result<f64, LedgerError> {
        catalog.assert_known_resource(id)?;
        Ok(self.amount(id))
    }

    /// Live bounds of `id`, unbounded when none are set.
    pub fn bounds(&self, id: &str) -> ResourceBounds {
        self.bounds.get(id).copied().unwrap_or_default()
    }

    /// All stored amounts.
    pub const fn amounts(&self) -> &BTreeMap<ResourceId, f64> {
        &self.amounts
    }

    /// All stored bounds.
    pub const fn all_bounds(&self) -> &BTreeMap<ResourceId, ResourceBounds> {
        &self.bounds
    }

    /// Apply a delta.
    ///
    /// The magnitude is rounded (if the delta carries a rounding mode)
    /// before the amount changes; the result is then reconciled with the
    /// bounds. Group parents are recomputed afterwards.
    pub fn apply(
        &mut self,
        catalog: &ResourceCatalog,
        delta: &ResourceDelta,
    ) -> Result<ResourceChange, LedgerError> {
        let id = delta.resource();
        Self::assert_writable(catalog, id)?;
        let signed = delta.signed_amount()?;
        let attempted = self.amount(id.as_str()) + signed;
        self.write(catalog, id, attempted, delta.reconciliation())
    }

    /// Set the amount of `id` directly, e.g. to seed start values.
    pub fn set_amount(
        &mut self,
        catalog: &ResourceCatalog,
        id: &ResourceId,
        value: f64,
        reconciliation: Reconciliation,
    ) -> Result<ResourceChange, LedgerError> {
        Self::assert_writable(catalog, id)?;
        self.write(catalog, id, value, reconciliation)
    }

    /// Replace the bounds of `id`.
    ///
    /// If the current amount falls outside the new bounds it is clamped
    /// under [`Reconciliation::Clamp`]; under [`Reconciliation::Reject`] the
    /// call fails and the old bounds stay in force.
    pub fn set_bounds(
        &mut self,
        catalog: &ResourceCatalog,
        id: &ResourceId,
        bounds: ResourceBounds,
        reconciliation: Reconciliation,
    ) -> Result<ResourceChange, LedgerError> {
        Self::assert_writable(catalog, id)?;
        let finite = bounds.lower_bound.is_none_or(f64::is_finite)
            && bounds.upper_bound.is_none_or(f64::is_finite);
        let ordered = match (bounds.lower_bound, bounds.upper_bound) {
            (Some(lower), Some(upper)) => lower <= upper,
            _ => true,
        };
        if !finite || !ordered {
            return Err(LedgerError::InvalidBounds {
                resource: id.clone(),
                bounds,
            });
        }

        let current = self.amount(id.as_str());
        if !bounds.contains(current) && reconciliation == Reconciliation::Reject {
            return Err(LedgerError::BoundViolation {
                resource: id.clone(),
                attempted: current,
                bounds,
            });
        }

        if bounds.is_unbounded() {
            self.bounds.remove(id);
        } else {
            self.bounds.insert(id.clone(), bounds);
        }
        debug!(resource = %id, ?bounds, "bounds replaced");
        self.write(catalog, id, current, Reconciliation::Clamp)
    }

    /// Recompute every group parent from its children.
    pub fn rebuild_rollups(&mut self, catalog: &ResourceCatalog) {
        for group in catalog.groups() {
            groups::recompute_parent(group, &mut self.amounts);
        }
    }

    /// Check the ledger invariants, e.g. after deserialising persisted state.
    pub fn validate(&self, catalog: &ResourceCatalog) -> Result<(), LedgerError> {
        for (id, amount) in &self.amounts {
            catalog.assert_known_resource(id.as_str())?;
            if !amount.is_finite() {
                return Err(LedgerError::InvalidAmount {
                    resource: id.clone(),
                    amount: *amount,
                });
            }
            let bounds = self.bounds(id.as_str());
            if !bounds.contains(*amount) {
                return Err(LedgerError::BoundViolation {
                    resource: id.clone(),
                    attempted: *amount,
                    bounds,
                });
            }
        }
        for id in self.bounds.keys() {
            catalog.assert_known_resource(id.as_str())?;
        }
        Ok(())
    }

    fn assert_writable(catalog: &ResourceCatalog, id: &ResourceId) -> Result<(), LedgerError> {
        catalog.assert_known_resource(id.as_str())?;
        if catalog.is_parent(id.as_str()) {
            return Err(LedgerError::DerivedResource(id.clone()));
        }
        Ok(())
    }

    fn write(
        &mut self,
        catalog: &ResourceCatalog,
        id: &ResourceId,
        attempted: f64,
        reconciliation: Reconciliation,
    ) -> Result<ResourceChange, LedgerError> {
        if !attempted.is_finite() {
            return Err(LedgerError::InvalidAmount {
                resource: id.clone(),
                amount: attempted,
            });
        }
        let bounds = self.bounds(id.as_str());
        let current = if bounds.contains(attempted) {
            attempted
        } else {
            match reconciliation {
                Reconciliation::Clamp => bounds.clamp(attempted),
                Reconciliation::Reject => {
                    return Err(LedgerError::BoundViolation {
                        resource: id.clone(),
                        attempted,
                        bounds,
                    });
                }
            }
        };

        let previous = self
            .amounts
            .insert(id.clone(), current)
            .unwrap_or(0.0);
        let rollup = catalog
            .group_of(id.as_str())
            .map(|group| groups::recompute_parent(group, &mut self.amounts));

        debug!(resource = %id, previous, current, attempted, "resource written");
        Ok(ResourceChange {
            resource: id.clone(),
            previous,
            current,
            rollup,
        })
    }
}
