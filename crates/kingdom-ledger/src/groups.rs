//! Resource group aggregation.
//!
//! A group parent is never mutated directly. Whenever a child changes, the
//! parent is recomputed from scratch over the current child amounts, so
//! recomputing twice without a child change yields the same value and no
//! delta is ever counted twice.
//!
//! This module also produces the deterministic display order used by the
//! snapshot: top-level entries (ungrouped resources and groups) sorted by
//! `order` then id; each group contributes its parent followed by its
//! children sorted by their own `order` then id.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use kingdom_types::{GroupId, GroupRelation, ResourceDefinition, ResourceGroupDefinition, ResourceId};

use crate::ledger::RollupChange;

/// Compute the parent value of `group` from the given amounts.
pub fn rollup_value(group: &ResourceGroupDefinition, amounts: &BTreeMap<ResourceId, f64>) -> f64 {
    match group.relation {
        GroupRelation::SumOfAll => group
            .child_ids
            .iter()
            .map(|child| amounts.get(child).copied().unwrap_or(0.0))
            .sum(),
    }
}

/// Recompute and store the parent value of `group`.
pub fn recompute_parent(
    group: &ResourceGroupDefinition,
    amounts: &mut BTreeMap<ResourceId, f64>,
) -> RollupChange {
    let current = rollup_value(group, amounts);
    let previous = amounts
        .insert(group.parent.id.clone(), current)
        .unwrap_or(0.0);
    RollupChange {
        parent: group.parent.id.clone(),
        previous,
        current,
    }
}

/// Order two definitions by `order`, then lexicographically by id.
pub fn by_order_then_id(a: &ResourceDefinition, b: &ResourceDefinition) -> Ordering {
    a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id))
}

/// A top-level entry of the display order.
enum TopLevel<'a> {
    Resource(&'a ResourceDefinition),
    Group(&'a ResourceGroupDefinition),
}

impl TopLevel<'_> {
    const fn order(&self) -> i32 {
        match self {
            Self::Resource(def) => def.order,
            Self::Group(group) => group.order,
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::Resource(def) => def.id.as_str(),
            Self::Group(group) => group.id.as_str(),
        }
    }
}

/// Build the deterministic, duplicate-free display order.
///
/// `definitions` must not contain group parents; `groups` must carry their
/// children already sorted (the catalog normalises them).
pub fn ordered_resource_ids(
    definitions: &BTreeMap<ResourceId, ResourceDefinition>,
    groups: &BTreeMap<GroupId, ResourceGroupDefinition>,
    membership: &BTreeMap<ResourceId, GroupId>,
) -> Vec<ResourceId> {
    let mut entries: Vec<TopLevel<'_>> = definitions
        .values()
        .filter(|def| !membership.contains_key(&def.id))
        .map(TopLevel::Resource)
        .chain(groups.values().map(TopLevel::Group))
        .collect();
    entries.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));

    let mut seen: BTreeSet<ResourceId> = BTreeSet::new();
    let mut ordered = Vec::new();
    let mut push = |id: &ResourceId| {
        if seen.insert(id.clone()) {
            ordered.push(id.clone());
        }
    };

    for entry in &entries {
        match entry {
            TopLevel::Resource(def) => push(&def.id),
            TopLevel::Group(group) => {
                push(&group.parent.id);
                for child in &group.child_ids {
                    push(child);
                }
            }
        }
    }
    ordered
}
