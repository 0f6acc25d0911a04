//! The resource catalog: every registered definition and group.
//!
//! Built once from static content. Construction validates the structural
//! invariants of groups so that the ledger can rely on them:
//!
//! - resource ids are unique, and no group parent reuses one;
//! - every child of a group is a registered resource;
//! - a resource belongs to at most one group;
//! - every parent id maps back to exactly one group.
//!
//! Group parents are registered as derived definitions, so the rest of the
//! engine can look them up like any other resource.

use std::collections::BTreeMap;

use kingdom_types::{
    GroupId, ResourceDefinition, ResourceGroupDefinition, ResourceId, TierTrack,
};

use crate::LedgerError;
use crate::groups;

/// Registered resource definitions and groups.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    /// Every definition, group parents included.
    definitions: BTreeMap<ResourceId, ResourceDefinition>,
    /// Groups with their children normalised into display order.
    groups: BTreeMap<GroupId, ResourceGroupDefinition>,
    /// Child resource -> owning group.
    membership: BTreeMap<ResourceId, GroupId>,
    /// Parent resource -> group it summarises.
    parents: BTreeMap<ResourceId, GroupId>,
    /// Deterministic display order.
    ordered: Vec<ResourceId>,
}

impl ResourceCatalog {
    /// Register `resources` and `groups`, validating group structure.
    ///
    /// Membership may be declared on the group (`childIds`) or on the
    /// resource (`groupId`); both sources are merged and must agree.
    pub fn new(
        resources: Vec<ResourceDefinition>,
        groups: Vec<ResourceGroupDefinition>,
    ) -> Result<Self, LedgerError> {
        let mut definitions: BTreeMap<ResourceId, ResourceDefinition> = BTreeMap::new();
        for def in resources {
            if definitions.contains_key(&def.id) {
                return Err(LedgerError::DuplicateResource(def.id));
            }
            definitions.insert(def.id.clone(), def);
        }

        let mut group_map: BTreeMap<GroupId, ResourceGroupDefinition> = BTreeMap::new();
        let mut membership: BTreeMap<ResourceId, GroupId> = BTreeMap::new();
        let mut parents: BTreeMap<ResourceId, GroupId> = BTreeMap::new();

        for group in groups {
            if group_map.contains_key(&group.id) {
                return Err(LedgerError::DuplicateGroup(group.id));
            }
            let parent_id = group.parent.id.clone();
            if definitions.contains_key(&parent_id) || parents.contains_key(&parent_id) {
                return Err(LedgerError::DuplicateResource(parent_id));
            }
            for child in &group.child_ids {
                if !definitions.contains_key(child) {
                    return Err(LedgerError::UnknownGroupChild {
                        group: group.id.clone(),
                        child: child.clone(),
                    });
                }
                claim_membership(&mut membership, child, &group.id)?;
            }
            parents.insert(parent_id, group.id.clone());
            group_map.insert(group.id.clone(), group);
        }

        for def in definitions.values() {
            let Some(group_id) = &def.group_id else {
                continue;
            };
            let Some(group) = group_map.get_mut(group_id) else {
                return Err(LedgerError::UnknownGroup {
                    resource: def.id.clone(),
                    group: group_id.clone(),
                });
            };
            if claim_membership(&mut membership, &def.id, group_id)? {
                group.child_ids.push(def.id.clone());
            }
        }

        for group in group_map.values_mut() {
            let mut children: Vec<&ResourceDefinition> = group
                .child_ids
                .iter()
                .filter_map(|child| definitions.get(child))
                .collect();
            children.sort_by(|a, b| groups::by_order_then_id(a, b));
            children.dedup_by(|a, b| a.id == b.id);
            group.child_ids = children.into_iter().map(|def| def.id.clone()).collect();
        }

        let ordered = groups::ordered_resource_ids(&definitions, &group_map, &membership);

        for group in group_map.values() {
            let parent = &group.parent;
            let mut def = ResourceDefinition::new(parent.id.clone(), parent.label.clone());
            def.icon.clone_from(&parent.icon);
            def.description.clone_from(&parent.description);
            def.order = group.order;
            def.display_as_percent = parent.display_as_percent;
            definitions.insert(parent.id.clone(), def);
        }

        Ok(Self {
            definitions,
            groups: group_map,
            membership,
            parents,
            ordered,
        })
    }

    /// Look up a definition (group parents included).
    pub fn definition(&self, id: &str) -> Option<&ResourceDefinition> {
        self.definitions.get(id)
    }

    /// Return the definition or fail with [`LedgerError::UnknownResource`].
    pub fn assert_known_resource(&self, id: &str) -> Result<&ResourceDefinition, LedgerError> {
        self.definitions
            .get(id)
            .ok_or_else(|| LedgerError::UnknownResource(ResourceId::new(id)))
    }

    /// Whether `id` is a registered resource.
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Whether `id` is a derived group parent.
    pub fn is_parent(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    /// The group `resource` belongs to, if any.
    pub fn group_of(&self, resource: &str) -> Option<&ResourceGroupDefinition> {
        self.membership
            .get(resource)
            .and_then(|group_id| self.groups.get(group_id))
    }

    /// The group summarised by the parent `resource`, if any.
    pub fn group_for_parent(&self, resource: &str) -> Option<&ResourceGroupDefinition> {
        self.parents
            .get(resource)
            .and_then(|group_id| self.groups.get(group_id))
    }

    /// Look up a group by id.
    pub fn group(&self, id: &str) -> Option<&ResourceGroupDefinition> {
        self.groups.get(id)
    }

    /// All groups, ordered by id.
    pub fn groups(&self) -> impl Iterator<Item = &ResourceGroupDefinition> {
        self.groups.values()
    }

    /// All definitions (group parents included), ordered by id.
    pub fn definitions(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.definitions.values()
    }

    /// Deterministic display order without duplicates.
    pub fn ordered(&self) -> &[ResourceId] {
        &self.ordered
    }

    /// Display label of `id`, falling back to the id itself.
    pub fn label(&self, id: &str) -> String {
        self.definitions
            .get(id)
            .map_or_else(|| id.to_owned(), |def| def.label.clone())
    }

    /// Resources charged on every action, with their per-action amount.
    pub fn global_action_costs(&self) -> impl Iterator<Item = (&ResourceId, f64)> {
        self.definitions
            .values()
            .filter_map(|def| def.global_action_cost.map(|cost| (&def.id, cost.amount)))
    }

    /// Resources carrying a tier track.
    pub fn tier_tracks(&self) -> impl Iterator<Item = (&ResourceId, &TierTrack)> {
        self.definitions
            .values()
            .filter_map(|def| def.tier_track.as_ref().map(|track| (&def.id, track)))
    }
}

/// Record that `resource` belongs to `group`.
///
/// Returns `Ok(true)` for a new membership, `Ok(false)` if it was already
/// recorded for the same group.
fn claim_membership(
    membership: &mut BTreeMap<ResourceId, GroupId>,
    resource: &ResourceId,
    group: &GroupId,
) -> Result<bool, LedgerError> {
    match membership.get(resource) {
        Some(existing) if existing == group => Ok(false),
        Some(existing) => Err(LedgerError::ResourceInMultipleGroups {
            resource: resource.clone(),
            first: existing.clone(),
            second: group.clone(),
        }),
        None => {
            membership.insert(resource.clone(), group.clone());
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use kingdom_types::{GroupRelation, ParentDisplay};

    use super::*;

    fn def(id: &str, order: i32) -> ResourceDefinition {
        let mut def = ResourceDefinition::new(id, id.to_uppercase());
        def.order = order;
        def
    }

    fn group(id: &str, parent: &str, children: &[&str]) -> ResourceGroupDefinition {
        ResourceGroupDefinition {
            id: GroupId::new(id),
            order: 5,
            parent: ParentDisplay {
                id: ResourceId::new(parent),
                label: "Population".to_owned(),
                icon: String::new(),
                description: String::new(),
                display_as_percent: false,
            },
            relation: GroupRelation::SumOfAll,
            child_ids: children.iter().map(|c| ResourceId::new(*c)).collect(),
        }
    }

    #[test]
    fn registers_parents_as_derived_definitions() {
        let catalog = ResourceCatalog::new(
            vec![def("council", 1), def("legion", 2), def("gold", 0)],
            vec![group("population", "population_total", &["legion", "council"])],
        );
        assert!(catalog.is_ok());
        let catalog = catalog.unwrap_or_default();

        assert!(catalog.is_parent("population_total"));
        assert!(catalog.contains("population_total"));
        assert_eq!(catalog.label("population_total"), "Population");
        let members: Vec<&str> = catalog
            .group_of("legion")
            .map(|g| g.child_ids.iter().map(ResourceId::as_str).collect())
            .unwrap_or_default();
        assert_eq!(members, vec!["council", "legion"]);
        assert!(catalog.group_for_parent("population_total").is_some());
    }

    #[test]
    fn merges_group_id_declared_on_resource() {
        let mut farmer = def("farmer", 3);
        farmer.group_id = Some(GroupId::new("population"));
        let catalog = ResourceCatalog::new(
            vec![def("council", 1), farmer],
            vec![group("population", "population_total", &["council"])],
        )
        .unwrap_or_default();
        let children = catalog
            .group("population")
            .map(|g| g.child_ids.len())
            .unwrap_or_default();
        assert_eq!(children, 2);
    }

    #[test]
    fn rejects_unknown_child() {
        let result = ResourceCatalog::new(
            vec![def("council", 1)],
            vec![group("population", "population_total", &["ghost"])],
        );
        assert!(matches!(result, Err(LedgerError::UnknownGroupChild { .. })));
    }

    #[test]
    fn rejects_resource_in_two_groups() {
        let result = ResourceCatalog::new(
            vec![def("council", 1)],
            vec![
                group("population", "population_total", &["council"]),
                group("nobility", "nobility_total", &["council"]),
            ],
        );
        assert!(matches!(
            result,
            Err(LedgerError::ResourceInMultipleGroups { .. })
        ));
    }

    #[test]
    fn rejects_parent_colliding_with_resource() {
        let result = ResourceCatalog::new(
            vec![def("council", 1), def("population_total", 0)],
            vec![group("population", "population_total", &["council"])],
        );
        assert!(matches!(result, Err(LedgerError::DuplicateResource(_))));
    }

    #[test]
    fn rejects_duplicate_resources() {
        let result = ResourceCatalog::new(vec![def("gold", 1), def("gold", 2)], Vec::new());
        assert!(matches!(result, Err(LedgerError::DuplicateResource(_))));
    }

    #[test]
    fn unknown_resources_are_reported() {
        let catalog = ResourceCatalog::new(vec![def("gold", 1)], Vec::new()).unwrap_or_default();
        assert!(catalog.assert_known_resource("gold").is_ok());
        assert_eq!(
            catalog.assert_known_resource("mana").err(),
            Some(LedgerError::UnknownResource(ResourceId::new("mana")))
        );
    }

    #[test]
    fn ordered_has_no_duplicates() {
        let catalog = ResourceCatalog::new(
            vec![def("council", 1), def("legion", 2), def("gold", 0)],
            vec![group("population", "population_total", &["legion", "council", "legion"])],
        )
        .unwrap_or_default();
        let ids: Vec<&str> = catalog.ordered().iter().map(ResourceId::as_str).collect();
        assert_eq!(ids, vec!["gold", "population_total", "council", "legion"]);
    }
}
