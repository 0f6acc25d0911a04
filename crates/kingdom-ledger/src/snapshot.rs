//! Deep-copied resource views for the transport layer.

use kingdom_types::{GroupSnapshot, ResourceSnapshot};

use crate::catalog::ResourceCatalog;
use crate::ledger::PlayerResources;

/// Build an owned [`ResourceSnapshot`] of `resources`.
///
/// The result shares nothing with the live ledger: later mutations of
/// `resources` never show up in a snapshot taken earlier.
pub fn resource_snapshot(catalog: &ResourceCatalog, resources: &PlayerResources) -> ResourceSnapshot {
    let mut groups: Vec<GroupSnapshot> = catalog
        .groups()
        .map(|group| GroupSnapshot {
            id: group.id.clone(),
            parent_id: group.parent.id.clone(),
            relation: group.relation,
            child_ids: group.child_ids.clone(),
        })
        .collect();
    groups.sort_by(|a, b| {
        let order = |id: &str| catalog.group(id).map_or(0, |g| g.order);
        order(a.id.as_str())
            .cmp(&order(b.id.as_str()))
            .then_with(|| a.id.cmp(&b.id))
    });

    ResourceSnapshot {
        amounts: resources.amounts().clone(),
        bounds: resources.all_bounds().clone(),
        ordered: catalog.ordered().to_vec(),
        groups,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_types::{
        GroupId, GroupRelation, ParentDisplay, ResourceDefinition, ResourceGroupDefinition,
        ResourceId,
    };

    use super::*;
    use crate::ResourceDelta;

    #[test]
    fn snapshot_is_independent_of_live_state() {
        let population = ResourceGroupDefinition {
            id: GroupId::new("population"),
            order: 1,
            parent: ParentDisplay {
                id: ResourceId::new("population_total"),
                label: "Population".to_owned(),
                icon: String::new(),
                description: String::new(),
                display_as_percent: false,
            },
            relation: GroupRelation::SumOfAll,
            child_ids: vec![ResourceId::new("council")],
        };
        let catalog = ResourceCatalog::new(
            vec![
                ResourceDefinition::new("gold", "Gold"),
                ResourceDefinition::new("council", "Council"),
            ],
            vec![population],
        )
        .unwrap();
        let mut resources = PlayerResources::new(&catalog);
        resources.apply(&catalog, &ResourceDelta::add("council", 2.0)).unwrap();

        let before = resource_snapshot(&catalog, &resources);
        resources.apply(&catalog, &ResourceDelta::add("council", 5.0)).unwrap();
        let after = resource_snapshot(&catalog, &resources);

        assert_eq!(before.amounts.get("population_total").copied(), Some(2.0));
        assert_eq!(after.amounts.get("population_total").copied(), Some(7.0));
        assert_eq!(before.ordered, after.ordered);
        assert_eq!(before.groups.len(), 1);
        assert_eq!(
            before.groups.first().map(|g| g.parent_id.as_str()),
            Some("population_total")
        );
    }
}
