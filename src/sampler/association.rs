//! Association prior: Dirichlet-process grouping
//!
//! Partitions a parent intentional activity's trajectory set into
//! role-labeled groups: a Chinese Restaurant Process table assignment
//! over the individuals, plus one categorical role draw per table.

use crate::common::rng::Rng;
use crate::errors::ModelError;
use crate::library::ActivityLibrary;
use crate::model::{Description, NodeId, TrajectorySet};

/// One role-labeled group of individuals.
#[derive(Debug, Clone)]
pub struct Group {
    /// Role label drawn for this group's sequence
    pub role: String,
    /// Individuals assigned to the group
    pub trajectories: TrajectorySet,
}

/// A complete partition of a parent's trajectory set.
#[derive(Debug, Clone)]
pub struct Association {
    /// Groups in table order
    pub groups: Vec<Group>,
}

impl Association {
    /// Number of groups
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no groups were formed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Sample an association over `parent`'s trajectory set.
///
/// Table assignment uses the CRP with the parent activity's
/// concentration; each table's role is an independent categorical draw
/// from the parent's role distribution. Table member *positions* map to
/// trajectory-set elements by rank (position `k` resolves to the k-th
/// smallest index), not by raw trajectory id.
///
/// Post-condition (checked): the union of all group sets equals the
/// parent's set exactly; a mismatch is a fatal consistency error.
pub fn sample_association(
    rng: &mut impl Rng,
    desc: &Description,
    parent: NodeId,
    library: &ActivityLibrary,
) -> Result<Association, ModelError> {
    let parent_activity = desc.node(parent)?;
    let parent_set = parent_activity.trajectories();
    let n = parent_set.len();

    let alpha = library.concentration(parent_activity.name())?;
    let tables = rng.crp_assignment(n, alpha);
    let num_tables = tables.iter().max().map(|&t| t + 1).unwrap_or(0);

    let role_dist = library.role_distribution(parent_activity.name())?;
    let dist = role_dist.as_slice();

    let mut groups = Vec::with_capacity(num_tables);
    for table in 0..num_tables {
        let role_index = rng.categorical(dist);
        let role = library.role_name(role_index)?.to_string();

        let mut members = TrajectorySet::new();
        for (position, &assigned) in tables.iter().enumerate() {
            if assigned == table {
                let index = parent_set.nth(position).ok_or_else(|| ModelError::Consistency {
                    description: format!("CRP position {} outside parent set", position),
                })?;
                members.insert(index);
            }
        }
        groups.push(Group {
            role,
            trajectories: members,
        });
    }

    let mut union = TrajectorySet::new();
    for group in &groups {
        union.union_with(&group.trajectories);
    }
    if union != *parent_set {
        return Err(ModelError::Consistency {
            description: format!(
                "association union {:?} does not equal parent set {:?}",
                union.as_slice(),
                parent_set.as_slice()
            ),
        });
    }

    log::trace!(
        "association for {:?}: {} individuals into {} groups",
        parent_activity.name(),
        n,
        groups.len()
    );
    Ok(Association { groups })
}
