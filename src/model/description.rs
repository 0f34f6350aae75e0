//! Descriptions: arena-backed activity trees
//!
//! A [`Description`] owns the whole activity tree: a root intentional
//! activity plus a multi-valued association from parent node to child
//! activity sequences. Nodes live in arenas and are addressed through
//! tagged handles; a handle minted by one description is never valid in
//! another, which gives identity-based (not value-based) containment
//! and makes deep copy a plain structural copy under a fresh tag.

use std::sync::atomic::{AtomicU64, Ordering};

use super::activity::{Activity, IntentionalActivity, PhysicalActivity};
use super::sequence::ActivitySequence;
use super::trajectory_set::TrajectorySet;
use crate::errors::ModelError;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

fn fresh_tag() -> u64 {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

/// Handle to an intentional activity inside one description's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) tag: u64,
    pub(crate) index: usize,
}

/// Handle to a physical activity inside one description's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysId {
    pub(crate) tag: u64,
    pub(crate) index: usize,
}

/// Handle to an activity sequence inside one description's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeqId {
    pub(crate) tag: u64,
    pub(crate) index: usize,
}

/// Synthetic root activity name spanning the whole clip.
pub const ROOT_NAME: &str = "FFA";

/// The whole activity tree for one clip.
#[derive(Debug)]
pub struct Description {
    tag: u64,
    nodes: Vec<IntentionalActivity>,
    /// Parent node index per node; `None` for the root only.
    node_parents: Vec<Option<usize>>,
    physicals: Vec<PhysicalActivity>,
    sequences: Vec<ActivitySequence>,
    /// Ordered child-sequence indices per node index.
    children: Vec<Vec<usize>>,
}

impl Description {
    /// Create a description with a synthetic root spanning `[start, end]`.
    ///
    /// The trajectory set must be non-empty and contiguous from zero
    /// (`0..n`); both are precondition failures otherwise.
    pub fn new(
        start: usize,
        end: usize,
        trajectories: TrajectorySet,
    ) -> Result<Self, ModelError> {
        let root = IntentionalActivity::new(
            ROOT_NAME,
            start,
            end,
            nalgebra::DVector::zeros(0),
            Self::checked_root_set(trajectories)?,
        )?;
        Ok(Self::with_root(root))
    }

    /// Create a description from an explicit root activity.
    pub fn from_root(root: IntentionalActivity) -> Result<Self, ModelError> {
        Self::checked_root_set(root.trajectories().clone())?;
        Ok(Self::with_root(root))
    }

    fn checked_root_set(set: TrajectorySet) -> Result<TrajectorySet, ModelError> {
        if set.is_empty() {
            return Err(ModelError::Precondition {
                context: "description requires a non-empty trajectory set".to_string(),
            });
        }
        if !set.is_contiguous_from_zero() {
            return Err(ModelError::Precondition {
                context: format!(
                    "description trajectory indices must be contiguous from 0, got {:?}",
                    set.as_slice()
                ),
            });
        }
        Ok(set)
    }

    fn with_root(root: IntentionalActivity) -> Self {
        Self {
            tag: fresh_tag(),
            nodes: vec![root],
            node_parents: vec![None],
            physicals: Vec::new(),
            sequences: Vec::new(),
            children: vec![Vec::new()],
        }
    }

    /// Drop the whole tree and re-root it. Handles minted before the
    /// call become invalid (the identity tag changes).
    pub fn clear(&mut self, new_root: IntentionalActivity) -> Result<(), ModelError> {
        Self::checked_root_set(new_root.trajectories().clone())?;
        *self = Self::with_root(new_root);
        Ok(())
    }

    /// Handle of the root activity
    pub fn root(&self) -> NodeId {
        NodeId {
            tag: self.tag,
            index: 0,
        }
    }

    /// Identity-based containment: true only for handles minted by
    /// this description.
    pub fn contains(&self, id: NodeId) -> bool {
        id.tag == self.tag && id.index < self.nodes.len()
    }

    /// Identity-based containment for physical activity handles.
    pub fn contains_physical(&self, id: PhysId) -> bool {
        id.tag == self.tag && id.index < self.physicals.len()
    }

    fn check_node(&self, id: NodeId) -> Result<usize, ModelError> {
        if !self.contains(id) {
            return Err(ModelError::Precondition {
                context: "node handle does not belong to this description".to_string(),
            });
        }
        Ok(id.index)
    }

    fn check_physical(&self, id: PhysId) -> Result<usize, ModelError> {
        if !self.contains_physical(id) {
            return Err(ModelError::Precondition {
                context: "physical handle does not belong to this description".to_string(),
            });
        }
        Ok(id.index)
    }

    fn check_sequence(&self, id: SeqId) -> Result<usize, ModelError> {
        if id.tag != self.tag || id.index >= self.sequences.len() {
            return Err(ModelError::Precondition {
                context: "sequence handle does not belong to this description".to_string(),
            });
        }
        Ok(id.index)
    }

    /// Intentional activity behind a handle
    pub fn node(&self, id: NodeId) -> Result<&IntentionalActivity, ModelError> {
        Ok(&self.nodes[self.check_node(id)?])
    }

    /// Physical activity behind a handle
    pub fn physical(&self, id: PhysId) -> Result<&PhysicalActivity, ModelError> {
        Ok(&self.physicals[self.check_physical(id)?])
    }

    /// Mutable physical activity access (generative fill-in only)
    pub fn physical_mut(&mut self, id: PhysId) -> Result<&mut PhysicalActivity, ModelError> {
        let index = self.check_physical(id)?;
        Ok(&mut self.physicals[index])
    }

    /// Activity sequence behind a handle
    pub fn sequence(&self, id: SeqId) -> Result<&ActivitySequence, ModelError> {
        Ok(&self.sequences[self.check_sequence(id)?])
    }

    /// Add a child intentional activity under `parent`.
    ///
    /// The child's span must lie within the parent's and its trajectory
    /// set must be a subset of the parent's.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        node: IntentionalActivity,
    ) -> Result<NodeId, ModelError> {
        let parent_index = self.check_node(parent)?;
        {
            let p = &self.nodes[parent_index];
            if node.start() < p.start() || node.end() > p.end() {
                return Err(ModelError::Precondition {
                    context: format!(
                        "child span [{}, {}] outside parent span [{}, {}]",
                        node.start(),
                        node.end(),
                        p.start(),
                        p.end()
                    ),
                });
            }
            if !node.trajectories().is_subset_of(p.trajectories()) {
                return Err(ModelError::Precondition {
                    context: "child trajectory set is not a subset of the parent's".to_string(),
                });
            }
        }
        self.nodes.push(node);
        self.node_parents.push(Some(parent_index));
        self.children.push(Vec::new());
        Ok(NodeId {
            tag: self.tag,
            index: self.nodes.len() - 1,
        })
    }

    /// Add a physical activity leaf to the arena.
    pub fn add_physical(&mut self, phys: PhysicalActivity) -> PhysId {
        self.physicals.push(phys);
        PhysId {
            tag: self.tag,
            index: self.physicals.len() - 1,
        }
    }

    /// Attach a child sequence under `parent`.
    ///
    /// Checked invariants: every activity handle belongs to this
    /// description; intentional children were added under `parent`;
    /// consecutive activity spans tile the parent's `[start, end]`
    /// exactly, with no gaps or overlaps.
    pub fn attach_sequence(
        &mut self,
        parent: NodeId,
        sequence: ActivitySequence,
    ) -> Result<SeqId, ModelError> {
        let parent_index = self.check_node(parent)?;
        if sequence.is_empty() {
            return Err(ModelError::Precondition {
                context: "cannot attach an empty activity sequence".to_string(),
            });
        }

        let (parent_start, parent_end) = {
            let p = &self.nodes[parent_index];
            (p.start(), p.end())
        };

        let mut expected_start = parent_start;
        for activity in sequence.activities() {
            let (start, end) = self.activity_span(*activity)?;
            if start != expected_start {
                return Err(ModelError::Precondition {
                    context: format!(
                        "sequence does not tile parent span: activity starts at {}, expected {}",
                        start, expected_start
                    ),
                });
            }
            if let Activity::Intentional(child) = *activity {
                if self.node_parents[child.index] != Some(parent_index) {
                    return Err(ModelError::Consistency {
                        description: "sequence references a child added under a different parent"
                            .to_string(),
                    });
                }
            }
            expected_start = end + 1;
        }
        if expected_start != parent_end + 1 {
            return Err(ModelError::Precondition {
                context: format!(
                    "sequence ends at {}, parent span ends at {}",
                    expected_start - 1,
                    parent_end
                ),
            });
        }

        self.sequences.push(sequence);
        let index = self.sequences.len() - 1;
        self.children[parent_index].push(index);
        Ok(SeqId {
            tag: self.tag,
            index,
        })
    }

    /// Child sequences of a node, in attachment order
    pub fn children(&self, node: NodeId) -> Result<Vec<SeqId>, ModelError> {
        let index = self.check_node(node)?;
        Ok(self.children[index]
            .iter()
            .map(|&i| SeqId {
                tag: self.tag,
                index: i,
            })
            .collect())
    }

    /// Ancestors of a node, nearest first (root last; empty for the root)
    pub fn ancestors(&self, node: NodeId) -> Result<Vec<NodeId>, ModelError> {
        let mut index = self.check_node(node)?;
        let mut out = Vec::new();
        while let Some(parent) = self.node_parents[index] {
            out.push(NodeId {
                tag: self.tag,
                index: parent,
            });
            index = parent;
        }
        Ok(out)
    }

    /// Name of either activity kind
    pub fn activity_name(&self, activity: Activity) -> Result<&str, ModelError> {
        match activity {
            Activity::Physical(id) => Ok(self.physical(id)?.name()),
            Activity::Intentional(id) => Ok(self.node(id)?.name()),
        }
    }

    /// Inclusive `(start, end)` span of either activity kind
    pub fn activity_span(&self, activity: Activity) -> Result<(usize, usize), ModelError> {
        match activity {
            Activity::Physical(id) => {
                let p = self.physical(id)?;
                Ok((p.start(), p.end()))
            }
            Activity::Intentional(id) => {
                let n = self.node(id)?;
                Ok((n.start(), n.end()))
            }
        }
    }

    /// Trajectory set of either activity kind
    pub fn activity_trajectories(&self, activity: Activity) -> Result<&TrajectorySet, ModelError> {
        match activity {
            Activity::Physical(id) => Ok(self.physical(id)?.trajectories()),
            Activity::Intentional(id) => Ok(self.node(id)?.trajectories()),
        }
    }

    /// Trajectory indices covered by the whole description (the root's set)
    pub fn trajectory_indices(&self) -> &TrajectorySet {
        self.nodes[0].trajectories()
    }

    /// Number of intentional activities in the tree
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of physical activities in the tree
    #[inline]
    pub fn num_physicals(&self) -> usize {
        self.physicals.len()
    }

    /// Number of attached sequences
    #[inline]
    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Physical activity handles in depth-first, sequence-left-to-right
    /// traversal order (the endpoint traversal order).
    pub fn physical_ids(&self) -> Vec<PhysId> {
        fn walk(desc: &Description, node_index: usize, out: &mut Vec<PhysId>) {
            for &seq_index in &desc.children[node_index] {
                for activity in desc.sequences[seq_index].activities() {
                    match *activity {
                        Activity::Physical(id) => out.push(id),
                        Activity::Intentional(id) => walk(desc, id.index, out),
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(self, 0, &mut out);
        out
    }
}

impl Clone for Description {
    /// Deep copy: same structure under a fresh identity tag. Handles
    /// minted by the original never resolve against the copy.
    fn clone(&self) -> Self {
        let tag = fresh_tag();
        let mut sequences = self.sequences.clone();
        for sequence in &mut sequences {
            for activity in sequence.activities_mut() {
                *activity = match *activity {
                    Activity::Physical(id) => Activity::Physical(PhysId {
                        tag,
                        index: id.index,
                    }),
                    Activity::Intentional(id) => Activity::Intentional(NodeId {
                        tag,
                        index: id.index,
                    }),
                };
            }
        }
        Self {
            tag,
            nodes: self.nodes.clone(),
            node_parents: self.node_parents.clone(),
            physicals: self.physicals.clone(),
            sequences,
            children: self.children.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn two_person() -> TrajectorySet {
        TrajectorySet::from_iter([0, 1])
    }

    fn walk_leaf(desc: &mut Description, start: usize, size: usize, who: usize) -> PhysId {
        desc.add_physical(
            PhysicalActivity::placeholder("WALK", start, size, 2, TrajectorySet::from_iter([who]))
                .unwrap(),
        )
    }

    #[test]
    fn test_new_rejects_bad_sets() {
        assert!(Description::new(0, 9, TrajectorySet::new()).is_err());
        assert!(Description::new(0, 9, TrajectorySet::from_iter([0, 2, 3])).is_err());
        assert!(Description::new(0, 9, two_person()).is_ok());
    }

    #[test]
    fn test_attach_sequence_tiles_parent() {
        let mut desc = Description::new(0, 9, two_person()).unwrap();
        let root = desc.root();

        let a = walk_leaf(&mut desc, 0, 4, 0);
        let b = walk_leaf(&mut desc, 4, 6, 0);
        let seq = ActivitySequence::new(
            "LEADER",
            vec![Activity::Physical(a), Activity::Physical(b)],
        );
        desc.attach_sequence(root, seq).unwrap();
        assert_eq!(desc.num_sequences(), 1);
    }

    #[test]
    fn test_attach_sequence_rejects_gap() {
        let mut desc = Description::new(0, 9, two_person()).unwrap();
        let root = desc.root();

        let a = walk_leaf(&mut desc, 0, 4, 0);
        let b = walk_leaf(&mut desc, 5, 5, 0); // gap at frame 4
        let seq = ActivitySequence::new(
            "LEADER",
            vec![Activity::Physical(a), Activity::Physical(b)],
        );
        assert!(desc.attach_sequence(root, seq).is_err());
    }

    #[test]
    fn test_attach_sequence_rejects_short_cover() {
        let mut desc = Description::new(0, 9, two_person()).unwrap();
        let root = desc.root();
        let a = walk_leaf(&mut desc, 0, 5, 0);
        let seq = ActivitySequence::new("LEADER", vec![Activity::Physical(a)]);
        assert!(desc.attach_sequence(root, seq).is_err());
    }

    #[test]
    fn test_identity_containment() {
        let desc1 = Description::new(0, 9, two_person()).unwrap();
        let desc2 = Description::new(0, 9, two_person()).unwrap();

        assert!(desc1.contains(desc1.root()));
        // Identical field values, different identity
        assert!(!desc1.contains(desc2.root()));
        assert!(desc1.node(desc2.root()).is_err());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut desc = Description::new(0, 9, two_person()).unwrap();
        let root = desc.root();
        let child = desc
            .add_node(
                root,
                IntentionalActivity::new("MEET", 0, 9, DVector::zeros(2), two_person()).unwrap(),
            )
            .unwrap();
        let grandchild = desc
            .add_node(
                child,
                IntentionalActivity::new("WAIT", 2, 5, DVector::zeros(2), two_person()).unwrap(),
            )
            .unwrap();

        let ancestors = desc.ancestors(grandchild).unwrap();
        assert_eq!(ancestors, vec![child, root]);
        assert!(desc.ancestors(root).unwrap().is_empty());
    }

    #[test]
    fn test_deep_copy_independence() {
        let mut desc = Description::new(0, 9, two_person()).unwrap();
        let root = desc.root();
        let a = walk_leaf(&mut desc, 0, 10, 0);
        desc.attach_sequence(root, ActivitySequence::new("A", vec![Activity::Physical(a)]))
            .unwrap();

        let mut copy = desc.clone();
        // Original handles do not resolve against the copy
        assert!(!copy.contains(root));
        let copy_root = copy.root();

        let b = copy.add_physical(
            PhysicalActivity::placeholder("STAND", 0, 10, 2, TrajectorySet::from_iter([1]))
                .unwrap(),
        );
        copy.attach_sequence(
            copy_root,
            ActivitySequence::new("B", vec![Activity::Physical(b)]),
        )
        .unwrap();

        assert_eq!(copy.children(copy_root).unwrap().len(), 2);
        assert_eq!(desc.children(root).unwrap().len(), 1);
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut desc = Description::new(0, 9, two_person()).unwrap();
        let old_root = desc.root();
        desc.clear(
            IntentionalActivity::new(ROOT_NAME, 0, 4, DVector::zeros(0), two_person()).unwrap(),
        )
        .unwrap();
        assert!(!desc.contains(old_root));
        assert_eq!(desc.node(desc.root()).unwrap().end(), 4);
    }

    #[test]
    fn test_physical_ids_traversal_order() {
        let mut desc = Description::new(0, 9, two_person()).unwrap();
        let root = desc.root();
        let a = walk_leaf(&mut desc, 0, 10, 0);
        let b = walk_leaf(&mut desc, 0, 10, 1);
        desc.attach_sequence(root, ActivitySequence::new("A", vec![Activity::Physical(a)]))
            .unwrap();
        desc.attach_sequence(root, ActivitySequence::new("B", vec![Activity::Physical(b)]))
            .unwrap();
        assert_eq!(desc.physical_ids(), vec![a, b]);
    }
}
