//! Endpoint extraction
//!
//! Walks a completed tree and collects every trajectory junction: the
//! start and end of each physical activity. Consecutive physical
//! activities share a junction; junction fan-in chains across sibling
//! sequences and through intentional children. Endpoints are appended
//! in depth-first, sequence-left-to-right order, and their list index
//! is the vertex id of the covariance graph. That order is a strict
//! contract relied on downstream.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::errors::ModelError;
use crate::model::{Activity, Description, NodeId, PhysId};

/// A trajectory junction flanking one or two physical activities.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Physical activity ending at this junction, if any
    pub left: Option<PhysId>,
    /// Physical activity starting at this junction, if any
    pub right: Option<PhysId>,
    /// Endpoint indices that terminate into this junction
    pub incoming: SmallVec<[usize; 2]>,
    /// Frame at which the junction sits
    pub frame: usize,
    /// Innermost intentional node whose sequence owns the junction
    pub owner: NodeId,
}

/// Flat ordered endpoint list for one extraction pass.
#[derive(Debug, Default)]
pub struct EndpointSet {
    endpoints: Vec<Endpoint>,
    junctions: HashMap<PhysId, (usize, usize)>,
}

impl EndpointSet {
    /// Number of endpoints
    #[inline]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// True when no endpoints were collected
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoint at a vertex index
    pub fn get(&self, index: usize) -> Option<&Endpoint> {
        self.endpoints.get(index)
    }

    /// Iterate endpoints in traversal (vertex) order
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// The (start, end) endpoint indices flanking a physical activity
    pub fn junctions(&self, id: PhysId) -> Option<(usize, usize)> {
        self.junctions.get(&id).copied()
    }

    /// Iterate (physical id, (start, end)) junction pairs
    pub fn junction_pairs(&self) -> impl Iterator<Item = (PhysId, (usize, usize))> + '_ {
        self.junctions.iter().map(|(&id, &pair)| (id, pair))
    }

    fn push(&mut self, endpoint: Endpoint) -> usize {
        self.endpoints.push(endpoint);
        self.endpoints.len() - 1
    }
}

/// Extract every endpoint of `desc`, starting with no external fan-in.
pub fn extract_endpoints(desc: &Description) -> Result<EndpointSet, ModelError> {
    let mut set = EndpointSet::default();
    trajectory_endpoints(desc, desc.root(), Vec::new(), &mut set)?;

    for (index, endpoint) in set.endpoints.iter().enumerate() {
        if endpoint.left.is_none() && endpoint.right.is_none() {
            return Err(ModelError::Consistency {
                description: format!("endpoint {} has no flanking physical activity", index),
            });
        }
    }
    Ok(set)
}

/// Walk the subtree at `node`, appending endpoints to `set`.
///
/// `incoming` is the list of endpoint indices feeding the first
/// junction encountered; the returned list is the fan-out at the point
/// where control returns to the caller.
pub fn trajectory_endpoints(
    desc: &Description,
    node: NodeId,
    incoming: Vec<usize>,
    set: &mut EndpointSet,
) -> Result<Vec<usize>, ModelError> {
    let mut incoming = incoming;
    for seq_id in desc.children(node)? {
        // Junction shared with the directly preceding physical in this
        // sequence, if the previous activity was physical.
        let mut shared: Option<usize> = None;
        let activities: Vec<Activity> = desc.sequence(seq_id)?.activities().to_vec();
        for activity in activities {
            match activity {
                Activity::Physical(pid) => {
                    let (start_frame, end_frame) = {
                        let phys = desc.physical(pid)?;
                        (phys.start(), phys.end())
                    };

                    let start_index = match shared {
                        Some(index) => {
                            let endpoint = &mut set.endpoints[index];
                            if endpoint.right.is_some() {
                                return Err(ModelError::Consistency {
                                    description: format!(
                                        "junction {} already has a right activity",
                                        index
                                    ),
                                });
                            }
                            endpoint.right = Some(pid);
                            index
                        }
                        None => set.push(Endpoint {
                            left: None,
                            right: Some(pid),
                            incoming: std::mem::take(&mut incoming).into_iter().collect(),
                            frame: start_frame,
                            owner: node,
                        }),
                    };

                    let end_index = set.push(Endpoint {
                        left: Some(pid),
                        right: None,
                        incoming: SmallVec::new(),
                        frame: end_frame,
                        owner: node,
                    });

                    set.junctions.insert(pid, (start_index, end_index));
                    shared = Some(end_index);
                    incoming = vec![end_index];
                }
                Activity::Intentional(child) => {
                    incoming = trajectory_endpoints(desc, child, std::mem::take(&mut incoming), set)?;
                    shared = None;
                }
            }
        }
    }
    Ok(incoming)
}
