//! Description prior: the recursive tree sampler
//!
//! Drives ancestral sampling over the whole activity tree: association,
//! per-group sequences, recursion into intentional children, then the
//! endpoint pipeline and GP trajectory fill. A returned description
//! always carries fully realized, spatially coherent trajectories.

use rayon::prelude::*;
use serde::Serialize;

use crate::common::rng::{Rng, SimpleRng};
use crate::endpoints::{condition_on_targets, endpoint_covariance, extract_endpoints};
use crate::errors::ModelError;
use crate::gp::likelihood::sample_trajectories;
use crate::library::ActivityLibrary;
use crate::model::{Activity, Description, NodeId, TrajectorySet};

use super::association::sample_association;
use super::sequence::sample_sequence;

/// Tunables for the generative process.
#[derive(Debug, Clone, Serialize)]
pub struct PriorConfig {
    /// Spatial dimensions per trajectory (2 for PosX/PosZ)
    pub dims: usize,
    /// Signal standard deviation of the endpoint covariance kernel.
    /// Deliberately independent of per-activity signal variances.
    pub endpoint_sigma: f64,
    /// Jitter added to the target block diagonal before conditioning
    pub target_jitter: f64,
    /// Noise floor on GP predictive training covariance
    pub gp_noise: f64,
    /// Standard deviation of the child parameter prior
    pub param_spread: f64,
    /// Recursion depth bound; exceeding it aborts the sample
    pub max_depth: usize,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            dims: 2,
            endpoint_sigma: 1.0,
            target_jitter: 0.25 * 0.25,
            gp_noise: 1e-6,
            param_spread: 1.0,
            max_depth: 64,
        }
    }
}

/// The full generative prior over descriptions.
pub struct DescriptionPrior<'a> {
    library: &'a ActivityLibrary,
    config: PriorConfig,
}

impl<'a> DescriptionPrior<'a> {
    /// Create a prior against a loaded library
    pub fn new(library: &'a ActivityLibrary, config: PriorConfig) -> Self {
        Self { library, config }
    }

    /// The active configuration
    pub fn config(&self) -> &PriorConfig {
        &self.config
    }

    /// Sample a complete description: tree structure plus realized
    /// trajectories for every physical activity.
    pub fn sample(
        &self,
        rng: &mut impl Rng,
        start: usize,
        end: usize,
        trajectories: TrajectorySet,
    ) -> Result<Description, ModelError> {
        let mut desc = self.sample_structure(rng, start, end, trajectories)?;

        let endpoints = extract_endpoints(&desc)?;
        log::debug!("extracted {} endpoints", endpoints.len());
        let k = endpoint_covariance(&desc, &endpoints, self.library, self.config.endpoint_sigma)?;
        let inference = condition_on_targets(
            &desc,
            &endpoints,
            self.library,
            k,
            self.config.dims,
            self.config.target_jitter,
        )?;
        sample_trajectories(rng, &mut desc, &endpoints, &inference, self.library, &self.config)?;

        log::info!(
            "sampled description: {} nodes, {} sequences, {} physical activities",
            desc.num_nodes(),
            desc.num_sequences(),
            desc.num_physicals()
        );
        Ok(desc)
    }

    /// Sample only the tree structure; physical activities keep their
    /// zeroed placeholder trajectories.
    pub fn sample_structure(
        &self,
        rng: &mut impl Rng,
        start: usize,
        end: usize,
        trajectories: TrajectorySet,
    ) -> Result<Description, ModelError> {
        let mut desc = Description::new(start, end, trajectories)?;
        let root = desc.root();
        self.expand(rng, &mut desc, root, 0)?;
        Ok(desc)
    }

    /// Expand one intentional node: association, one sequence per
    /// group, then recursion into every intentional child in order.
    fn expand(
        &self,
        rng: &mut impl Rng,
        desc: &mut Description,
        node: NodeId,
        depth: usize,
    ) -> Result<(), ModelError> {
        if depth >= self.config.max_depth {
            return Err(ModelError::Consistency {
                description: format!("recursion exceeded max depth {}", self.config.max_depth),
            });
        }

        let association = sample_association(rng, desc, node, self.library)?;
        log::debug!(
            "expanding {:?} at depth {}: {} groups",
            desc.node(node)?.name(),
            depth,
            association.len()
        );

        for group in association.groups {
            let seq_id = sample_sequence(
                rng,
                desc,
                node,
                &group.role,
                group.trajectories,
                self.library,
                &self.config,
            )?;
            let children: Vec<NodeId> = desc
                .sequence(seq_id)?
                .activities()
                .iter()
                .filter_map(|a| match a {
                    Activity::Intentional(id) => Some(*id),
                    Activity::Physical(_) => None,
                })
                .collect();
            for child in children {
                self.expand(rng, desc, child, depth + 1)?;
            }
        }
        Ok(())
    }

    /// Sample one description per seed, in parallel.
    ///
    /// Sampling is embarrassingly parallel across whole descriptions;
    /// each seed gets its own RNG stream.
    pub fn sample_batch(
        &self,
        seeds: &[u64],
        start: usize,
        end: usize,
        trajectories: &TrajectorySet,
    ) -> Result<Vec<Description>, ModelError> {
        seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = SimpleRng::new(seed);
                self.sample(&mut rng, start, end, trajectories.clone())
            })
            .collect()
    }
}
