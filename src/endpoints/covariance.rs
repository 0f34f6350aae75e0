//! Endpoint covariance and target conditioning
//!
//! Builds an undirected weighted graph over endpoint indices from tree
//! adjacency, evaluates a squared-exponential kernel on graph geodesic
//! distance (not Euclidean distance), and conditions the joint Gaussian
//! on endpoints with known spatial targets.

use nalgebra::DMatrix;
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::common::linalg::{schur_condition, symmetrize};
use crate::errors::ModelError;
use crate::library::ActivityLibrary;
use crate::model::Description;

use super::extract::EndpointSet;

/// Kernel-scale lookup name for junction fan-in edges.
const JUNCTION_SCALE_NAME: &str = "STAND";

/// Build the endpoint covariance matrix.
///
/// Edges: `(duration / kernel_scale)` between the two junctions
/// flanking each physical activity, and `1 / kernel_scale("STAND")` per
/// incoming fan-in pair. `K[i][i] = sigma^2`;
/// `K[i][j] = sigma^2 * exp(-dist(i,j)^2 / 2)` along shortest paths;
/// unreachable pairs get covariance 0.
pub fn endpoint_covariance(
    desc: &Description,
    endpoints: &EndpointSet,
    library: &ActivityLibrary,
    sigma: f64,
) -> Result<DMatrix<f64>, ModelError> {
    let n = endpoints.len();
    if n == 0 {
        return Err(ModelError::Precondition {
            context: "cannot build a covariance over zero endpoints".to_string(),
        });
    }

    let mut graph: UnGraph<(), f64> = UnGraph::with_capacity(n, 2 * n);
    let vertices: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();

    for (pid, (start_index, end_index)) in endpoints.junction_pairs() {
        let phys = desc.physical(pid)?;
        let scale = library.kernel(phys.name())?.scale;
        let duration = (phys.end() - phys.start()) as f64;
        graph.add_edge(vertices[start_index], vertices[end_index], duration / scale);
    }

    // Resolved lazily so libraries without fan-in junctions never need
    // the junction activity in their vocabulary.
    let mut junction_scale = None;
    for (index, endpoint) in endpoints.iter().enumerate() {
        for &source in &endpoint.incoming {
            let scale = match junction_scale {
                Some(scale) => scale,
                None => {
                    let scale = library.kernel(JUNCTION_SCALE_NAME)?.scale;
                    junction_scale = Some(scale);
                    scale
                }
            };
            graph.add_edge(vertices[source], vertices[index], 1.0 / scale);
        }
    }

    let variance = sigma * sigma;
    let mut k = DMatrix::zeros(n, n);
    for i in 0..n {
        let distances = dijkstra(&graph, vertices[i], None, |e| *e.weight());
        for j in 0..n {
            k[(i, j)] = if i == j {
                variance
            } else {
                match distances.get(&vertices[j]) {
                    Some(d) => variance * (-0.5 * d * d).exp(),
                    None => 0.0,
                }
            };
        }
    }

    // Dijkstra is exact both ways on an undirected graph; symmetrize
    // anyway to pin down floating-point equality of K[i][j] and K[j][i].
    Ok(symmetrize(&k))
}

/// Endpoint means and covariance after target conditioning.
#[derive(Debug, Clone)]
pub struct EndpointInference {
    /// Per-endpoint mean, one row per endpoint, one column per dimension
    pub mean: DMatrix<f64>,
    /// Joint covariance; target rows/columns are zeroed (observed)
    pub cov: DMatrix<f64>,
    /// True for endpoints pinned to a spatial target
    pub is_target: Vec<bool>,
}

impl EndpointInference {
    /// Indices of free (unobserved) endpoints
    pub fn free_indices(&self) -> Vec<usize> {
        (0..self.is_target.len())
            .filter(|&i| !self.is_target[i])
            .collect()
    }

    /// Indices of target (observed) endpoints
    pub fn target_indices(&self) -> Vec<usize> {
        (0..self.is_target.len())
            .filter(|&i| self.is_target[i])
            .collect()
    }
}

/// Condition the endpoint Gaussian on known spatial targets.
///
/// A terminal endpoint (no right activity) is pinned when its nearest
/// intentional ancestor that declares a target ends exactly at the
/// endpoint's frame; the pinned mean is that ancestor's parameter
/// vector. Conditioning is exact Schur-complement Gaussian
/// conditioning, with `jitter` added to the target block diagonal.
pub fn condition_on_targets(
    desc: &Description,
    endpoints: &EndpointSet,
    library: &ActivityLibrary,
    k: DMatrix<f64>,
    dims: usize,
    jitter: f64,
) -> Result<EndpointInference, ModelError> {
    let n = endpoints.len();
    let mut mean = DMatrix::zeros(n, dims);
    let mut is_target = vec![false; n];

    for (index, endpoint) in endpoints.iter().enumerate() {
        if endpoint.right.is_some() {
            continue;
        }
        let mut lineage = vec![endpoint.owner];
        lineage.extend(desc.ancestors(endpoint.owner)?);
        for node_id in lineage {
            let node = desc.node(node_id)?;
            if library.has_target(node.name()) && node.end() == endpoint.frame {
                let params = node.params();
                if params.len() < dims {
                    return Err(ModelError::DimensionMismatch {
                        expected: dims,
                        actual: params.len(),
                        context: format!("target parameters of {:?}", node.name()),
                    });
                }
                for d in 0..dims {
                    mean[(index, d)] = params[d];
                }
                is_target[index] = true;
                break;
            }
        }
    }

    let targets: Vec<usize> = (0..n).filter(|&i| is_target[i]).collect();
    if targets.is_empty() {
        return Ok(EndpointInference {
            mean,
            cov: k,
            is_target,
        });
    }
    let free: Vec<usize> = (0..n).filter(|&i| !is_target[i]).collect();
    log::debug!(
        "conditioning {} free endpoints on {} targets",
        free.len(),
        targets.len()
    );

    // Observed values relative to the zero prior mean
    let y = mean.select_rows(&targets);
    let (free_mean, free_cov) = schur_condition(&k, &free, &targets, &y, jitter)?;

    let mut cov = DMatrix::zeros(n, n);
    for (fi, &i) in free.iter().enumerate() {
        for d in 0..dims {
            mean[(i, d)] = free_mean[(fi, d)];
        }
        for (fj, &j) in free.iter().enumerate() {
            cov[(i, j)] = free_cov[(fi, fj)];
        }
    }

    Ok(EndpointInference {
        mean,
        cov,
        is_target,
    })
}
