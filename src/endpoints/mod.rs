//! Endpoint subsystem
//!
//! Extracts trajectory junctions from a completed tree and couples
//! them spatially through a graph-geodesic covariance:
//!
//! - [`extract`] - Depth-first junction extraction (order is a contract)
//! - [`covariance`] - Junction graph, geodesic kernel, target conditioning

pub mod covariance;
pub mod extract;

pub use covariance::{condition_on_targets, endpoint_covariance, EndpointInference};
pub use extract::{extract_endpoints, trajectory_endpoints, Endpoint, EndpointSet};
