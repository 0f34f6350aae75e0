//! Gaussian-process trajectory machinery
//!
//! - [`kernel`] - The squared-exponential covariance function
//! - [`predictive`] - Two-point conditioning for endpoint-bridged interiors
//! - [`likelihood`] - Trajectory realization, flattening, and data scoring

pub mod kernel;
pub mod likelihood;
pub mod predictive;

pub use kernel::SquaredExponential;
pub use likelihood::{assemble_data, sample_trajectories, score_data};
pub use predictive::EndpointGp;
