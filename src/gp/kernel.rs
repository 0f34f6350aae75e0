//! Squared-exponential kernel
//!
//! The covariance function used for trajectory interpolation, with
//! per-activity-name parameters from the library.

use nalgebra::DMatrix;

use crate::library::KernelParams;

/// Squared-exponential (RBF) kernel over frame indices.
#[derive(Debug, Clone, Copy)]
pub struct SquaredExponential {
    /// Length scale in frames
    pub scale: f64,
    /// Signal standard deviation
    pub sigma: f64,
}

impl SquaredExponential {
    /// Construct from library parameters
    pub fn new(params: KernelParams) -> Self {
        Self {
            scale: params.scale,
            sigma: params.sigma,
        }
    }

    /// Evaluate `k(a, b)`
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        let d = (a - b) / self.scale;
        self.sigma * self.sigma * (-0.5 * d * d).exp()
    }

    /// Gram matrix over two frame lists
    pub fn gram(&self, xs: &[f64], ys: &[f64]) -> DMatrix<f64> {
        DMatrix::from_fn(xs.len(), ys.len(), |i, j| self.apply(xs[i], ys[j]))
    }
}
