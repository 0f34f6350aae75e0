//! Parameter prior
//!
//! Continuous parameters for a freshly sampled intentional child,
//! conditioned on its parent's parameters: an independent Gaussian per
//! dimension centered on the parent value (missing parent dimensions
//! center on zero, which covers the synthetic root's empty vector).

use nalgebra::DVector;

use crate::common::rng::Rng;

/// Draw a child parameter vector around `parent`.
pub fn sample_params(
    rng: &mut impl Rng,
    parent: &DVector<f64>,
    dims: usize,
    spread: f64,
) -> DVector<f64> {
    DVector::from_fn(dims, |d, _| {
        let center = if d < parent.len() { parent[d] } else { 0.0 };
        center + spread * rng.randn()
    })
}
