//! Low-level utilities shared across the model
//!
//! - [`rng`] - Deterministic RNG trait and xorshift64 implementation
//! - [`linalg`] - Gaussian linear algebra (MVN sampling, conditioning)

pub mod linalg;
pub mod rng;
