//! Linear algebra utilities
//!
//! Gaussian operations shared by the endpoint-conditioning and GP
//! trajectory stages: Cholesky-based multivariate normal sampling,
//! Schur-complement conditioning, and log-density evaluation.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use std::f64::consts::PI;

use crate::common::rng::Rng;
use crate::errors::ModelError;

/// Factor `matrix + jitter * I`, escalating the jitter on failure.
///
/// Escalates by x10 up to two extra attempts before reporting the
/// matrix as numerically unusable.
pub fn cholesky_with_jitter(
    matrix: &DMatrix<f64>,
    jitter: f64,
    context: &str,
) -> Result<Cholesky<f64, Dyn>, ModelError> {
    let n = matrix.nrows();
    let mut eps = jitter;
    for _ in 0..3 {
        let stabilized = matrix + DMatrix::identity(n, n) * eps;
        if let Some(chol) = stabilized.cholesky() {
            return Ok(chol);
        }
        eps = if eps > 0.0 { eps * 10.0 } else { 1e-9 };
    }
    Err(ModelError::NumericalInstability {
        description: format!("Cholesky factorization failed: {}", context),
    })
}

/// Draw one sample from a multivariate normal distribution.
///
/// # Arguments
/// * `rng` - Source of standard normal draws
/// * `mean` - Mean vector
/// * `cov` - Covariance matrix
/// * `jitter` - Diagonal stabilizer added before factorization
pub fn sample_mvn(
    rng: &mut impl Rng,
    mean: &DVector<f64>,
    cov: &DMatrix<f64>,
    jitter: f64,
) -> Result<DVector<f64>, ModelError> {
    let n = mean.len();
    if cov.nrows() != n || cov.ncols() != n {
        return Err(ModelError::DimensionMismatch {
            expected: n,
            actual: cov.nrows(),
            context: "MVN covariance".to_string(),
        });
    }
    let chol = cholesky_with_jitter(cov, jitter, "MVN covariance")?;
    let z = DVector::from_fn(n, |_, _| rng.randn());
    Ok(mean + chol.l() * z)
}

/// Schur-complement Gaussian conditioning on an observed index block.
///
/// Given a joint zero-mean Gaussian with covariance `k` over all
/// indices, condition the `free` block on observed values `y` at the
/// `observed` block (`y` is |observed| x dims, already centered).
///
/// # Returns
/// Tuple of (posterior mean over `free`, |free| x dims, and posterior
/// covariance over `free`, |free| x |free|).
pub fn schur_condition(
    k: &DMatrix<f64>,
    free: &[usize],
    observed: &[usize],
    y: &DMatrix<f64>,
    jitter: f64,
) -> Result<(DMatrix<f64>, DMatrix<f64>), ModelError> {
    if y.nrows() != observed.len() {
        return Err(ModelError::DimensionMismatch {
            expected: observed.len(),
            actual: y.nrows(),
            context: "observed value block".to_string(),
        });
    }

    let k_ff = k.select_rows(free).select_columns(free);
    let k_fo = k.select_rows(free).select_columns(observed);
    let k_oo = k.select_rows(observed).select_columns(observed);

    let chol = cholesky_with_jitter(&k_oo, jitter, "observed covariance block")?;
    let solved_y = chol.solve(y);
    let solved_k = chol.solve(&k_fo.transpose());

    let mean = &k_fo * solved_y;
    let cov = symmetrize(&(&k_ff - &k_fo * solved_k));
    Ok((mean, cov))
}

/// Compute log Gaussian PDF for numerical stability
///
/// # Arguments
/// * `x` - Point to evaluate
/// * `mu` - Mean vector
/// * `sigma` - Covariance matrix
///
/// # Returns
/// Log probability density
pub fn log_gaussian_pdf(x: &DVector<f64>, mu: &DVector<f64>, sigma: &DMatrix<f64>) -> f64 {
    let n = x.len() as f64;
    let diff = x - mu;

    let det = sigma.determinant();
    if det <= 0.0 {
        return f64::NEG_INFINITY;
    }

    match sigma.clone().cholesky() {
        Some(chol) => {
            let inv_sigma_diff = chol.solve(&diff);
            let mahalanobis = diff.dot(&inv_sigma_diff);

            -0.5 * (n * (2.0 * PI).ln() + det.ln() + mahalanobis)
        }
        None => f64::NEG_INFINITY,
    }
}

/// Make matrix symmetric
///
/// Ensures a matrix is symmetric by averaging with its transpose
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    0.5 * (matrix + matrix.transpose())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::rng::SimpleRng;

    #[test]
    fn test_sample_mvn_mean() {
        let mut rng = SimpleRng::new(42);
        let mean = DVector::from_vec(vec![3.0, -1.0]);
        let cov = DMatrix::identity(2, 2) * 0.01;

        let mut acc = DVector::zeros(2);
        let n = 2000;
        for _ in 0..n {
            acc += sample_mvn(&mut rng, &mean, &cov, 1e-12).unwrap();
        }
        let empirical = acc / n as f64;
        assert!((empirical[0] - 3.0).abs() < 0.05);
        assert!((empirical[1] + 1.0).abs() < 0.05);
    }

    #[test]
    fn test_sample_mvn_dimension_mismatch() {
        let mut rng = SimpleRng::new(1);
        let mean = DVector::from_vec(vec![0.0, 0.0, 0.0]);
        let cov = DMatrix::identity(2, 2);
        let err = sample_mvn(&mut rng, &mean, &cov, 0.0).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_schur_condition_independent_blocks() {
        // Block-diagonal covariance: conditioning must not move the
        // free mean and must leave the free covariance unchanged.
        let k = DMatrix::from_row_slice(
            3,
            3,
            &[
                2.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.5,
            ],
        );
        let y = DMatrix::from_row_slice(1, 2, &[5.0, -5.0]);
        let (mean, cov) = schur_condition(&k, &[0, 2], &[1], &y, 1e-9).unwrap();
        assert!(mean.abs().max() < 1e-6);
        assert!((cov[(0, 0)] - 2.0).abs() < 1e-6);
        assert!((cov[(1, 1)] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_schur_condition_correlated() {
        // Perfectly informative observation shrinks variance toward 0.
        let k = DMatrix::from_row_slice(2, 2, &[1.0, 0.99, 0.99, 1.0]);
        let y = DMatrix::from_row_slice(1, 1, &[2.0]);
        let (mean, cov) = schur_condition(&k, &[0], &[1], &y, 0.0).unwrap();
        assert!((mean[(0, 0)] - 0.99 * 2.0).abs() < 1e-9);
        assert!(cov[(0, 0)] < 0.05);
        assert!(cov[(0, 0)] > 0.0);
    }

    #[test]
    fn test_log_gaussian_pdf_standard_normal() {
        let x = DVector::from_vec(vec![0.0]);
        let mu = DVector::from_vec(vec![0.0]);
        let sigma = DMatrix::identity(1, 1);
        let expected = -0.5 * (2.0 * PI).ln();
        assert!((log_gaussian_pdf(&x, &mu, &sigma) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cholesky_with_jitter_recovers() {
        // Rank-deficient matrix factors only after jitter escalation.
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert!(m.clone().cholesky().is_none());
        assert!(cholesky_with_jitter(&m, 1e-9, "test").is_ok());
    }

    #[test]
    fn test_symmetrize() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 1.0]);
        let s = symmetrize(&m);
        assert_eq!(s[(0, 1)], s[(1, 0)]);
        assert_eq!(s[(0, 1)], 1.0);
    }
}
