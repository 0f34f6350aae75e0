//! GP predictive conditioning between fixed endpoints
//!
//! A Gaussian process trained on exactly two points (a physical
//! activity's flanking junctions) and evaluated over the interior
//! frames. Training outputs are endpoint values relative to the
//! activity's reference mean path; the caller adds the mean path back.

use nalgebra::{Cholesky, DMatrix, Dyn};

use crate::common::linalg::{cholesky_with_jitter, log_gaussian_pdf, symmetrize};
use crate::errors::ModelError;

use super::kernel::SquaredExponential;

/// GP conditioned on the two junction frames of one physical activity.
#[derive(Debug)]
pub struct EndpointGp {
    kernel: SquaredExponential,
    noise: f64,
    train_x: [f64; 2],
    chol: Cholesky<f64, Dyn>,
}

impl EndpointGp {
    /// Condition on training frames `t0` and `t1` with a noise floor.
    pub fn new(
        kernel: SquaredExponential,
        noise: f64,
        t0: f64,
        t1: f64,
    ) -> Result<Self, ModelError> {
        let train_x = [t0, t1];
        let mut k_train = kernel.gram(&train_x, &train_x);
        k_train[(0, 0)] += noise;
        k_train[(1, 1)] += noise;
        let chol = cholesky_with_jitter(&k_train, 0.0, "GP training covariance")?;
        Ok(Self {
            kernel,
            noise,
            train_x,
            chol,
        })
    }

    /// Predictive distribution over `test` frames given training
    /// outputs `y` (2 rows, one column per spatial dimension).
    ///
    /// Returns the predictive mean (|test| x dims) and the shared
    /// predictive covariance (|test| x |test|), identical across
    /// dimensions because the kernel is.
    pub fn predictive(
        &self,
        test: &[f64],
        y: &DMatrix<f64>,
    ) -> Result<(DMatrix<f64>, DMatrix<f64>), ModelError> {
        if y.nrows() != 2 {
            return Err(ModelError::DimensionMismatch {
                expected: 2,
                actual: y.nrows(),
                context: "GP training outputs".to_string(),
            });
        }
        let k_cross = self.kernel.gram(test, &self.train_x);
        let alpha = self.chol.solve(y);
        let mean = &k_cross * alpha;

        let k_test = self.kernel.gram(test, test);
        let solved = self.chol.solve(&k_cross.transpose());
        let cov = symmetrize(&(k_test - &k_cross * solved));
        Ok((mean, cov))
    }

    /// Log density of observed interior values under the predictive.
    ///
    /// `observed` is |test| x dims; density sums over dimensions.
    pub fn log_density(
        &self,
        test: &[f64],
        y: &DMatrix<f64>,
        observed: &DMatrix<f64>,
    ) -> Result<f64, ModelError> {
        let (mean, cov) = self.predictive(test, y)?;
        if observed.nrows() != test.len() || observed.ncols() != mean.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: test.len(),
                actual: observed.nrows(),
                context: "GP observed values".to_string(),
            });
        }
        let n = test.len();
        let noisy = &cov + DMatrix::identity(n, n) * self.noise.max(1e-12);
        let mut total = 0.0;
        for d in 0..observed.ncols() {
            total += log_gaussian_pdf(
                &observed.column(d).into_owned(),
                &mean.column(d).into_owned(),
                &noisy,
            );
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::KernelParams;

    fn gp() -> EndpointGp {
        let kernel = SquaredExponential::new(KernelParams {
            scale: 10.0,
            sigma: 1.0,
        });
        EndpointGp::new(kernel, 1e-6, 0.0, 9.0).unwrap()
    }

    #[test]
    fn test_predictive_interpolates_endpoints() {
        let gp = gp();
        // Near-training test points reproduce the training outputs
        let y = DMatrix::from_row_slice(2, 1, &[1.0, -1.0]);
        let (mean, cov) = gp.predictive(&[0.0, 9.0], &y).unwrap();
        assert!((mean[(0, 0)] - 1.0).abs() < 1e-3);
        assert!((mean[(1, 0)] + 1.0).abs() < 1e-3);
        // Variance collapses at the training points
        assert!(cov[(0, 0)].abs() < 1e-3);
        assert!(cov[(1, 1)].abs() < 1e-3);
    }

    #[test]
    fn test_predictive_midpoint_between_endpoints() {
        let gp = gp();
        let y = DMatrix::from_row_slice(2, 1, &[0.0, 10.0]);
        let (mean, cov) = gp.predictive(&[4.5], &y).unwrap();
        // Symmetric placement: the midpoint mean is near the average
        assert!((mean[(0, 0)] - 5.0).abs() < 1.0);
        // Interior variance is positive but below prior variance
        assert!(cov[(0, 0)] > 0.0);
        assert!(cov[(0, 0)] < 1.0);
    }

    #[test]
    fn test_predictive_multidimensional() {
        let gp = gp();
        let y = DMatrix::from_row_slice(2, 2, &[1.0, -2.0, 1.0, -2.0]);
        let (mean, _) = gp.predictive(&[4.5], &y).unwrap();
        assert_eq!(mean.ncols(), 2);
        assert!(mean[(0, 0)] > 0.0);
        assert!(mean[(0, 1)] < 0.0);
    }

    #[test]
    fn test_log_density_prefers_smooth_path() {
        let gp = gp();
        let y = DMatrix::from_row_slice(2, 1, &[0.0, 9.0]);
        let test: Vec<f64> = (1..9).map(|t| t as f64).collect();

        let smooth = DMatrix::from_fn(8, 1, |i, _| (i + 1) as f64);
        let jagged = DMatrix::from_fn(8, 1, |i, _| if i % 2 == 0 { 8.0 } else { -8.0 });

        let ll_smooth = gp.log_density(&test, &y, &smooth).unwrap();
        let ll_jagged = gp.log_density(&test, &y, &jagged).unwrap();
        assert!(ll_smooth > ll_jagged);
    }

    #[test]
    fn test_bad_training_shape() {
        let gp = gp();
        let y = DMatrix::from_row_slice(3, 1, &[0.0, 1.0, 2.0]);
        assert!(gp.predictive(&[4.0], &y).is_err());
    }
}
