//! Trajectory realization and scoring
//!
//! Turns a structural description plus its conditioned endpoint
//! distribution into concrete trajectory values: a joint draw over the
//! endpoint vertices, then an independent GP bridge through each
//! physical activity's interior frames. The same GP machinery scores
//! observed data against a description.

use nalgebra::{DMatrix, DVector};

use crate::common::linalg::sample_mvn;
use crate::common::rng::Rng;
use crate::endpoints::{EndpointInference, EndpointSet};
use crate::errors::ModelError;
use crate::library::ActivityLibrary;
use crate::model::{Data, Description, Trajectory};
use crate::sampler::PriorConfig;

use super::kernel::SquaredExponential;
use super::predictive::EndpointGp;

/// Jitter for the joint endpoint draw; the conditioned covariance is
/// already regularized so this only guards roundoff.
const ENDPOINT_DRAW_JITTER: f64 = 1e-9;

/// Draw one value per endpoint vertex and spatial dimension.
///
/// Free endpoints are sampled jointly from the conditioned Gaussian;
/// target-pinned endpoints keep their conditioned mean exactly.
/// Returns an n x dims matrix of endpoint positions.
fn draw_endpoints(
    rng: &mut impl Rng,
    inference: &EndpointInference,
    dims: usize,
) -> Result<DMatrix<f64>, ModelError> {
    let mut draws = inference.mean.clone();
    let free = inference.free_indices();
    if free.is_empty() {
        return Ok(draws);
    }
    let free_cov = inference
        .cov
        .select_rows(free.as_slice())
        .select_columns(free.as_slice());
    for d in 0..dims {
        let mean_d = DVector::from_fn(free.len(), |i, _| inference.mean[(free[i], d)]);
        let sample = sample_mvn(rng, &mean_d, &free_cov, ENDPOINT_DRAW_JITTER)?;
        for (fi, &i) in free.iter().enumerate() {
            draws[(i, d)] = sample[fi];
        }
    }
    Ok(draws)
}

/// Fill every physical activity's trajectory with sampled values.
///
/// Endpoint frames take the joint endpoint draw directly; interior
/// frames are sampled from the activity's GP conditioned on the two
/// flanking endpoint values. One- and two-frame activities have no
/// interior and are fully determined by the endpoint draw.
pub fn sample_trajectories(
    rng: &mut impl Rng,
    desc: &mut Description,
    endpoints: &EndpointSet,
    inference: &EndpointInference,
    library: &ActivityLibrary,
    config: &PriorConfig,
) -> Result<(), ModelError> {
    if endpoints.is_empty() {
        return Err(ModelError::Precondition {
            context: "cannot realize trajectories for a description with no endpoints".to_string(),
        });
    }
    if inference.mean.nrows() != endpoints.len() {
        return Err(ModelError::DimensionMismatch {
            expected: endpoints.len(),
            actual: inference.mean.nrows(),
            context: "endpoint inference size".to_string(),
        });
    }
    let dims = config.dims;
    let draws = draw_endpoints(rng, inference, dims)?;

    for pid in desc.physical_ids() {
        let (s_idx, e_idx) = endpoints
            .junctions(pid)
            .ok_or_else(|| ModelError::Consistency {
                description: "physical activity missing from endpoint set".to_string(),
            })?;
        let (t0, t1, name) = {
            let phys = desc.physical(pid)?;
            (phys.start(), phys.end(), phys.name().to_string())
        };

        // Interior bridge, computed before mutating the trajectory
        let interior = if t1 > t0 + 1 {
            let kernel = SquaredExponential::new(library.kernel(&name)?);
            let gp = EndpointGp::new(kernel, config.gp_noise, t0 as f64, t1 as f64)?;
            let y = DMatrix::from_fn(2, dims, |r, d| {
                draws[(if r == 0 { s_idx } else { e_idx }, d)]
            });
            let frames: Vec<f64> = (t0 + 1..t1).map(|f| f as f64).collect();
            let (mean, cov) = gp.predictive(&frames, &y)?;
            let mut samples = Vec::with_capacity(dims);
            for d in 0..dims {
                let sample =
                    sample_mvn(rng, &mean.column(d).into_owned(), &cov, config.gp_noise)?;
                samples.push(sample);
            }
            Some(samples)
        } else {
            None
        };

        let phys = desc.physical_mut(pid)?;
        let traj = phys.trajectory_mut();
        for d in 0..dims {
            traj.set_value(d, t0, draws[(s_idx, d)])?;
            if t1 > t0 {
                traj.set_value(d, t1, draws[(e_idx, d)])?;
            }
        }
        if let Some(samples) = interior {
            for d in 0..dims {
                for (offset, frame) in (t0 + 1..t1).enumerate() {
                    traj.set_value(d, frame, samples[d][offset])?;
                }
            }
        }
        log::trace!(
            "realized {} over [{}, {}] (endpoints {}, {})",
            name,
            t0,
            t1,
            s_idx,
            e_idx
        );
    }
    Ok(())
}

/// Flatten a realized description into one trajectory per individual.
///
/// Each output trajectory spans the root range; every physical
/// activity writes its sampled segment into the trajectories of its
/// member individuals. The tiling invariant guarantees every frame of
/// every individual is written exactly once.
pub fn assemble_data(desc: &Description, dims: usize) -> Result<Data, ModelError> {
    let root = desc.node(desc.root())?;
    let (start, size) = (root.start(), root.size());
    let mut data = Data::new();
    for _ in 0..desc.trajectory_indices().len() {
        data.push(Trajectory::with_zeros(start, size, dims)?);
    }
    for pid in desc.physical_ids() {
        let phys = desc.physical(pid)?;
        let source = phys.trajectory();
        for index in phys.trajectories().iter() {
            let target = data.get_mut(index).ok_or_else(|| ModelError::Consistency {
                description: format!("trajectory index {} outside the root set", index),
            })?;
            for frame in phys.start()..=phys.end() {
                for d in 0..dims {
                    target.set_value(d, frame, source.value(d, frame)?)?;
                }
            }
        }
    }
    Ok(data)
}

/// Log likelihood of observed data under a structural description.
///
/// Each physical activity contributes, per member individual, the GP
/// predictive log density of the observed interior frames given the
/// observed endpoint frames. Activities shorter than three frames have
/// no interior and contribute zero.
pub fn score_data(
    desc: &Description,
    data: &Data,
    library: &ActivityLibrary,
    config: &PriorConfig,
) -> Result<f64, ModelError> {
    if desc.num_physicals() == 0 {
        return Err(ModelError::Precondition {
            context: "cannot score data against a description with no physical activities"
                .to_string(),
        });
    }
    let dims = config.dims;
    let mut total = 0.0;
    for pid in desc.physical_ids() {
        let phys = desc.physical(pid)?;
        let (t0, t1) = (phys.start(), phys.end());
        if t1 <= t0 + 1 {
            continue;
        }
        let kernel = SquaredExponential::new(library.kernel(phys.name())?);
        let gp = EndpointGp::new(kernel, config.gp_noise, t0 as f64, t1 as f64)?;
        let frames: Vec<f64> = (t0 + 1..t1).map(|f| f as f64).collect();
        for index in phys.trajectories().iter() {
            let traj = data.get(index).ok_or_else(|| ModelError::Precondition {
                context: format!("data is missing trajectory {}", index),
            })?;
            let mut y = DMatrix::zeros(2, dims);
            for d in 0..dims {
                y[(0, d)] = traj.value(d, t0)?;
                y[(1, d)] = traj.value(d, t1)?;
            }
            let mut observed = DMatrix::zeros(frames.len(), dims);
            for (offset, frame) in (t0 + 1..t1).enumerate() {
                for d in 0..dims {
                    observed[(offset, d)] = traj.value(d, frame)?;
                }
            }
            total += gp.log_density(&frames, &y, &observed)?;
        }
    }
    Ok(total)
}
