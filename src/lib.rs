/*!
# Activity tree model

Hierarchical generative model of human activity in video. Activity is
represented as a recursive tree: intentional activities decompose into
role-tagged sequences of sub-activities via Chinese Restaurant Process
grouping and per-role Markov chains, bottoming out in physical
activities whose trajectories are realized by Gaussian processes
conditioned on a shared endpoint graph.

## Features

- Recursive ancestral sampling of activity trees over a fixed clip
- CRP association of individuals into role groups at every branch
- Per-role Markov-chain timelines condensed into activity sequences
- Endpoint-graph covariance with geodesic squared-exponential kernels
- Target conditioning via Schur-complement Gaussian updates
- GP trajectory bridges between endpoints, plus data scoring

## Modules

- [`model`] - Descriptions, activities, sequences, trajectories
- [`library`] - The activity library: declarations, kernels, chains
- [`sampler`] - The recursive generative prior
- [`endpoints`] - Endpoint extraction and covariance construction
- [`gp`] - Kernels, predictive conditioning, realization, scoring
- [`io`] - Plain-text data tables
- [`common`] - Low-level utilities: linear algebra, random numbers

## Example

```rust,no_run
use activity_tree_model_rs::library::load_dir;
use activity_tree_model_rs::sampler::{DescriptionPrior, PriorConfig};
use activity_tree_model_rs::common::rng::SimpleRng;
use activity_tree_model_rs::model::TrajectorySet;
use activity_tree_model_rs::gp::assemble_data;

let library = load_dir("library/")?;
let prior = DescriptionPrior::new(&library, PriorConfig::default());

// Three individuals over a 100-frame clip
let mut rng = SimpleRng::new(42);
let individuals = TrajectorySet::from_iter(0..3);
let description = prior.sample(&mut rng, 0, 99, individuals)?;

let data = assemble_data(&description, prior.config().dims)?;
println!("{} trajectories realized", data.len());
# Ok::<(), activity_tree_model_rs::errors::ModelError>(())
```
*/

pub mod common;
pub mod endpoints;
pub mod errors;
pub mod gp;
pub mod io;
pub mod library;
pub mod model;
pub mod sampler;

pub use errors::{LoadError, ModelError};
pub use library::ActivityLibrary;
pub use model::{Data, Description, Trajectory, TrajectorySet};
pub use sampler::{DescriptionPrior, PriorConfig};
