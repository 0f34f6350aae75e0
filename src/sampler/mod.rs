//! Generative priors
//!
//! The recursive ancestral-sampling machinery that builds a
//! [`Description`](crate::model::Description):
//!
//! - [`association`] - CRP grouping of a parent's individuals into roles
//! - [`sequence`] - Per-role Markov-chain activity timelines
//! - [`params`] - Continuous parameter prior for intentional children
//! - [`description`] - The recursive tree sampler and its configuration

pub mod association;
pub mod description;
pub mod params;
pub mod sequence;

pub use association::{sample_association, Association, Group};
pub use description::{DescriptionPrior, PriorConfig};
