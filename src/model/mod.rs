//! Core data model
//!
//! The entities the samplers operate on, leaves first:
//!
//! - [`trajectory`] - Time-indexed position sequences and the global [`Data`] set
//! - [`trajectory_set`] - Ordered sets of participating trajectory indices
//! - [`activity`] - Physical / intentional activities and the [`Activity`] sum
//! - [`sequence`] - Role-labeled, span-tiling activity sequences
//! - [`description`] - The arena-backed activity tree

pub mod activity;
pub mod description;
pub mod sequence;
pub mod trajectory;
pub mod trajectory_set;

pub use activity::{Activity, IntentionalActivity, PhysicalActivity};
pub use description::{Description, NodeId, PhysId, SeqId, ROOT_NAME};
pub use sequence::ActivitySequence;
pub use trajectory::{Data, Trajectory};
pub use trajectory_set::TrajectorySet;
