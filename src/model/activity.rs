//! Physical and intentional activities
//!
//! The two node kinds of the activity tree. A [`PhysicalActivity`] is a
//! leaf with a concrete trajectory; an [`IntentionalActivity`] is a
//! branch realized only through its children. Tree-walking code
//! dispatches over the closed [`Activity`] sum by exhaustive `match`.

use nalgebra::DVector;

use super::description::{NodeId, PhysId};
use super::trajectory::Trajectory;
use super::trajectory_set::TrajectorySet;
use crate::errors::ModelError;

/// Leaf node: a motion primitive with a concrete trajectory.
#[derive(Debug, Clone)]
pub struct PhysicalActivity {
    name: String,
    trajectory: Trajectory,
    trajectories: TrajectorySet,
}

impl PhysicalActivity {
    /// Create a physical activity around an existing trajectory
    pub fn new(
        name: impl Into<String>,
        trajectory: Trajectory,
        trajectories: TrajectorySet,
    ) -> Result<Self, ModelError> {
        if trajectories.is_empty() {
            return Err(ModelError::Precondition {
                context: "physical activity requires a non-empty trajectory set".to_string(),
            });
        }
        if trajectory.size() == 0 {
            return Err(ModelError::Precondition {
                context: "physical activity requires a non-empty trajectory".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            trajectory,
            trajectories,
        })
    }

    /// Create a placeholder with an all-zero trajectory, to be filled in
    /// by the GP trajectory sampler.
    pub fn placeholder(
        name: impl Into<String>,
        start: usize,
        size: usize,
        dims: usize,
        trajectories: TrajectorySet,
    ) -> Result<Self, ModelError> {
        Self::new(name, Trajectory::with_zeros(start, size, dims)?, trajectories)
    }

    /// Activity name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First covered frame
    #[inline]
    pub fn start(&self) -> usize {
        self.trajectory.start()
    }

    /// Last covered frame (inclusive)
    #[inline]
    pub fn end(&self) -> usize {
        self.trajectory.end()
    }

    /// Number of covered frames
    #[inline]
    pub fn size(&self) -> usize {
        self.trajectory.size()
    }

    /// The concrete trajectory
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Mutable trajectory access (generative fill-in only)
    pub fn trajectory_mut(&mut self) -> &mut Trajectory {
        &mut self.trajectory
    }

    /// Participating individuals
    pub fn trajectories(&self) -> &TrajectorySet {
        &self.trajectories
    }
}

/// Branch node: a goal-directed activity that decomposes further.
#[derive(Debug, Clone)]
pub struct IntentionalActivity {
    name: String,
    start: usize,
    end: usize,
    params: DVector<f64>,
    trajectories: TrajectorySet,
}

impl IntentionalActivity {
    /// Create an intentional activity over the inclusive span `[start, end]`
    pub fn new(
        name: impl Into<String>,
        start: usize,
        end: usize,
        params: DVector<f64>,
        trajectories: TrajectorySet,
    ) -> Result<Self, ModelError> {
        if end < start {
            return Err(ModelError::Precondition {
                context: format!("intentional activity span [{}, {}] is empty", start, end),
            });
        }
        if trajectories.is_empty() {
            return Err(ModelError::Precondition {
                context: "intentional activity requires a non-empty trajectory set".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            start,
            end,
            params,
            trajectories,
        })
    }

    /// Activity name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First covered frame
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last covered frame (inclusive)
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of covered frames
    #[inline]
    pub fn size(&self) -> usize {
        self.end - self.start + 1
    }

    /// Continuous parameter vector (spatial target when flagged)
    pub fn params(&self) -> &DVector<f64> {
        &self.params
    }

    /// Participating individuals
    pub fn trajectories(&self) -> &TrajectorySet {
        &self.trajectories
    }
}

/// Closed sum over the two activity kinds, stored as arena handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Leaf activity with a concrete trajectory
    Physical(PhysId),
    /// Branch activity realized through child sequences
    Intentional(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_placeholder() {
        let set = TrajectorySet::from_iter([0]);
        let phys = PhysicalActivity::placeholder("WALK", 3, 5, 2, set).unwrap();
        assert_eq!(phys.start(), 3);
        assert_eq!(phys.end(), 7);
        assert_eq!(phys.size(), 5);
        assert!(phys.trajectory().is_zero());
    }

    #[test]
    fn test_physical_rejects_empty_set() {
        let err = PhysicalActivity::placeholder("WALK", 0, 5, 2, TrajectorySet::new()).unwrap_err();
        assert!(matches!(err, ModelError::Precondition { .. }));
    }

    #[test]
    fn test_intentional_span() {
        let set = TrajectorySet::from_iter([0, 1]);
        let node =
            IntentionalActivity::new("MEET", 2, 9, DVector::zeros(2), set.clone()).unwrap();
        assert_eq!(node.size(), 8);

        // Single-frame span is legal
        let single = IntentionalActivity::new("WAIT", 4, 4, DVector::zeros(2), set).unwrap();
        assert_eq!(single.size(), 1);
    }

    #[test]
    fn test_intentional_rejects_inverted_span() {
        let set = TrajectorySet::from_iter([0]);
        let err = IntentionalActivity::new("MEET", 5, 4, DVector::zeros(2), set).unwrap_err();
        assert!(matches!(err, ModelError::Precondition { .. }));
    }
}
