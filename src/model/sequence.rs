//! Activity sequences
//!
//! An ordered list of activities sharing one role label, covering a
//! contiguous time span for one trajectory set. Tiling of the parent
//! span is validated when the sequence is attached to a
//! [`Description`](super::description::Description).

use super::activity::Activity;

/// Ordered, role-labeled list of activities under one parent.
#[derive(Debug, Clone)]
pub struct ActivitySequence {
    role: String,
    activities: Vec<Activity>,
}

impl ActivitySequence {
    /// Create a sequence from an ordered activity list
    pub fn new(role: impl Into<String>, activities: Vec<Activity>) -> Self {
        Self {
            role: role.into(),
            activities,
        }
    }

    /// Role label shared by all activities in the sequence
    #[inline]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Activities in temporal order
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub(crate) fn activities_mut(&mut self) -> &mut [Activity] {
        &mut self.activities
    }

    /// Number of activities
    #[inline]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// True when the sequence holds no activities
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}
