//! Trajectory sets
//!
//! An ordered set of unique trajectory indices identifying which
//! individuals participate in an activity. Backed by a sorted vector so
//! that rank-based access (`nth`) and sorted-sequence comparison stay
//! cheap for the small sets this model produces.

/// Ordered set of unique non-negative trajectory indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrajectorySet {
    indices: Vec<usize>,
}

impl TrajectorySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary indices (duplicates collapse)
    pub fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::new();
        for idx in iter {
            set.insert(idx);
        }
        set
    }

    /// Insert an index; returns true when it was not already present
    pub fn insert(&mut self, index: usize) -> bool {
        match self.indices.binary_search(&index) {
            Ok(_) => false,
            Err(pos) => {
                self.indices.insert(pos, index);
                true
            }
        }
    }

    /// Membership test
    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Number of members
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the set has no members
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Member at rank `k` in ascending order
    pub fn nth(&self, k: usize) -> Option<usize> {
        self.indices.get(k).copied()
    }

    /// Iterate members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Members as a sorted slice
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Insert every member of `other`
    pub fn union_with(&mut self, other: &TrajectorySet) {
        for idx in other.iter() {
            self.insert(idx);
        }
    }

    /// True when every member of `self` is also in `other`
    pub fn is_subset_of(&self, other: &TrajectorySet) -> bool {
        self.iter().all(|idx| other.contains(idx))
    }

    /// True when the indices are exactly `0..len` (contiguous from zero)
    pub fn is_contiguous_from_zero(&self) -> bool {
        self.indices.iter().enumerate().all(|(k, &idx)| k == idx)
    }
}
