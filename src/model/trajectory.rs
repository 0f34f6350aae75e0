//! Trajectory containers
//!
//! A [`Trajectory`] is a multi-dimensional, time-indexed position
//! sequence with a start frame. All per-dimension arrays have identical
//! length, and frames are addressed globally: the trajectory covers the
//! inclusive frame range `[start, end]` with `end = start + size - 1`.

use nalgebra::DVector;

use crate::errors::ModelError;

/// A time-indexed position sequence for one tracked individual.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    start: usize,
    /// One value array per spatial dimension; all of equal length.
    values: Vec<Vec<f64>>,
}

impl Trajectory {
    /// Create an empty trajectory starting at `start` (no dimensions yet).
    pub fn new(start: usize) -> Self {
        Self {
            start,
            values: Vec::new(),
        }
    }

    /// Create an all-zero trajectory of `size` frames and `dims` dimensions.
    pub fn with_zeros(start: usize, size: usize, dims: usize) -> Result<Self, ModelError> {
        if size == 0 {
            return Err(ModelError::Precondition {
                context: "trajectory size must be positive".to_string(),
            });
        }
        Ok(Self {
            start,
            values: vec![vec![0.0; size]; dims],
        })
    }

    /// First covered frame
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of frames per dimension
    #[inline]
    pub fn size(&self) -> usize {
        self.values.first().map(|v| v.len()).unwrap_or(0)
    }

    /// Last covered frame (inclusive). Equals `start` while empty.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.size().saturating_sub(1)
    }

    /// Number of spatial dimensions
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    fn check_frame(&self, dim: usize, frame: usize) -> Result<usize, ModelError> {
        if dim >= self.dimensions() {
            return Err(ModelError::Precondition {
                context: format!("dimension {} out of range (have {})", dim, self.dimensions()),
            });
        }
        if frame < self.start || frame > self.end() || self.size() == 0 {
            return Err(ModelError::Precondition {
                context: format!(
                    "frame {} outside trajectory range [{}, {}]",
                    frame,
                    self.start,
                    self.end()
                ),
            });
        }
        Ok(frame - self.start)
    }

    /// Value of dimension `dim` at global frame `frame` (bounds-checked)
    pub fn value(&self, dim: usize, frame: usize) -> Result<f64, ModelError> {
        let offset = self.check_frame(dim, frame)?;
        Ok(self.values[dim][offset])
    }

    /// Overwrite the value of dimension `dim` at global frame `frame`
    pub fn set_value(&mut self, dim: usize, frame: usize, value: f64) -> Result<(), ModelError> {
        let offset = self.check_frame(dim, frame)?;
        self.values[dim][offset] = value;
        Ok(())
    }

    /// All dimensions at one global frame, as a column vector
    pub fn frame_vector(&self, frame: usize) -> Result<DVector<f64>, ModelError> {
        if self.dimensions() == 0 {
            return Err(ModelError::Precondition {
                context: "trajectory has no dimensions".to_string(),
            });
        }
        self.check_frame(0, frame)?;
        let offset = frame - self.start;
        Ok(DVector::from_fn(self.dimensions(), |d, _| {
            self.values[d][offset]
        }))
    }

    /// Replace one dimension's samples; the length must match `size`
    pub fn set_dimension(&mut self, dim: usize, samples: Vec<f64>) -> Result<(), ModelError> {
        if dim >= self.dimensions() {
            return Err(ModelError::Precondition {
                context: format!("dimension {} out of range (have {})", dim, self.dimensions()),
            });
        }
        if samples.len() != self.size() {
            return Err(ModelError::DimensionMismatch {
                expected: self.size(),
                actual: samples.len(),
                context: "trajectory dimension length".to_string(),
            });
        }
        self.values[dim] = samples;
        Ok(())
    }

    /// Append a new dimension; the length must match existing dimensions
    pub fn push_dimension(&mut self, samples: Vec<f64>) -> Result<(), ModelError> {
        if samples.is_empty() {
            return Err(ModelError::Precondition {
                context: "trajectory dimension must be non-empty".to_string(),
            });
        }
        if self.dimensions() > 0 && samples.len() != self.size() {
            return Err(ModelError::DimensionMismatch {
                expected: self.size(),
                actual: samples.len(),
                context: "trajectory dimension length".to_string(),
            });
        }
        self.values.push(samples);
        Ok(())
    }

    /// True when every stored value is exactly zero (placeholder state)
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|dim| dim.iter().all(|&v| v == 0.0))
    }

    /// Raw read access to one dimension's samples
    pub fn dimension(&self, dim: usize) -> Option<&[f64]> {
        self.values.get(dim).map(|v| v.as_slice())
    }
}

/// The global ordered list of trajectories for one clip.
#[derive(Debug, Clone, Default)]
pub struct Data {
    trajectories: Vec<Trajectory>,
}

impl Data {
    /// Create an empty data set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trajectories
    #[inline]
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    /// True when no trajectories are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Append a trajectory, returning its index
    pub fn push(&mut self, trajectory: Trajectory) -> usize {
        self.trajectories.push(trajectory);
        self.trajectories.len() - 1
    }

    /// Trajectory at `index`
    pub fn get(&self, index: usize) -> Option<&Trajectory> {
        self.trajectories.get(index)
    }

    /// Mutable trajectory at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Trajectory> {
        self.trajectories.get_mut(index)
    }

    /// Iterate over trajectories in index order
    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_zeros() {
        let t = Trajectory::with_zeros(5, 10, 2).unwrap();
        assert_eq!(t.start(), 5);
        assert_eq!(t.size(), 10);
        assert_eq!(t.end(), 14);
        assert_eq!(t.dimensions(), 2);
        assert!(t.is_zero());
    }

    #[test]
    fn test_with_zeros_rejects_empty() {
        assert!(Trajectory::with_zeros(0, 0, 2).is_err());
    }

    #[test]
    fn test_value_bounds() {
        let mut t = Trajectory::with_zeros(5, 3, 1).unwrap();
        t.set_value(0, 6, 2.5).unwrap();
        assert_eq!(t.value(0, 6).unwrap(), 2.5);
        assert!(t.value(0, 4).is_err());
        assert!(t.value(0, 8).is_err());
        assert!(t.value(1, 6).is_err());
        assert!(!t.is_zero());
    }

    #[test]
    fn test_push_dimension_length_check() {
        let mut t = Trajectory::new(0);
        t.push_dimension(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(t.size(), 3);
        assert!(t.push_dimension(vec![1.0]).is_err());
        t.push_dimension(vec![4.0, 5.0, 6.0]).unwrap();
        assert_eq!(t.dimensions(), 2);
    }

    #[test]
    fn test_set_dimension_length_check() {
        let mut t = Trajectory::with_zeros(0, 3, 1).unwrap();
        assert!(t.set_dimension(0, vec![1.0, 2.0]).is_err());
        t.set_dimension(0, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(t.value(0, 2).unwrap(), 3.0);
    }

    #[test]
    fn test_frame_vector() {
        let mut t = Trajectory::with_zeros(2, 2, 2).unwrap();
        t.set_value(0, 3, 1.0).unwrap();
        t.set_value(1, 3, -1.0).unwrap();
        let v = t.frame_vector(3).unwrap();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], -1.0);
    }

    #[test]
    fn test_data_indexing() {
        let mut data = Data::new();
        let idx = data.push(Trajectory::with_zeros(0, 4, 2).unwrap());
        assert_eq!(idx, 0);
        assert_eq!(data.len(), 1);
        assert!(data.get(0).is_some());
        assert!(data.get(1).is_none());
    }
}
