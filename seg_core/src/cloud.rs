//! Host-side coordinates for a batch of equally sized point clouds.
//!
//! The network keeps coordinates here rather than on the compute device: neighbour search,
//! permutation and truncation all run against this buffer.

use crate::error::{Result, SegCoreError};
use crate::permutation::Permutation;

/// Coordinates of `batch` clouds with `num_points` points each, stored batch-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudBatch {
    batch: usize,
    num_points: usize,
    coords: Vec<[f32; 3]>,
}

impl CloudBatch {
    /// Wrap batch-major coordinates.
    pub fn new(batch: usize, num_points: usize, coords: Vec<[f32; 3]>) -> Result<Self> {
        let expected = batch * num_points;
        if coords.len() != expected {
            return Err(SegCoreError::LengthMismatch {
                expected,
                got: coords.len(),
            });
        }
        Ok(Self {
            batch,
            num_points,
            coords,
        })
    }

    /// Build from a flat `[batch, num_points, 3]` buffer.
    pub fn from_flat(batch: usize, num_points: usize, flat: &[f32]) -> Result<Self> {
        let expected = batch * num_points * 3;
        if flat.len() != expected {
            return Err(SegCoreError::LengthMismatch {
                expected,
                got: flat.len(),
            });
        }
        let coords = flat
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(Self {
            batch,
            num_points,
            coords,
        })
    }

    /// Build from a single cloud.
    pub fn single(points: Vec<[f32; 3]>) -> Self {
        Self {
            batch: 1,
            num_points: points.len(),
            coords: points,
        }
    }

    /// Number of clouds.
    #[inline]
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Number of points per cloud.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Coordinates of one cloud.
    #[inline]
    pub fn element(&self, b: usize) -> &[[f32; 3]] {
        let start = b * self.num_points;
        &self.coords[start..start + self.num_points]
    }

    /// All coordinates, batch-major.
    #[inline]
    pub fn as_slice(&self) -> &[[f32; 3]] {
        &self.coords
    }

    /// Flatten to a `[batch, num_points, 3]` buffer.
    pub fn to_flat(&self) -> Vec<f32> {
        self.coords.iter().flat_map(|c| c.iter().copied()).collect()
    }

    /// Reorder the points of every cloud by the same permutation.
    pub fn permuted(&self, permutation: &Permutation) -> Result<Self> {
        if permutation.len() != self.num_points {
            return Err(SegCoreError::LengthMismatch {
                expected: self.num_points,
                got: permutation.len(),
            });
        }
        let mut coords = Vec::with_capacity(self.coords.len());
        for b in 0..self.batch {
            coords.extend(permutation.apply(self.element(b))?);
        }
        Ok(Self {
            batch: self.batch,
            num_points: self.num_points,
            coords,
        })
    }

    /// Keep the first `len` points of every cloud.
    pub fn prefix(&self, len: usize) -> Result<Self> {
        if len > self.num_points {
            return Err(SegCoreError::LengthMismatch {
                expected: self.num_points,
                got: len,
            });
        }
        let mut coords = Vec::with_capacity(self.batch * len);
        for b in 0..self.batch {
            coords.extend_from_slice(&self.element(b)[..len]);
        }
        Ok(Self {
            batch: self.batch,
            num_points: len,
            coords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clouds() -> CloudBatch {
        let flat: Vec<f32> = (0..2 * 4 * 3).map(|i| i as f32).collect();
        CloudBatch::from_flat(2, 4, &flat).unwrap()
    }

    #[test]
    fn test_from_flat_layout() {
        let cloud = two_clouds();
        assert_eq!(cloud.element(0)[1], [3.0, 4.0, 5.0]);
        assert_eq!(cloud.element(1)[0], [12.0, 13.0, 14.0]);
        assert_eq!(cloud.to_flat().len(), 24);
    }

    #[test]
    fn test_from_flat_rejects_bad_length() {
        let err = CloudBatch::from_flat(2, 4, &[0.0; 10]).unwrap_err();
        assert_eq!(
            err,
            SegCoreError::LengthMismatch {
                expected: 24,
                got: 10
            }
        );
    }

    #[test]
    fn test_permuted_applies_to_every_element() {
        let cloud = two_clouds();
        let perm = Permutation::from_indices(vec![3, 2, 1, 0]).unwrap();
        let permuted = cloud.permuted(&perm).unwrap();

        assert_eq!(permuted.element(0)[0], cloud.element(0)[3]);
        assert_eq!(permuted.element(1)[3], cloud.element(1)[0]);
    }

    #[test]
    fn test_prefix_truncates_each_cloud() {
        let cloud = two_clouds();
        let prefix = cloud.prefix(2).unwrap();

        assert_eq!(prefix.num_points(), 2);
        assert_eq!(prefix.element(1), &cloud.element(1)[..2]);
        assert!(cloud.prefix(5).is_err());
    }
}
