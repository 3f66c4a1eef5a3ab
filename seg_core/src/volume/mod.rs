//! Dense volume analysis: connected components, centres of mass and boundary vectors.
//!
//! Volumes are stored row-major in axis order (axis0, axis1, axis2). A voxel is foreground
//! when its value differs from `T::default()`.

mod distance;
mod label;
mod moments;

pub use distance::{boundary_vector_distance_transform, vector_norms};
pub use label::{label_components, Connectivity, Labeling};
pub use moments::{center_offsets, centers_of_mass};

use crate::error::{Result, SegCoreError};
use crate::types::VoxelCoord;

/// A dense 3D array.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T: Clone> Volume<T> {
    /// A volume with every voxel set to `value`.
    pub fn filled(shape: [usize; 3], value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape[0] * shape[1] * shape[2]],
        }
    }
}

impl<T> Volume<T> {
    /// Wrap row-major data.
    pub fn new(shape: [usize; 3], data: Vec<T>) -> Result<Self> {
        let expected = shape[0] * shape[1] * shape[2];
        if data.len() != expected {
            return Err(SegCoreError::LengthMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Stack equally sized 2D slices along axis 0.
    pub fn from_slices<const R: usize, const C: usize>(slices: &[[[T; C]; R]]) -> Self
    where
        T: Copy,
    {
        let data = slices
            .iter()
            .flat_map(|slice| slice.iter().flat_map(|row| row.iter().copied()))
            .collect();
        Self {
            shape: [slices.len(), R, C],
            data,
        }
    }

    /// Extent along each axis.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Total number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major voxel values.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Value at a voxel, or `None` outside the volume.
    pub fn get(&self, voxel: VoxelCoord) -> Option<&T> {
        if self.contains(voxel) {
            self.data.get(voxel.flat_index(self.shape))
        } else {
            None
        }
    }

    /// Mutable value at a voxel, or `None` outside the volume.
    pub fn get_mut(&mut self, voxel: VoxelCoord) -> Option<&mut T> {
        if self.contains(voxel) {
            let index = voxel.flat_index(self.shape);
            self.data.get_mut(index)
        } else {
            None
        }
    }

    /// Check whether a voxel lies inside the volume.
    #[inline]
    pub fn contains(&self, voxel: VoxelCoord) -> bool {
        voxel.a0 < self.shape[0] && voxel.a1 < self.shape[1] && voxel.a2 < self.shape[2]
    }

    /// Iterate over `(voxel, value)` in raster order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, &T)> {
        let shape = self.shape;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (VoxelCoord::from_flat_index(i, shape), v))
    }

    /// Apply `f` to every voxel.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Volume<U> {
        Volume {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub(crate) fn check_shape<U>(&self, other: &Volume<U>) -> Result<()> {
        if self.shape != other.shape {
            return Err(SegCoreError::VolumeShapeMismatch {
                expected: self.shape,
                got: other.shape,
            });
        }
        Ok(())
    }
}
