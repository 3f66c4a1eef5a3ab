//! Core value types shared across the workspace.
//!
//! Provides the 3D point used for clouds and the voxel coordinate used for dense volumes.

use core::ops::{Add, Div, Mul, Sub};

/// A point in a cloud, also used as a 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Point3 {
    /// Create a new Point3.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Components as `[x, y, z]`, the layout used by [`CloudBatch`](crate::CloudBatch).
    #[inline]
    pub const fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    fn zip_with(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }

    /// Squared Euclidean length, the metric neighbour search ranks by.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        self.zip_with(other, f32::min)
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        self.zip_with(other, f32::max)
    }
}

impl From<[f32; 3]> for Point3 {
    #[inline]
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point3> for [f32; 3] {
    #[inline]
    fn from(p: Point3) -> Self {
        p.as_array()
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f32) -> Self {
        self * scalar.recip()
    }
}

/// Integer coordinate of a voxel in a dense volume, in axis order (axis0, axis1, axis2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VoxelCoord {
    /// Index along the slowest-varying axis.
    pub a0: usize,
    /// Index along the middle axis.
    pub a1: usize,
    /// Index along the fastest-varying axis.
    pub a2: usize,
}

impl VoxelCoord {
    /// Create a new VoxelCoord.
    #[inline]
    pub const fn new(a0: usize, a1: usize, a2: usize) -> Self {
        Self { a0, a1, a2 }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [usize; 3] {
        [self.a0, self.a1, self.a2]
    }

    /// Compute the row-major flat index for a volume of the given shape.
    /// index = a2 + a1 * shape[2] + a0 * shape[1] * shape[2]
    #[inline]
    pub const fn flat_index(&self, shape: [usize; 3]) -> usize {
        self.a2 + self.a1 * shape[2] + self.a0 * shape[1] * shape[2]
    }

    /// Create a VoxelCoord from a row-major flat index.
    #[inline]
    pub const fn from_flat_index(index: usize, shape: [usize; 3]) -> Self {
        let plane = shape[1] * shape[2];
        Self {
            a0: index / plane,
            a1: (index % plane) / shape[2],
            a2: index % shape[2],
        }
    }

    /// The voxel position as floating point coordinates.
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        [self.a0 as f32, self.a1 as f32, self.a2 as f32]
    }
}

impl From<[usize; 3]> for VoxelCoord {
    #[inline]
    fn from(arr: [usize; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(0.5, -1.0, 2.0);

        assert_eq!(a + b, Point3::new(1.5, 1.0, 5.0));
        assert_eq!(a - b, Point3::new(0.5, 3.0, 1.0));
        assert_eq!(a * 2.0, Point3::new(2.0, 4.0, 6.0));
        assert_eq!(a / 2.0, Point3::new(0.5, 1.0, 1.5));
        assert_eq!(a.min(b), Point3::new(0.5, -1.0, 2.0));
        assert_eq!(Point3::from([1.0, 2.0, 3.0]), a);
    }

    #[test]
    fn test_point_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert!((b.length_squared() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_voxel_flat_index_roundtrip() {
        let shape = [3, 4, 5];
        for index in 0..60 {
            let voxel = VoxelCoord::from_flat_index(index, shape);
            assert_eq!(voxel.flat_index(shape), index);
        }
        assert_eq!(VoxelCoord::new(1, 2, 3).flat_index(shape), 3 + 2 * 5 + 20);
    }
}
