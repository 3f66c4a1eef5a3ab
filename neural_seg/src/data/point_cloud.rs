//! Point cloud container and tensor batching.

use burn::prelude::*;
use seg_core::Point3;

use crate::error::{NeuralSegError, Result};

/// A point cloud with a fixed-width feature vector per point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<Point3>,
    /// Per-point features, row-major `[points, feature_dim]`.
    features: Vec<f32>,
    feature_dim: usize,
}

impl PointCloud {
    /// Create a point cloud without features.
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            features: Vec::new(),
            feature_dim: 0,
        }
    }

    /// Create a point cloud with `feature_dim` features per point.
    pub fn with_features(points: Vec<Point3>, features: Vec<f32>, feature_dim: usize) -> Result<Self> {
        if features.len() != points.len() * feature_dim {
            return Err(NeuralSegError::InvalidData(format!(
                "{} feature values for {} points of width {}",
                features.len(),
                points.len(),
                feature_dim
            )));
        }
        Ok(Self {
            points,
            features,
            feature_dim,
        })
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Features per point.
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Row-major feature buffer.
    pub fn features(&self) -> &[f32] {
        &self.features
    }

    /// Features of one point.
    pub fn features_of(&self, index: usize) -> Option<&[f32]> {
        let start = index * self.feature_dim;
        self.features.get(start..start + self.feature_dim)
    }

    /// Axis-aligned `(min, max)` corners, `None` for an empty cloud.
    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Mean position, `None` for an empty cloud.
    pub fn centroid(&self) -> Option<Point3> {
        if self.points.is_empty() {
            return None;
        }
        let total = self.points.iter().fold(Point3::default(), |acc, &p| acc + p);
        Some(total / self.points.len() as f32)
    }

    /// Translate so the centroid sits at the origin.
    pub fn center(&mut self) {
        let Some(offset) = self.centroid() else {
            return;
        };
        self.points.iter_mut().for_each(|p| *p = *p - offset);
    }

    /// Center the cloud and scale it so its bounding-box diagonal has unit length.
    pub fn normalize(&mut self) {
        self.center();
        let diagonal = match self.bounding_box() {
            Some((lo, hi)) => (hi - lo).length(),
            None => return,
        };
        if diagonal > 0.0 {
            self.points.iter_mut().for_each(|p| *p = *p / diagonal);
        }
    }

    /// Coordinates as arrays, in point order.
    pub fn coords(&self) -> Vec<[f32; 3]> {
        self.points.iter().map(Point3::as_array).collect()
    }
}

/// Stack equally sized clouds into `([batch, points, 3], [batch, points, feature_dim])`.
pub fn collate<B: Backend>(
    clouds: &[PointCloud],
    device: &B::Device,
) -> Result<(Tensor<B, 3>, Tensor<B, 3>)> {
    let first = clouds
        .first()
        .ok_or_else(|| NeuralSegError::InvalidData("cannot collate an empty batch".into()))?;
    let (num_points, feature_dim) = (first.len(), first.feature_dim());

    let mut coords = Vec::with_capacity(clouds.len() * num_points * 3);
    let mut features = Vec::with_capacity(clouds.len() * num_points * feature_dim);
    for (i, cloud) in clouds.iter().enumerate() {
        if cloud.len() != num_points || cloud.feature_dim() != feature_dim {
            return Err(NeuralSegError::ShapeMismatch {
                expected: vec![num_points, feature_dim],
                got: vec![cloud.len(), cloud.feature_dim()],
            });
        }
        log::trace!("collating cloud {} with {} points", i, cloud.len());
        coords.extend(cloud.points.iter().flat_map(|p| p.as_array()));
        features.extend_from_slice(cloud.features());
    }

    let batch = clouds.len();
    Ok((
        Tensor::from_data(TensorData::new(coords, [batch, num_points, 3]), device),
        Tensor::from_data(
            TensorData::new(features, [batch, num_points, feature_dim]),
            device,
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn cloud(offset: f32) -> PointCloud {
        let points = vec![
            Point3::new(offset, 0.0, 0.0),
            Point3::new(0.0, offset, 0.0),
        ];
        PointCloud::with_features(points, vec![1.0, 2.0, 3.0, 4.0], 2).unwrap()
    }

    #[test]
    fn test_point_cloud_creation() {
        let cloud = cloud(1.0);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.feature_dim(), 2);
        assert_eq!(cloud.features_of(1), Some(&[3.0, 4.0][..]));
        assert_eq!(cloud.features_of(2), None);
    }

    #[test]
    fn test_feature_length_checked() {
        let points = vec![Point3::new(0.0, 0.0, 0.0)];
        assert!(PointCloud::with_features(points, vec![1.0, 2.0], 3).is_err());
    }

    #[test]
    fn test_bounding_box() {
        let cloud = PointCloud::new(vec![
            Point3::new(4.0, -2.0, 0.5),
            Point3::new(-1.0, 3.0, 0.5),
            Point3::new(0.0, 0.0, -6.0),
        ]);
        let (lo, hi) = cloud.bounding_box().unwrap();
        assert_eq!(lo, Point3::new(-1.0, -2.0, -6.0));
        assert_eq!(hi, Point3::new(4.0, 3.0, 0.5));
        assert!(PointCloud::new(Vec::new()).bounding_box().is_none());
    }

    #[test]
    fn test_normalize() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)];
        let mut cloud = PointCloud::new(points);
        cloud.normalize();

        assert!(cloud.centroid().unwrap().length() < 1e-6);
        let (lo, hi) = cloud.bounding_box().unwrap();
        assert!(((hi - lo).length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_collate() {
        let device = Default::default();
        let (coords, features) =
            collate::<TestBackend>(&[cloud(1.0), cloud(2.0)], &device).unwrap();

        assert_eq!(coords.dims(), [2, 2, 3]);
        assert_eq!(features.dims(), [2, 2, 2]);
    }

    #[test]
    fn test_collate_rejects_ragged_batch() {
        let device = Default::default();
        let short = PointCloud::new(vec![Point3::new(0.0, 0.0, 0.0)]);
        let result = collate::<TestBackend>(&[cloud(1.0), short], &device);
        assert!(matches!(result, Err(NeuralSegError::ShapeMismatch { .. })));
    }
}
