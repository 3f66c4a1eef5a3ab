//! Host-side point-cloud containers and batching.

mod point_cloud;

pub use point_cloud::{collate, PointCloud};
