//! Neural network modules for hierarchical point-cloud learning.
//!
//! This module provides:
//! - Building blocks: shared transforms, local spatial encoding, attentive pooling
//! - The local feature aggregation block that combines them around one neighbourhood
//! - Full networks: per-point segmentation and per-cloud classification

pub mod aggregation;
pub mod classification;
pub mod head;
mod input;
pub mod mlp;
pub mod neighbors;
pub mod pooling;
pub mod segmentation;
pub mod spatial;

pub use aggregation::LocalFeatureAggregation;
pub use classification::RandLaClassifier;
pub use head::ClassifierHead;
pub use mlp::SharedMlp;
pub use neighbors::{gather_points, neighborhood, permute_rows, ActivePoints};
pub use pooling::AttentivePooling;
pub use segmentation::RandLaNet;
pub use spatial::LocalSpatialEncoding;
