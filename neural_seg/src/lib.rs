//! # neural_seg
//!
//! RandLA-style point-cloud networks built on Burn.
//!
//! This crate assembles the learned layers of a hierarchical point-set encoder/decoder on
//! top of the framework-free pieces in `seg_core` (neighbour search, descriptors,
//! permutations, the decimation ladder and the stage stack).
//!
//! ## Features
//!
//! - **Shared transforms**: point-wise linear + batch norm + activation, any tensor rank
//! - **Local spatial encoding**: learned embedding of 10-wide relative position descriptors
//! - **Attentive pooling**: softmax-weighted neighbour aggregation
//! - **Segmentation**: `RandLaNet`, per-point logits restored to input order
//! - **Classification**: `RandLaClassifier`, one logit vector per cloud
//!
//! ## Quick Start
//!
//! ```ignore
//! use burn::backend::NdArray;
//! use neural_seg::prelude::*;
//! use rand::SeedableRng;
//!
//! let device = Default::default();
//! let net = RandLaNetConfig::new(3, 5)
//!     .with_num_neighbors(4)
//!     .init::<NdArray>(&device)?;
//!
//! let (coords, features) = collate::<NdArray>(&clouds, &device)?;
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
//! let scores = net.forward(coords, features, &mut rng)?; // [batch, points, 5]
//! ```
//!
//! ## Architecture
//!
//! ```text
//! seg_core (host algorithms)
//!     │  neighbour search, descriptors, permutations, ladder, stage stack
//!     ▼
//! neural_seg (burn modules)
//!     │  stem → LFA × stages → bridge → decoder × stages → head
//!     ▼
//! demos (timing, volume analysis)
//! ```
//!
//! ## Feature Flags
//!
//! - `ndarray` (default): CPU backend using ndarray
//! - `wgpu`: GPU acceleration via WebGPU
//! - `autodiff`: Autodiff decorator for training loops

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod nn;

// Re-export key types for convenience
pub use config::{LocalFeatureAggregationConfig, RandLaClassifierConfig, RandLaNetConfig};
pub use error::{NeuralSegError, Result};
pub use nn::{RandLaClassifier, RandLaNet};

// Re-export from seg_core for convenience
pub use seg_core::{BruteForceSearch, KdTreeSearch, NeighborSearch, Permutation, Point3};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        Activation, LocalFeatureAggregationConfig, RandLaClassifierConfig, RandLaNetConfig,
        SharedMlpConfig,
    };
    pub use crate::data::{collate, PointCloud};
    pub use crate::error::{NeuralSegError, Result};
    pub use crate::nn::{
        ActivePoints, AttentivePooling, ClassifierHead, LocalFeatureAggregation,
        LocalSpatialEncoding, RandLaClassifier, RandLaNet, SharedMlp,
    };

    pub use seg_core::{
        BruteForceSearch, CloudBatch, DeviceAffinity, KdTreeSearch, NeighborSearch,
        Permutation, Point3,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_public_api() {
        let _segmentation = RandLaNetConfig::new(3, 5);
        let _classification = RandLaClassifierConfig::new(4, 10);
        let _block = LocalFeatureAggregationConfig::new(8, 16);
    }

    #[test]
    fn test_network_creation() {
        let device = Default::default();
        let net = RandLaNetConfig::new(3, 5)
            .init::<TestBackend>(&device)
            .unwrap();
        assert_eq!(net.num_stages(), 4);
        assert_eq!(net.num_neighbors(), 16);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let device = Default::default();
        let result = RandLaClassifierConfig::new(4, 0).init::<TestBackend>(&device);
        assert!(matches!(result, Err(NeuralSegError::InvalidConfig { .. })));
    }
}
