//! Configuration types for neural_seg.
//!
//! Burn-style configuration structs for the shared transforms, the aggregation block and
//! both networks.

mod network;

pub use network::{
    Activation, LocalFeatureAggregationConfig, RandLaClassifierConfig, RandLaNetConfig,
    SharedMlpConfig,
};
