//! Local feature aggregation block.

use burn::module::Module;
use burn::prelude::*;
use burn::tensor::activation::leaky_relu;
use seg_core::NeighborSearch;

use crate::config::{Activation, LocalFeatureAggregationConfig, SharedMlpConfig};
use crate::error::Result;
use crate::nn::mlp::SharedMlp;
use crate::nn::neighbors::{neighborhood, ActivePoints};
use crate::nn::pooling::AttentivePooling;
use crate::nn::spatial::LocalSpatialEncoding;

/// Negative slope of the block's input projection.
const INPUT_SLOPE: f64 = 0.2;
/// Negative slope of the block's output activation.
const OUTPUT_SLOPE: f64 = 0.01;

/// Two rounds of spatial encoding and attentive pooling with a residual shortcut.
///
/// The neighbourhood is searched once per call and shared by both rounds. The output is
/// always `2 * d_output` wide.
#[derive(Module, Debug)]
pub struct LocalFeatureAggregation<B: Backend> {
    mlp1: SharedMlp<B>,
    lse1: LocalSpatialEncoding<B>,
    pool1: AttentivePooling<B>,
    lse2: LocalSpatialEncoding<B>,
    pool2: AttentivePooling<B>,
    mlp2: SharedMlp<B>,
    shortcut: SharedMlp<B>,
    num_neighbors: usize,
}

impl<B: Backend> LocalFeatureAggregation<B> {
    /// Create a block from configuration.
    ///
    /// The configuration is expected to have passed
    /// [`validate`](LocalFeatureAggregationConfig::validate).
    pub fn new(config: &LocalFeatureAggregationConfig, device: &B::Device) -> Self {
        let half = config.d_output / 2;

        let mlp1 = SharedMlpConfig::new(config.d_input, half)
            .with_activation(Activation::LeakyRelu(INPUT_SLOPE))
            .init(device);
        let mlp2 = SharedMlpConfig::new(config.d_output, config.output_dim()).init(device);
        let shortcut = SharedMlpConfig::new(config.d_input, config.output_dim())
            .with_batch_norm(true)
            .init(device);

        Self {
            mlp1,
            lse1: LocalSpatialEncoding::new(half, device),
            pool1: AttentivePooling::new(config.d_output, half, device),
            lse2: LocalSpatialEncoding::new(half, device),
            pool2: AttentivePooling::new(config.d_output, config.d_output, device),
            mlp2,
            shortcut,
            num_neighbors: config.num_neighbors,
        }
    }

    /// Forward pass over the active points.
    ///
    /// Input shape: features [batch, points, d_input]
    /// Output shape: [batch, points, 2 * d_output]
    pub fn forward(
        &self,
        points: &ActivePoints<B>,
        features: Tensor<B, 3>,
        search: &dyn NeighborSearch,
    ) -> Result<Tensor<B, 3>> {
        let descriptors = neighborhood(points, search, self.num_neighbors)?;
        Ok(self.forward_descriptors(descriptors, features))
    }

    /// Forward pass with precomputed `[batch, points, k, 10]` descriptors.
    pub fn forward_descriptors(
        &self,
        descriptors: Tensor<B, 4>,
        features: Tensor<B, 3>,
    ) -> Tensor<B, 3> {
        let x = self.mlp1.forward(features.clone());
        let x = self.pool1.forward(self.lse1.forward(descriptors.clone(), x));
        let x = self.pool2.forward(self.lse2.forward(descriptors, x));

        leaky_relu(
            self.mlp2.forward(x) + self.shortcut.forward(features),
            OUTPUT_SLOPE,
        )
    }

    /// Neighbours gathered per point.
    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }

    /// Output channels.
    pub fn d_output(&self) -> usize {
        self.mlp2.d_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;
    use seg_core::{BruteForceSearch, CloudBatch, KdTreeSearch};

    type TestBackend = NdArray;

    fn points(n: usize) -> ActivePoints<TestBackend> {
        let coords = (0..2 * n)
            .map(|i| {
                let t = i as f32;
                [t.sin(), (0.7 * t).cos(), 0.05 * t]
            })
            .collect();
        ActivePoints::from_host(CloudBatch::new(2, n, coords).unwrap(), &Default::default())
    }

    #[test]
    fn test_output_is_twice_target_width() {
        let device = Default::default();
        let config = LocalFeatureAggregationConfig::new(8, 16).with_num_neighbors(4);
        let block = LocalFeatureAggregation::<TestBackend>::new(&config, &device);

        let features = Tensor::random([2, 32, 8], Distribution::Normal(0.0, 1.0), &device);
        let output = block.forward(&points(32), features, &KdTreeSearch).unwrap();

        assert_eq!(output.dims(), [2, 32, 32]);
        assert_eq!(block.d_output(), 32);
    }

    #[test]
    fn test_same_neighbourhood_for_both_searches() {
        let device = Default::default();
        let config = LocalFeatureAggregationConfig::new(4, 8).with_num_neighbors(3);
        let block = LocalFeatureAggregation::<TestBackend>::new(&config, &device);
        let active = points(16);

        let features = Tensor::random([2, 16, 4], Distribution::Normal(0.0, 1.0), &device);
        let a = block
            .forward(&active, features.clone(), &KdTreeSearch)
            .unwrap();
        let b = block.forward(&active, features, &BruteForceSearch).unwrap();

        let diff: f32 = (a - b).abs().max().into_scalar();
        assert!(diff < 1e-4, "outputs differ by {diff}");
    }

    #[test]
    fn test_too_many_neighbours_is_an_error() {
        let device = Default::default();
        let config = LocalFeatureAggregationConfig::new(4, 8).with_num_neighbors(20);
        let block = LocalFeatureAggregation::<TestBackend>::new(&config, &device);

        let features = Tensor::zeros([2, 16, 4], &device);
        assert!(block.forward(&points(16), features, &KdTreeSearch).is_err());
    }
}
