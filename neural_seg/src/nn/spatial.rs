//! Local spatial encoding.

use burn::module::Module;
use burn::prelude::*;
use seg_core::DESCRIPTOR_DIM;

use crate::config::{Activation, SharedMlpConfig};
use crate::nn::mlp::SharedMlp;

/// Embeds relative position descriptors and attaches them to each point's features.
///
/// The 10-wide descriptor of every (point, neighbour) pair goes through a shared
/// transform with batch norm and ReLU; the result is concatenated with the point's own
/// feature vector repeated along the neighbour axis.
#[derive(Module, Debug)]
pub struct LocalSpatialEncoding<B: Backend> {
    mlp: SharedMlp<B>,
}

impl<B: Backend> LocalSpatialEncoding<B> {
    /// Create an encoding that embeds descriptors to `d` channels.
    pub fn new(d: usize, device: &B::Device) -> Self {
        let mlp = SharedMlpConfig::new(DESCRIPTOR_DIM, d)
            .with_batch_norm(true)
            .with_activation(Activation::Relu)
            .init(device);
        Self { mlp }
    }

    /// Forward pass.
    ///
    /// Inputs:
    /// - descriptors: [batch, points, k, 10]
    /// - features: [batch, points, channels]
    ///
    /// Output: [batch, points, k, d + channels]
    pub fn forward(&self, descriptors: Tensor<B, 4>, features: Tensor<B, 3>) -> Tensor<B, 4> {
        let k = descriptors.dims()[2];
        let embedded = self.mlp.forward(descriptors);
        let broadcast = features.unsqueeze_dim::<4>(2).repeat_dim(2, k);
        Tensor::cat(vec![embedded, broadcast], 3)
    }

    /// Width of the descriptor embedding.
    pub fn embedding_dim(&self) -> usize {
        self.mlp.d_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_spatial_encoding_shape() {
        let device = Default::default();
        let lse = LocalSpatialEncoding::<TestBackend>::new(8, &device);

        let descriptors = Tensor::zeros([2, 32, 4, DESCRIPTOR_DIM], &device);
        let features = Tensor::zeros([2, 32, 8], &device);
        let output = lse.forward(descriptors, features);

        assert_eq!(output.dims(), [2, 32, 4, 16]);
        assert_eq!(lse.embedding_dim(), 8);
    }

    #[test]
    fn test_features_repeat_over_neighbours() {
        let device = Default::default();
        let lse = LocalSpatialEncoding::<TestBackend>::new(2, &device);

        let descriptors = Tensor::zeros([1, 1, 3, DESCRIPTOR_DIM], &device);
        let features = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![5.0f32, -1.0], [1, 1, 2]),
            &device,
        );
        let tail = lse.forward(descriptors, features).narrow(3, 2, 2);
        let values = tail.into_data().convert::<f32>().into_vec::<f32>().unwrap();

        assert_eq!(values, vec![5.0, -1.0, 5.0, -1.0, 5.0, -1.0]);
    }
}
