//! Attentive pooling over the neighbour axis.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::config::{Activation, SharedMlpConfig};
use crate::nn::mlp::SharedMlp;

/// Learned, input-dependent weighting of neighbours in place of max or mean pooling.
///
/// A bias-free linear map scores every channel of every neighbour, the scores are
/// normalized with a softmax across neighbours, and the weighted sum over neighbours goes
/// through a shared transform with batch norm and ReLU.
#[derive(Module, Debug)]
pub struct AttentivePooling<B: Backend> {
    score: Linear<B>,
    mlp: SharedMlp<B>,
}

impl<B: Backend> AttentivePooling<B> {
    /// Create a pooling layer mapping `d_input` channels to `d_output`.
    pub fn new(d_input: usize, d_output: usize, device: &B::Device) -> Self {
        let score = LinearConfig::new(d_input, d_input)
            .with_bias(false)
            .init(device);
        let mlp = SharedMlpConfig::new(d_input, d_output)
            .with_batch_norm(true)
            .with_activation(Activation::Relu)
            .init(device);
        Self { score, mlp }
    }

    /// Attention weights over neighbours, summing to one along axis 2.
    ///
    /// Input shape: [batch, points, k, d_input]
    pub fn attention(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        softmax(self.score.forward(x), 2)
    }

    /// Forward pass.
    ///
    /// Input shape: [batch, points, k, d_input]
    /// Output shape: [batch, points, d_output]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        let [batch, points, _, channels] = x.dims();
        let weights = self.attention(x.clone());
        let pooled = (weights * x).sum_dim(2).reshape([batch, points, channels]);
        self.mlp.forward(pooled)
    }

    /// Output channels.
    pub fn d_output(&self) -> usize {
        self.mlp.d_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn test_pooling_collapses_neighbour_axis() {
        let device = Default::default();
        let pool = AttentivePooling::<TestBackend>::new(16, 8, &device);

        let input = Tensor::random([2, 10, 5, 16], Distribution::Normal(0.0, 1.0), &device);
        let output = pool.forward(input);

        assert_eq!(output.dims(), [2, 10, 8]);
        assert_eq!(pool.d_output(), 8);
    }

    #[test]
    fn test_attention_is_normalized() {
        let device = Default::default();
        let pool = AttentivePooling::<TestBackend>::new(4, 4, &device);

        let input = Tensor::random([1, 6, 7, 4], Distribution::Normal(0.0, 1.0), &device);
        let totals = pool.attention(input).sum_dim(2);
        let deviation: f32 = (totals - 1.0).abs().max().into_scalar();

        assert!(deviation < 1e-5);
    }

    #[test]
    fn test_neighbour_order_does_not_matter() {
        let device = Default::default();
        let pool = AttentivePooling::<TestBackend>::new(3, 5, &device);

        let data = vec![
            0.1f32, 0.2, 0.3, //
            -1.0, 0.5, 2.0, //
            0.7, -0.4, 0.0,
        ];
        let reversed = vec![
            0.7f32, -0.4, 0.0, //
            -1.0, 0.5, 2.0, //
            0.1, 0.2, 0.3,
        ];
        let a = pool.forward(Tensor::from_data(TensorData::new(data, [1, 1, 3, 3]), &device));
        let b = pool.forward(Tensor::from_data(
            TensorData::new(reversed, [1, 1, 3, 3]),
            &device,
        ));

        let diff: f32 = (a - b).abs().max().into_scalar();
        assert!(diff < 1e-5);
    }
}
