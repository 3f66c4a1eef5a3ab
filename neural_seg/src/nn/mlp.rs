//! Shared (point-wise) transforms.

use burn::module::Module;
use burn::nn::{
    BatchNorm, BatchNormConfig, LeakyRelu, LeakyReluConfig, Linear, LinearConfig, Relu,
};
use burn::prelude::*;

use crate::config::{Activation, SharedMlpConfig};

/// Batch norm epsilon used by every normalized transform.
pub const BATCH_NORM_EPSILON: f64 = 1e-6;
/// Batch norm running-statistics momentum.
pub const BATCH_NORM_MOMENTUM: f64 = 0.99;

impl SharedMlpConfig {
    /// Initialize the transform.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SharedMlp<B> {
        let linear = LinearConfig::new(self.d_input, self.d_output)
            .with_bias(self.bias)
            .init(device);

        let norm = self.batch_norm.then(|| {
            BatchNormConfig::new(self.d_output)
                .with_epsilon(BATCH_NORM_EPSILON)
                .with_momentum(BATCH_NORM_MOMENTUM)
                .init(device)
        });

        let (relu, leaky_relu) = match self.activation {
            Activation::Identity => (None, None),
            Activation::Relu => (Some(Relu::new()), None),
            Activation::LeakyRelu(slope) => (
                None,
                Some(LeakyReluConfig::new().with_negative_slope(slope).init()),
            ),
        };

        SharedMlp {
            linear,
            norm,
            relu,
            leaky_relu,
        }
    }
}

/// Linear projection applied identically to every point (and neighbour), optionally followed
/// by batch normalization and an activation.
///
/// Channels are always the last axis; any number of leading axes is accepted.
#[derive(Module, Debug)]
pub struct SharedMlp<B: Backend> {
    linear: Linear<B>,
    norm: Option<BatchNorm<B, 0>>,
    relu: Option<Relu>,
    leaky_relu: Option<LeakyRelu>,
}

impl<B: Backend> SharedMlp<B> {
    /// Forward pass.
    ///
    /// Input shape: [..., d_input]
    /// Output shape: [..., d_output]
    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        let dims = x.dims();
        let rows = dims[..D - 1].iter().product::<usize>();

        // Batch norm expects channels on axis 1, so flatten every leading axis into rows.
        let mut y = self.linear.forward(x.reshape([rows, dims[D - 1]]));
        if let Some(norm) = &self.norm {
            y = norm.forward(y);
        }
        if let Some(relu) = &self.relu {
            y = relu.forward(y);
        }
        if let Some(leaky_relu) = &self.leaky_relu {
            y = leaky_relu.forward(y);
        }

        let mut out = dims;
        out[D - 1] = self.d_output();
        y.reshape(out)
    }

    /// Input channels.
    pub fn d_input(&self) -> usize {
        // In Burn, Linear weight is [in_features, out_features]
        self.linear.weight.dims()[0]
    }

    /// Output channels.
    pub fn d_output(&self) -> usize {
        self.linear.weight.dims()[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_shared_mlp_keeps_leading_axes() {
        let device = Default::default();
        let mlp = SharedMlpConfig::new(10, 6)
            .with_batch_norm(true)
            .with_activation(Activation::Relu)
            .init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 4>::ones([2, 5, 3, 10], &device);
        let output = mlp.forward(input);

        assert_eq!(output.dims(), [2, 5, 3, 6]);
        assert_eq!(mlp.d_input(), 10);
        assert_eq!(mlp.d_output(), 6);
    }

    #[test]
    fn test_relu_output_is_non_negative() {
        let device = Default::default();
        let mlp = SharedMlpConfig::new(3, 8)
            .with_activation(Activation::Relu)
            .init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 3>::random(
            [2, 16, 3],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let min: f32 = mlp.forward(input).min().into_scalar();
        assert!(min >= 0.0);
    }

    #[test]
    fn test_pointwise_independence() {
        // Each row only sees itself, so duplicating a row duplicates its output.
        let device = Default::default();
        let mlp = SharedMlpConfig::new(2, 4)
            .with_batch_norm(true)
            .with_activation(Activation::LeakyRelu(0.2))
            .init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![1.0f32, -2.0, 1.0, -2.0], [2, 2]),
            &device,
        );
        let output = mlp.forward(input);
        let rows = output.into_data().convert::<f32>().into_vec::<f32>().unwrap();

        assert_eq!(rows[..4], rows[4..]);
    }
}
