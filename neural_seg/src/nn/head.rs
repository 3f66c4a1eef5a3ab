//! Classifier heads producing raw logits.

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig};
use burn::prelude::*;

use crate::config::{Activation, SharedMlpConfig};
use crate::nn::mlp::SharedMlp;

/// Stack of normalized ReLU transforms followed by a plain projection to class scores.
///
/// Dropout is applied after every hidden layer, or only once before the projection when
/// `dropout_each_layer` is off. It is inactive on backends without autodiff.
#[derive(Module, Debug)]
pub struct ClassifierHead<B: Backend> {
    hidden: Vec<SharedMlp<B>>,
    dropout: Dropout,
    output: SharedMlp<B>,
    dropout_each_layer: bool,
}

impl<B: Backend> ClassifierHead<B> {
    /// Create a head mapping `d_input` channels through `hidden_widths` to `num_classes`.
    pub fn new(
        d_input: usize,
        hidden_widths: &[usize],
        num_classes: usize,
        dropout: f64,
        dropout_each_layer: bool,
        device: &B::Device,
    ) -> Self {
        let mut hidden = Vec::with_capacity(hidden_widths.len());
        let mut in_dim = d_input;
        for &out_dim in hidden_widths {
            hidden.push(
                SharedMlpConfig::new(in_dim, out_dim)
                    .with_batch_norm(true)
                    .with_activation(Activation::Relu)
                    .init(device),
            );
            in_dim = out_dim;
        }

        Self {
            hidden,
            dropout: DropoutConfig::new(dropout).init(),
            output: SharedMlpConfig::new(in_dim, num_classes).init(device),
            dropout_each_layer,
        }
    }

    /// Forward pass.
    ///
    /// Input shape: [..., d_input]
    /// Output shape: [..., num_classes]
    pub fn forward<const D: usize>(&self, mut x: Tensor<B, D>) -> Tensor<B, D> {
        for layer in &self.hidden {
            x = layer.forward(x);
            if self.dropout_each_layer {
                x = self.dropout.forward(x);
            }
        }
        if !self.dropout_each_layer {
            x = self.dropout.forward(x);
        }
        self.output.forward(x)
    }

    /// Number of output classes.
    pub fn num_classes(&self) -> usize {
        self.output.d_output()
    }
}
