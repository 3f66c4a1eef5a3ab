//! Per-point segmentation network.

use burn::module::Module;
use burn::prelude::*;
use log::debug;
use rand::Rng;
use seg_core::{KdTreeSearch, NeighborSearch, Permutation, StageStack};

use crate::config::{Activation, RandLaNetConfig, SharedMlpConfig};
use crate::error::{NeuralSegError, Result};
use crate::nn::aggregation::LocalFeatureAggregation;
use crate::nn::head::ClassifierHead;
use crate::nn::input::{check_ladder, check_point_inputs};
use crate::nn::mlp::SharedMlp;
use crate::nn::neighbors::{gather_points, permute_rows, ActivePoints};

const STEM_SLOPE: f64 = 0.2;

/// Hierarchical encoder/decoder producing class scores for every input point.
///
/// The cloud is permuted once, then every encoder stage aggregates the active prefix and
/// keeps `1 / decimation` of it. The decoder walks back up with nearest-neighbour
/// upsampling and skip connections, and the inverse permutation restores input order
/// before the head.
#[derive(Module, Debug)]
pub struct RandLaNet<B: Backend> {
    stem: SharedMlp<B>,
    encoder: Vec<LocalFeatureAggregation<B>>,
    bridge: SharedMlp<B>,
    decoder: Vec<SharedMlp<B>>,
    head: ClassifierHead<B>,
    num_features: usize,
    num_neighbors: usize,
    decimation: usize,
}

impl RandLaNetConfig {
    /// Validate the configuration and initialize the network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<RandLaNet<B>> {
        self.validate()?;
        Ok(RandLaNet::new(self, device))
    }
}

impl<B: Backend> RandLaNet<B> {
    fn new(config: &RandLaNetConfig, device: &B::Device) -> Self {
        let stem = SharedMlpConfig::new(config.num_features + 3, config.stem_width)
            .with_batch_norm(true)
            .with_activation(Activation::LeakyRelu(STEM_SLOPE))
            .init(device);

        let blocks = config.blocks();
        let encoder = blocks
            .iter()
            .map(|block| LocalFeatureAggregation::new(block, device))
            .collect();

        let bottleneck = config.bottleneck_width();
        let bridge = SharedMlpConfig::new(bottleneck, bottleneck)
            .with_activation(Activation::Relu)
            .init(device);

        // Decoders run deepest first; each maps upsampled + skip features back to the
        // input width of its encoder stage.
        let mut decoder = Vec::with_capacity(blocks.len());
        let mut width = bottleneck;
        for block in blocks.iter().rev() {
            decoder.push(
                SharedMlpConfig::new(width + block.output_dim(), block.d_input)
                    .with_batch_norm(true)
                    .with_activation(Activation::Relu)
                    .init(device),
            );
            width = block.d_input;
        }

        let head = ClassifierHead::new(
            config.stem_width,
            &config.head_widths,
            config.num_classes,
            config.dropout,
            false,
            device,
        );

        Self {
            stem,
            encoder,
            bridge,
            decoder,
            head,
            num_features: config.num_features,
            num_neighbors: config.num_neighbors,
            decimation: config.decimation,
        }
    }

    /// Segment a batch of clouds with a freshly drawn permutation and kd-tree search.
    ///
    /// Inputs:
    /// - coords: [batch, points, 3]
    /// - features: [batch, points, num_features]
    ///
    /// Output: [batch, points, num_classes] raw logits in input order.
    pub fn forward<R: Rng + ?Sized>(
        &self,
        coords: Tensor<B, 3>,
        features: Tensor<B, 3>,
        rng: &mut R,
    ) -> Result<Tensor<B, 3>> {
        let permutation = Permutation::random(coords.dims()[1], rng);
        self.forward_with(coords, features, &permutation, &KdTreeSearch)
    }

    /// Segment a batch of clouds with an explicit permutation and neighbour search.
    ///
    /// `permutation` decides which points survive each decimation: stage `s` keeps the
    /// first `N / decimation^s` points in permuted order.
    pub fn forward_with(
        &self,
        coords: Tensor<B, 3>,
        features: Tensor<B, 3>,
        permutation: &Permutation,
        search: &dyn NeighborSearch,
    ) -> Result<Tensor<B, 3>> {
        let [_, num_points] =
            check_point_inputs(coords.dims(), features.dims(), self.num_features)?;
        if permutation.len() != num_points {
            return Err(NeuralSegError::input(format!(
                "permutation covers {} points, input has {num_points}",
                permutation.len()
            )));
        }
        let stages = self.encoder.len();
        let ladder = check_ladder(
            num_points,
            self.decimation,
            stages,
            stages,
            self.num_neighbors,
        )?;

        let x = self.stem.forward(Tensor::cat(vec![coords.clone(), features], 2));
        let points = ActivePoints::from_tensor(coords)?.permuted(permutation)?;
        let mut x = permute_rows(x, permutation);

        let mut stack = StageStack::new(stages);
        for (stage, block) in self.encoder.iter().enumerate() {
            let active = points.prefix(ladder.active_count(stage)?)?;
            let encoded = block.forward(&active, x, search)?;
            debug!(
                "encoder stage {}: {} points -> {} channels",
                stage,
                active.len(),
                block.d_output()
            );
            stack.push(encoded.clone())?;
            x = encoded.narrow(1, 0, ladder.active_count(stage + 1)?);
        }

        x = self.bridge.forward(x);

        for (step, mlp) in self.decoder.iter().enumerate() {
            let stage = stages - 1 - step;
            let coarse = points.prefix(ladder.active_count(stage + 1)?)?;
            let fine = points.prefix(ladder.active_count(stage)?)?;
            let nearest = search.search_batch(coarse.host(), fine.host(), 1)?;

            let upsampled = gather_points(x, &nearest);
            let skip = stack.pop()?;
            x = mlp.forward(Tensor::cat(vec![upsampled, skip], 2));
            debug!(
                "decoder stage {}: {} -> {} points, {} channels",
                stage,
                coarse.len(),
                fine.len(),
                mlp.d_output()
            );
        }
        stack.finish()?;

        let x = permute_rows(x, &permutation.inverse());
        Ok(self.head.forward(x))
    }

    /// Number of encoder stages.
    pub fn num_stages(&self) -> usize {
        self.encoder.len()
    }

    /// Number of output classes.
    pub fn num_classes(&self) -> usize {
        self.head.num_classes()
    }

    /// Neighbours gathered per point in every block.
    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }

    /// Factor by which the active point count shrinks per stage.
    pub fn decimation(&self) -> usize {
        self.decimation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    type TestBackend = NdArray;

    fn small_config() -> RandLaNetConfig {
        RandLaNetConfig::new(2, 3)
            .with_num_neighbors(2)
            .with_decimation(2)
            .with_encoder_widths(vec![4, 8])
            .with_head_widths(vec![8])
    }

    #[test]
    fn test_segmentation_output_shape() {
        let device = Default::default();
        let net = small_config().init::<TestBackend>(&device).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let coords = Tensor::random([1, 16, 3], Distribution::Default, &device);
        let features = Tensor::random([1, 16, 2], Distribution::Default, &device);
        let scores = net.forward(coords, features, &mut rng).unwrap();

        assert_eq!(scores.dims(), [1, 16, 3]);
        assert_eq!(net.num_stages(), 2);
        assert_eq!(net.num_classes(), 3);
    }

    #[test]
    fn test_decoder_widths_mirror_encoder() {
        let device = Default::default();
        let net = RandLaNetConfig::new(3, 5)
            .init::<TestBackend>(&device)
            .unwrap();

        let widths: Vec<[usize; 2]> = net
            .decoder
            .iter()
            .map(|mlp| [mlp.d_input(), mlp.d_output()])
            .collect();
        assert_eq!(widths, vec![[1024, 256], [512, 128], [256, 32], [64, 8]]);
        assert_eq!(net.bridge.d_output(), 512);
    }

    #[test]
    fn test_permutation_length_must_match() {
        let device = Default::default();
        let net = small_config().init::<TestBackend>(&device).unwrap();

        let coords = Tensor::zeros([1, 16, 3], &device);
        let features = Tensor::zeros([1, 16, 2], &device);
        let result = net.forward_with(coords, features, &Permutation::identity(8), &KdTreeSearch);

        assert!(matches!(
            result,
            Err(NeuralSegError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_indivisible_point_count_rejected_at_entry() {
        let device = Default::default();
        let net = small_config().init::<TestBackend>(&device).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let coords = Tensor::zeros([1, 18, 3], &device);
        let features = Tensor::zeros([1, 18, 2], &device);
        assert!(matches!(
            net.forward(coords, features, &mut rng),
            Err(NeuralSegError::InvalidInputShape { .. })
        ));
    }
}
