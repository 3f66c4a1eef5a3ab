//! Per-cloud classification network.

use burn::module::Module;
use burn::prelude::*;
use log::debug;
use rand::Rng;
use seg_core::{KdTreeSearch, NeighborSearch, Permutation};

use crate::config::{Activation, RandLaClassifierConfig, SharedMlpConfig};
use crate::error::{NeuralSegError, Result};
use crate::nn::aggregation::LocalFeatureAggregation;
use crate::nn::head::ClassifierHead;
use crate::nn::input::{check_ladder, check_point_inputs};
use crate::nn::mlp::SharedMlp;
use crate::nn::neighbors::{permute_rows, ActivePoints};
use crate::nn::pooling::AttentivePooling;

const STEM_SLOPE: f64 = 0.2;

/// Encoder-only network producing one score vector per cloud.
///
/// Stage `s` keeps the first `N / decimation^s` points of the previous stage, reorders them
/// with its own permutation and aggregates them. A single attentive pooling over all
/// remaining points then reduces each cloud to one vector for the head.
#[derive(Module, Debug)]
pub struct RandLaClassifier<B: Backend> {
    stem: SharedMlp<B>,
    encoder: Vec<LocalFeatureAggregation<B>>,
    reducer: AttentivePooling<B>,
    head: ClassifierHead<B>,
    num_features: usize,
    num_neighbors: usize,
    decimation: usize,
}

impl RandLaClassifierConfig {
    /// Validate the configuration and initialize the network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<RandLaClassifier<B>> {
        self.validate()?;
        Ok(RandLaClassifier::new(self, device))
    }
}

impl<B: Backend> RandLaClassifier<B> {
    fn new(config: &RandLaClassifierConfig, device: &B::Device) -> Self {
        let stem = SharedMlpConfig::new(config.num_features + 3, config.stem_width)
            .with_batch_norm(true)
            .with_activation(Activation::LeakyRelu(STEM_SLOPE))
            .init(device);

        let encoder = config
            .blocks()
            .iter()
            .map(|block| LocalFeatureAggregation::new(block, device))
            .collect();

        let reducer = AttentivePooling::new(config.encoded_width(), config.reducer_width, device);
        let head = ClassifierHead::new(
            config.reducer_width,
            &config.head_widths,
            config.num_classes,
            config.dropout,
            true,
            device,
        );

        Self {
            stem,
            encoder,
            reducer,
            head,
            num_features: config.num_features,
            num_neighbors: config.num_neighbors,
            decimation: config.decimation,
        }
    }

    /// Draw one permutation per stage, each over that stage's active point count.
    pub fn permutation_schedule<R: Rng + ?Sized>(
        &self,
        num_points: usize,
        rng: &mut R,
    ) -> Result<Vec<Permutation>> {
        let ladder = check_ladder(
            num_points,
            self.decimation,
            self.encoder.len().saturating_sub(1),
            self.encoder.len(),
            self.num_neighbors,
        )?;
        (0..self.encoder.len())
            .map(|stage| -> Result<Permutation> {
                Ok(Permutation::random(ladder.active_count(stage)?, rng))
            })
            .collect()
    }

    /// Classify a batch of clouds with freshly drawn permutations and kd-tree search.
    ///
    /// Inputs:
    /// - coords: [batch, points, 3]
    /// - features: [batch, points, num_features]
    ///
    /// Output: [batch, num_classes] raw logits.
    pub fn forward<R: Rng + ?Sized>(
        &self,
        coords: Tensor<B, 3>,
        features: Tensor<B, 3>,
        rng: &mut R,
    ) -> Result<Tensor<B, 2>> {
        let schedule = self.permutation_schedule(coords.dims()[1], rng)?;
        self.forward_with(coords, features, &schedule, &KdTreeSearch)
    }

    /// Classify with an explicit permutation per stage.
    pub fn forward_with(
        &self,
        coords: Tensor<B, 3>,
        features: Tensor<B, 3>,
        schedule: &[Permutation],
        search: &dyn NeighborSearch,
    ) -> Result<Tensor<B, 2>> {
        let reduced = self.reduce(coords, features, schedule, search)?;
        Ok(self.head.forward(reduced))
    }

    /// Encode and reduce every cloud to a single `[batch, reducer_width]` vector.
    pub fn reduce(
        &self,
        coords: Tensor<B, 3>,
        features: Tensor<B, 3>,
        schedule: &[Permutation],
        search: &dyn NeighborSearch,
    ) -> Result<Tensor<B, 2>> {
        let [batch, num_points] =
            check_point_inputs(coords.dims(), features.dims(), self.num_features)?;
        let stages = self.encoder.len();
        let ladder = check_ladder(
            num_points,
            self.decimation,
            stages.saturating_sub(1),
            stages,
            self.num_neighbors,
        )?;
        if schedule.len() != stages {
            return Err(NeuralSegError::input(format!(
                "expected {stages} stage permutations, got {}",
                schedule.len()
            )));
        }

        let mut x = self.stem.forward(Tensor::cat(vec![coords.clone(), features], 2));
        let mut points = ActivePoints::from_tensor(coords)?;

        for (stage, (block, permutation)) in self.encoder.iter().zip(schedule).enumerate() {
            let len = ladder.active_count(stage)?;
            if permutation.len() != len {
                return Err(NeuralSegError::input(format!(
                    "stage {stage} permutation covers {} points, stage has {len}",
                    permutation.len()
                )));
            }
            points = points.prefix(len)?.permuted(permutation)?;
            x = permute_rows(x.narrow(1, 0, len), permutation);
            x = block.forward(&points, x, search)?;
            debug!(
                "classifier stage {}: {} points -> {} channels",
                stage,
                len,
                block.d_output()
            );
        }

        // Every remaining point is a "neighbour" of one virtual centre per cloud.
        let pooled = self.reducer.forward(x.unsqueeze_dim::<4>(1));
        Ok(pooled.reshape([batch, self.reducer.d_output()]))
    }

    /// Number of encoder stages.
    pub fn num_stages(&self) -> usize {
        self.encoder.len()
    }

    /// Number of output classes.
    pub fn num_classes(&self) -> usize {
        self.head.num_classes()
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

    fn small_config() -> RandLaClassifierConfig {
        RandLaClassifierConfig::new(1, 4)
            .with_num_neighbors(2)
            .with_decimation(2)
            .with_encoder_widths(vec![4, 8])
            .with_reducer_width(12)
            .with_head_widths(vec![6])
    }

    #[test]
    fn test_classifier_output_shape() {
        let device = Default::default();
        let net = small_config().init::<TestBackend>(&device).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let coords = Tensor::random([3, 8, 3], Distribution::Default, &device);
        let features = Tensor::random([3, 8, 1], Distribution::Default, &device);
        let scores = net.forward(coords, features, &mut rng).unwrap();

        assert_eq!(scores.dims(), [3, 4]);
        assert_eq!(net.num_classes(), 4);
    }

    #[test]
    fn test_schedule_follows_ladder() {
        let device = Default::default();
        let net = RandLaClassifierConfig::new(4, 10)
            .with_num_neighbors(4)
            .init::<TestBackend>(&device)
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let schedule = net.permutation_schedule(256, &mut rng).unwrap();
        let lens: Vec<usize> = schedule.iter().map(Permutation::len).collect();
        assert_eq!(lens, vec![256, 64, 16, 4]);
    }

    #[test]
    fn test_wrong_schedule_length_rejected() {
        let device = Default::default();
        let net = small_config().init::<TestBackend>(&device).unwrap();

        let coords = Tensor::zeros([1, 8, 3], &device);
        let features = Tensor::zeros([1, 8, 1], &device);
        let schedule = vec![Permutation::identity(8)];

        assert!(matches!(
            net.forward_with(coords, features, &schedule, &KdTreeSearch),
            Err(NeuralSegError::InvalidInputShape { .. })
        ));
    }
}
