//! Network configuration types.

use burn::config::Config;

use crate::error::NeuralSegError;

/// Nonlinearity applied after a shared transform.
#[derive(Config, Debug, PartialEq)]
pub enum Activation {
    /// No activation.
    Identity,
    /// Rectified linear unit.
    Relu,
    /// Leaky ReLU with the given negative slope.
    LeakyRelu(f64),
}

/// Configuration for a shared (point-wise) transform.
#[derive(Config, Debug)]
pub struct SharedMlpConfig {
    /// Input channels.
    pub d_input: usize,

    /// Output channels.
    pub d_output: usize,

    /// Whether the projection has a bias term.
    #[config(default = true)]
    pub bias: bool,

    /// Whether batch normalization follows the projection.
    #[config(default = false)]
    pub batch_norm: bool,

    /// Activation applied last.
    #[config(default = "Activation::Identity")]
    pub activation: Activation,
}

/// Configuration for one local feature aggregation block.
#[derive(Config, Debug)]
pub struct LocalFeatureAggregationConfig {
    /// Width of the incoming per-point features.
    pub d_input: usize,

    /// Target width; the block emits `2 * d_output` channels.
    pub d_output: usize,

    /// Neighbours gathered per point.
    #[config(default = 16)]
    pub num_neighbors: usize,
}

impl LocalFeatureAggregationConfig {
    /// Width of the block output.
    pub fn output_dim(&self) -> usize {
        2 * self.d_output
    }

    /// Check that the widths are usable.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.d_input == 0 {
            return Err(NeuralSegError::config("aggregation input width must be positive"));
        }
        if self.d_output == 0 || self.d_output % 2 != 0 {
            return Err(NeuralSegError::config(format!(
                "aggregation width must be a positive even number, got {}",
                self.d_output
            )));
        }
        if self.num_neighbors == 0 {
            return Err(NeuralSegError::config("num_neighbors must be at least 1"));
        }
        Ok(())
    }
}

/// Configuration for the segmentation network.
#[derive(Config, Debug)]
pub struct RandLaNetConfig {
    /// Per-point input feature width (coordinates excluded).
    pub num_features: usize,

    /// Number of output classes.
    pub num_classes: usize,

    /// Neighbours gathered per point in every block.
    #[config(default = 16)]
    pub num_neighbors: usize,

    /// Factor by which the active point count shrinks per stage.
    #[config(default = 4)]
    pub decimation: usize,

    /// Width of the stem projection.
    #[config(default = 8)]
    pub stem_width: usize,

    /// Target width of every encoder block.
    #[config(default = "vec![16, 64, 128, 256]")]
    pub encoder_widths: Vec<usize>,

    /// Hidden widths of the per-point classifier head.
    #[config(default = "vec![64, 32]")]
    pub head_widths: Vec<usize>,

    /// Dropout probability before the last head layer.
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl RandLaNetConfig {
    /// Number of encoder stages.
    pub fn num_stages(&self) -> usize {
        self.encoder_widths.len()
    }

    /// Input width of every encoder stage: the stem width, then twice the previous target.
    pub fn stage_input_widths(&self) -> Vec<usize> {
        stage_inputs(self.stem_width, &self.encoder_widths)
    }

    /// Per-stage block configurations.
    pub fn blocks(&self) -> Vec<LocalFeatureAggregationConfig> {
        blocks(self.stem_width, &self.encoder_widths, self.num_neighbors)
    }

    /// Bottleneck width seen by the bridge.
    pub fn bottleneck_width(&self) -> usize {
        self.encoder_widths.last().map_or(self.stem_width, |w| 2 * w)
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> crate::error::Result<()> {
        check_common(
            self.num_features,
            self.num_classes,
            self.decimation,
            self.stem_width,
            &self.encoder_widths,
            &self.head_widths,
            self.dropout,
        )?;
        self.blocks().iter().try_for_each(|b| b.validate())
    }
}

/// Configuration for the classification network.
#[derive(Config, Debug)]
pub struct RandLaClassifierConfig {
    /// Per-point input feature width (coordinates excluded).
    pub num_features: usize,

    /// Number of output classes.
    pub num_classes: usize,

    /// Neighbours gathered per point in every block.
    #[config(default = 16)]
    pub num_neighbors: usize,

    /// Factor by which the active point count shrinks per stage.
    #[config(default = 4)]
    pub decimation: usize,

    /// Width of the stem projection.
    #[config(default = 8)]
    pub stem_width: usize,

    /// Target width of every encoder block.
    #[config(default = "vec![16, 32, 64, 128]")]
    pub encoder_widths: Vec<usize>,

    /// Width of the vector each cloud is reduced to.
    #[config(default = 512)]
    pub reducer_width: usize,

    /// Hidden widths of the classifier head.
    #[config(default = "vec![128, 32]")]
    pub head_widths: Vec<usize>,

    /// Dropout probability after every hidden head layer.
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl RandLaClassifierConfig {
    /// Number of encoder stages.
    pub fn num_stages(&self) -> usize {
        self.encoder_widths.len()
    }

    /// Input width of every encoder stage.
    pub fn stage_input_widths(&self) -> Vec<usize> {
        stage_inputs(self.stem_width, &self.encoder_widths)
    }

    /// Per-stage block configurations.
    pub fn blocks(&self) -> Vec<LocalFeatureAggregationConfig> {
        blocks(self.stem_width, &self.encoder_widths, self.num_neighbors)
    }

    /// Width of the features entering the reducer.
    pub fn encoded_width(&self) -> usize {
        self.encoder_widths.last().map_or(self.stem_width, |w| 2 * w)
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> crate::error::Result<()> {
        check_common(
            self.num_features,
            self.num_classes,
            self.decimation,
            self.stem_width,
            &self.encoder_widths,
            &self.head_widths,
            self.dropout,
        )?;
        if self.reducer_width == 0 {
            return Err(NeuralSegError::config("reducer_width must be positive"));
        }
        self.blocks().iter().try_for_each(|b| b.validate())
    }
}

fn stage_inputs(stem_width: usize, widths: &[usize]) -> Vec<usize> {
    std::iter::once(stem_width)
        .chain(widths.iter().map(|w| 2 * w))
        .take(widths.len())
        .collect()
}

fn blocks(
    stem_width: usize,
    widths: &[usize],
    num_neighbors: usize,
) -> Vec<LocalFeatureAggregationConfig> {
    stage_inputs(stem_width, widths)
        .into_iter()
        .zip(widths)
        .map(|(d_in, &d_out)| {
            LocalFeatureAggregationConfig::new(d_in, d_out).with_num_neighbors(num_neighbors)
        })
        .collect()
}

fn check_common(
    num_features: usize,
    num_classes: usize,
    decimation: usize,
    stem_width: usize,
    encoder_widths: &[usize],
    head_widths: &[usize],
    dropout: f64,
) -> crate::error::Result<()> {
    if num_features == 0 {
        return Err(NeuralSegError::config("num_features must be at least 1"));
    }
    if num_classes == 0 {
        return Err(NeuralSegError::config("num_classes must be at least 1"));
    }
    if decimation == 0 {
        return Err(NeuralSegError::config("decimation ratio must be at least 1"));
    }
    if stem_width == 0 {
        return Err(NeuralSegError::config("stem_width must be positive"));
    }
    if encoder_widths.is_empty() {
        return Err(NeuralSegError::config("at least one encoder stage is required"));
    }
    if head_widths.contains(&0) {
        return Err(NeuralSegError::config("head widths must be positive"));
    }
    if !(0.0..1.0).contains(&dropout) {
        return Err(NeuralSegError::config(format!(
            "dropout must lie in [0, 1), got {dropout}"
        )));
    }
    Ok(())
}
