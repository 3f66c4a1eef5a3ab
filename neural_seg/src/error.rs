//! Error types for neural_seg.

use seg_core::SegCoreError;
use thiserror::Error;

/// Errors that can occur while building or running the networks.
#[derive(Error, Debug)]
pub enum NeuralSegError {
    /// Forward-pass inputs are inconsistent with each other or with the network.
    #[error("invalid input shape: {message}")]
    InvalidInputShape {
        /// Description of the inconsistency.
        message: String,
    },

    /// Tensor shape mismatch between two stages of a pass.
    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid or corrupted host data.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Failure in the framework-free core (neighbour search, permutations, stage stack).
    #[error(transparent)]
    Core(#[from] SegCoreError),
}

impl NeuralSegError {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::InvalidInputShape {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type for neural_seg operations.
pub type Result<T> = std::result::Result<T, NeuralSegError>;
