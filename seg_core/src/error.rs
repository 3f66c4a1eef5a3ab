//! Error types for seg_core operations.
//!
//! Provides a small error enum with no external dependencies so it can be embedded in
//! higher-level error types.

use core::fmt;

/// Error types that can occur during seg_core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegCoreError {
    /// A point set had no points where at least one is required.
    EmptyPointSet,
    /// More neighbours were requested than the support set contains (or zero were requested).
    InvalidNeighborCount {
        /// Requested neighbour count.
        k: usize,
        /// Number of points available in the support set.
        available: usize,
    },
    /// Two sequences that must agree in length did not.
    LengthMismatch {
        /// The expected length.
        expected: usize,
        /// The length that was provided.
        got: usize,
    },
    /// A permutation entry pointed outside `[0, len)`.
    PermutationIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the permutation.
        len: usize,
    },
    /// A permutation contained the same index twice.
    DuplicatePermutationIndex {
        /// The repeated index.
        index: usize,
    },
    /// The decimation ratio cannot shrink a point set.
    InvalidDecimationRatio {
        /// The rejected ratio.
        ratio: usize,
    },
    /// The point count does not line up with the decimation ladder.
    NonDivisiblePointCount {
        /// Number of input points.
        num_points: usize,
        /// The required divisor (`ratio^stages`).
        divisor: usize,
    },
    /// A stage index past the end of the decimation ladder was requested.
    StageOutOfRange {
        /// The requested stage.
        stage: usize,
        /// Number of decimation steps in the ladder.
        stages: usize,
    },
    /// A push would exceed the stage stack's capacity.
    StageStackOverflow {
        /// Maximum number of entries.
        capacity: usize,
    },
    /// A pop was attempted on an empty stage stack.
    StageStackUnderflow,
    /// The stage stack was finished with entries left over.
    UnbalancedStageStack {
        /// Number of pushes performed.
        pushes: usize,
        /// Number of pops performed.
        pops: usize,
    },
    /// Two volumes that must share a shape did not.
    VolumeShapeMismatch {
        /// The expected shape.
        expected: [usize; 3],
        /// The shape that was provided.
        got: [usize; 3],
    },
}

impl fmt::Display for SegCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegCoreError::EmptyPointSet => write!(f, "point set is empty"),
            SegCoreError::InvalidNeighborCount { k, available } => {
                write!(
                    f,
                    "cannot search {} neighbours in a set of {} points",
                    k, available
                )
            }
            SegCoreError::LengthMismatch { expected, got } => {
                write!(f, "length mismatch: expected {}, got {}", expected, got)
            }
            SegCoreError::PermutationIndexOutOfRange { index, len } => {
                write!(
                    f,
                    "permutation index {} out of range for length {}",
                    index, len
                )
            }
            SegCoreError::DuplicatePermutationIndex { index } => {
                write!(f, "permutation index {} appears more than once", index)
            }
            SegCoreError::InvalidDecimationRatio { ratio } => {
                write!(f, "decimation ratio must be at least 1, got {}", ratio)
            }
            SegCoreError::NonDivisiblePointCount {
                num_points,
                divisor,
            } => {
                write!(
                    f,
                    "{} points are not divisible by the decimation ladder divisor {}",
                    num_points, divisor
                )
            }
            SegCoreError::StageOutOfRange { stage, stages } => {
                write!(
                    f,
                    "stage {} out of range for a ladder with {} decimation steps",
                    stage, stages
                )
            }
            SegCoreError::StageStackOverflow { capacity } => {
                write!(f, "stage stack overflow: capacity is {}", capacity)
            }
            SegCoreError::StageStackUnderflow => write!(f, "stage stack underflow"),
            SegCoreError::UnbalancedStageStack { pushes, pops } => {
                write!(
                    f,
                    "unbalanced stage stack: {} pushes but {} pops",
                    pushes, pops
                )
            }
            SegCoreError::VolumeShapeMismatch { expected, got } => {
                write!(
                    f,
                    "volume shape mismatch: expected {:?}, got {:?}",
                    expected, got
                )
            }
        }
    }
}

impl std::error::Error for SegCoreError {}

/// Result type for seg_core operations.
pub type Result<T> = core::result::Result<T, SegCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SegCoreError::InvalidNeighborCount { k: 16, available: 4 };
        assert_eq!(
            format!("{}", err),
            "cannot search 16 neighbours in a set of 4 points"
        );

        let err = SegCoreError::NonDivisiblePointCount {
            num_points: 100,
            divisor: 256,
        };
        assert_eq!(
            format!("{}", err),
            "100 points are not divisible by the decimation ladder divisor 256"
        );

        let err = SegCoreError::UnbalancedStageStack { pushes: 4, pops: 3 };
        assert_eq!(
            format!("{}", err),
            "unbalanced stage stack: 4 pushes but 3 pops"
        );

        assert_eq!(
            format!("{}", SegCoreError::StageStackUnderflow),
            "stage stack underflow"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = SegCoreError::DuplicatePermutationIndex { index: 3 };
        let err2 = SegCoreError::DuplicatePermutationIndex { index: 3 };
        let err3 = SegCoreError::DuplicatePermutationIndex { index: 4 };

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
