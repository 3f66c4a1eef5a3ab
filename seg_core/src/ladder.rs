//! Decimation ladder bookkeeping.
//!
//! Each encoder stage keeps the first `N / ratio^stage` points of the (permuted) order and
//! drops the rest. Truncating a shuffled order is a biased stand-in for drawing an
//! independent random subset per stage: every stage keeps a prefix of the previous one.

use crate::error::{Result, SegCoreError};

/// Active point counts for a fixed number of decimation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimationLadder {
    num_points: usize,
    ratio: usize,
    steps: usize,
}

impl DecimationLadder {
    /// Build a ladder of `steps` decimations by `ratio` over `num_points` points.
    ///
    /// `num_points` must be non-zero and divisible by `ratio^steps` so every stage keeps
    /// a whole number of points.
    pub fn new(num_points: usize, ratio: usize, steps: usize) -> Result<Self> {
        if ratio == 0 {
            return Err(SegCoreError::InvalidDecimationRatio { ratio });
        }
        if num_points == 0 {
            return Err(SegCoreError::EmptyPointSet);
        }
        let divisor = ratio
            .checked_pow(steps as u32)
            .ok_or(SegCoreError::NonDivisiblePointCount {
                num_points,
                divisor: usize::MAX,
            })?;
        if num_points % divisor != 0 {
            return Err(SegCoreError::NonDivisiblePointCount {
                num_points,
                divisor,
            });
        }
        Ok(Self {
            num_points,
            ratio,
            steps,
        })
    }

    /// Number of input points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Decimation ratio.
    #[inline]
    pub fn ratio(&self) -> usize {
        self.ratio
    }

    /// Number of decimation steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Points still active at `stage` (stage 0 is the full set).
    pub fn active_count(&self, stage: usize) -> Result<usize> {
        if stage > self.steps {
            return Err(SegCoreError::StageOutOfRange {
                stage,
                stages: self.steps,
            });
        }
        Ok(self.num_points / self.ratio.pow(stage as u32))
    }

    /// Points left after every decimation step.
    #[inline]
    pub fn coarsest(&self) -> usize {
        self.num_points / self.ratio.pow(self.steps as u32)
    }

    /// Active counts for stages `0..=steps`, finest first.
    pub fn counts(&self) -> Vec<usize> {
        (0..=self.steps)
            .map(|stage| self.num_points / self.ratio.pow(stage as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ladder() {
        let ladder = DecimationLadder::new(256, 4, 4).unwrap();
        assert_eq!(ladder.counts(), vec![256, 64, 16, 4, 1]);
        assert_eq!(ladder.coarsest(), 1);
        assert_eq!(ladder.active_count(2).unwrap(), 16);
    }

    #[test]
    fn test_non_divisible_rejected() {
        assert_eq!(
            DecimationLadder::new(100, 4, 4).unwrap_err(),
            SegCoreError::NonDivisiblePointCount {
                num_points: 100,
                divisor: 256
            }
        );
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(
            DecimationLadder::new(0, 4, 2).unwrap_err(),
            SegCoreError::EmptyPointSet
        );
        assert_eq!(
            DecimationLadder::new(16, 0, 2).unwrap_err(),
            SegCoreError::InvalidDecimationRatio { ratio: 0 }
        );
    }

    #[test]
    fn test_stage_out_of_range() {
        let ladder = DecimationLadder::new(64, 2, 3).unwrap();
        assert!(ladder.active_count(3).is_ok());
        assert_eq!(
            ladder.active_count(4).unwrap_err(),
            SegCoreError::StageOutOfRange {
                stage: 4,
                stages: 3
            }
        );
    }

    #[test]
    fn test_zero_steps_keeps_everything() {
        let ladder = DecimationLadder::new(7, 3, 0).unwrap();
        assert_eq!(ladder.counts(), vec![7]);
    }
}
