//! Entry checks shared by both networks.

use seg_core::DecimationLadder;

use crate::error::{NeuralSegError, Result};

/// Check coordinate and feature shapes against each other and the configured width.
///
/// Returns `[batch, num_points]`.
pub(crate) fn check_point_inputs(
    coords: [usize; 3],
    features: [usize; 3],
    num_features: usize,
) -> Result<[usize; 2]> {
    let [batch, num_points, width] = coords;
    if batch == 0 || num_points == 0 {
        return Err(NeuralSegError::input(format!(
            "need at least one cloud with one point, got coordinates {coords:?}"
        )));
    }
    if width != 3 {
        return Err(NeuralSegError::input(format!(
            "coordinates must be [batch, points, 3], got {coords:?}"
        )));
    }
    if features[0] != batch || features[1] != num_points {
        return Err(NeuralSegError::input(format!(
            "features {features:?} do not match coordinates {coords:?}"
        )));
    }
    if features[2] != num_features {
        return Err(NeuralSegError::input(format!(
            "expected {num_features} feature channels, got {}",
            features[2]
        )));
    }
    Ok([batch, num_points])
}

/// Build the decimation ladder, reporting an inconsistent point count, ratio or neighbour
/// count as an input-shape error.
///
/// `steps` is the number of decimations the ladder must support; `k` has to fit in the
/// smallest set a block searches, which holds `num_points / ratio^(blocks - 1)` points.
pub(crate) fn check_ladder(
    num_points: usize,
    ratio: usize,
    steps: usize,
    blocks: usize,
    k: usize,
) -> Result<DecimationLadder> {
    let ladder = DecimationLadder::new(num_points, ratio, steps).map_err(|e| {
        NeuralSegError::input(format!(
            "{num_points} points cannot go through {steps} decimations by {ratio}: {e}"
        ))
    })?;
    let smallest = ladder.active_count(blocks.saturating_sub(1))?;
    if k == 0 || k > smallest {
        return Err(NeuralSegError::input(format!(
            "{k} neighbours requested but the last block only sees {smallest} points"
        )));
    }
    Ok(ladder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_inputs() {
        assert_eq!(check_point_inputs([2, 256, 3], [2, 256, 3], 3).unwrap(), [2, 256]);
        assert!(check_point_inputs([2, 256, 2], [2, 256, 3], 3).is_err());
        assert!(check_point_inputs([2, 256, 3], [2, 128, 3], 3).is_err());
        assert!(check_point_inputs([2, 256, 3], [2, 256, 4], 3).is_err());
        assert!(check_point_inputs([0, 256, 3], [0, 256, 3], 3).is_err());
    }

    #[test]
    fn test_ladder_bounds() {
        // 256 = 4^4: the fourth block sees 4 points.
        assert!(check_ladder(256, 4, 4, 4, 4).is_ok());
        assert!(check_ladder(256, 4, 4, 4, 5).is_err());
        assert!(check_ladder(200, 4, 4, 4, 1).is_err());
        assert!(check_ladder(64, 4, 3, 4, 1).is_ok());
    }
}
