//! Centres of mass of labelled objects and per-voxel offsets to them.

use super::{Labeling, Volume};
use crate::error::Result;

/// Value-weighted centre of mass of every label, indexed `label - 1`.
///
/// `weights` supplies the mass of each voxel (the original intensities, or the binary mask).
/// A label whose total weight is zero has no centre and yields `None`.
pub fn centers_of_mass<T: Copy + Into<f64>>(
    weights: &Volume<T>,
    labeling: &Labeling,
) -> Result<Vec<Option<[f32; 3]>>> {
    weights.check_shape(&labeling.labels)?;

    let count = labeling.count as usize;
    let mut mass = vec![0.0f64; count];
    let mut moment = vec![[0.0f64; 3]; count];

    for ((voxel, &label), &w) in labeling.labels.iter().zip(weights.as_slice()) {
        if label == 0 {
            continue;
        }
        let slot = label as usize - 1;
        let w: f64 = w.into();
        mass[slot] += w;
        moment[slot][0] += w * voxel.a0 as f64;
        moment[slot][1] += w * voxel.a1 as f64;
        moment[slot][2] += w * voxel.a2 as f64;
    }

    Ok(mass
        .iter()
        .zip(&moment)
        .map(|(&m, c)| {
            (m != 0.0).then(|| [(c[0] / m) as f32, (c[1] / m) as f32, (c[2] / m) as f32])
        })
        .collect())
}

/// Per-voxel vector from the voxel to the centre of mass of its object.
///
/// Background voxels, and voxels of labels without a centre, get the zero vector.
pub fn center_offsets(labeling: &Labeling, centers: &[Option<[f32; 3]>]) -> Volume<[f32; 3]> {
    let shape = labeling.labels.shape();
    let data = labeling
        .labels
        .iter()
        .map(|(voxel, &label)| {
            let centre = (label as usize)
                .checked_sub(1)
                .and_then(|slot| centers.get(slot).copied().flatten());
            match centre {
                Some(c) => {
                    let p = voxel.to_f32();
                    [c[0] - p[0], c[1] - p[1], c[2] - p[2]]
                }
                None => [0.0; 3],
            }
        })
        .collect();
    Volume { shape, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoxelCoord;
    use crate::volume::{label_components, Connectivity};

    #[test]
    fn test_single_bar() {
        let volume = Volume::from_slices(&[[[0u8, 1, 1, 1]]]);
        let labeling = label_components(&volume, Connectivity::Face);
        let centers = centers_of_mass(&volume, &labeling).unwrap();

        assert_eq!(centers, vec![Some([0.0, 0.0, 2.0])]);

        let offsets = center_offsets(&labeling, &centers);
        assert_eq!(offsets.get(VoxelCoord::new(0, 0, 1)), Some(&[0.0, 0.0, 1.0]));
        assert_eq!(offsets.get(VoxelCoord::new(0, 0, 3)), Some(&[0.0, 0.0, -1.0]));
        assert_eq!(offsets.get(VoxelCoord::new(0, 0, 0)), Some(&[0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_weighted_center() {
        let volume = Volume::from_slices(&[[[1.0f32, 3.0]]]);
        let labeling = label_components(&volume, Connectivity::Face);
        let centers = centers_of_mass(&volume, &labeling).unwrap();
        assert_eq!(centers, vec![Some([0.0, 0.0, 0.75])]);
    }

    #[test]
    fn test_zero_weight_label_has_no_center() {
        let mask = Volume::from_slices(&[[[1u8, 0, 1]]]);
        let labeling = label_components(&mask, Connectivity::Face);
        let weights = Volume::from_slices(&[[[0.0f32, 0.0, 2.0]]]);

        let centers = centers_of_mass(&weights, &labeling).unwrap();
        assert_eq!(centers, vec![None, Some([0.0, 0.0, 2.0])]);
    }

    #[test]
    fn test_shape_mismatch() {
        let volume = Volume::filled([1, 2, 2], 1u8);
        let labeling = label_components(&volume, Connectivity::Face);
        let other = Volume::filled([2, 2, 1], 1u8);
        assert!(centers_of_mass(&other, &labeling).is_err());
    }
}
