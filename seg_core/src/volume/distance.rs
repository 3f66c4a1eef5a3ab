//! Boundary vector distance transform.

use kiddo::{ImmutableKdTree, SquaredEuclidean};

use super::Volume;
use crate::types::VoxelCoord;

/// Per-voxel vector pointing from the voxel to the nearest label boundary.
///
/// Boundaries are inter-voxel: wherever two face-adjacent voxels carry different labels
/// (background included), a boundary point sits at the midpoint of their shared face. The
/// border of the volume is not a boundary. A volume with a single label has no boundary and
/// maps to zero vectors.
pub fn boundary_vector_distance_transform(labels: &Volume<u32>) -> Volume<[f32; 3]> {
    let shape = labels.shape();
    let mut boundary: Vec<[f32; 3]> = Vec::new();

    for (voxel, &label) in labels.iter() {
        let p = voxel.to_f32();
        let forward = [
            VoxelCoord::new(voxel.a0 + 1, voxel.a1, voxel.a2),
            VoxelCoord::new(voxel.a0, voxel.a1 + 1, voxel.a2),
            VoxelCoord::new(voxel.a0, voxel.a1, voxel.a2 + 1),
        ];
        for (axis, neighbour) in forward.iter().enumerate() {
            if let Some(&other) = labels.get(*neighbour) {
                if other != label {
                    let mut midpoint = p;
                    midpoint[axis] += 0.5;
                    boundary.push(midpoint);
                }
            }
        }
    }

    if boundary.is_empty() {
        return Volume::filled(shape, [0.0; 3]);
    }

    let tree: ImmutableKdTree<f32, 3> = ImmutableKdTree::new_from_slice(&boundary);
    let data = (0..labels.len())
        .map(|index| {
            let p = VoxelCoord::from_flat_index(index, shape).to_f32();
            let nearest = tree.nearest_one::<SquaredEuclidean>(&p);
            let b = boundary[nearest.item as usize];
            [b[0] - p[0], b[1] - p[1], b[2] - p[2]]
        })
        .collect();

    Volume { shape, data }
}

/// Euclidean length of every vector in a vector field.
pub fn vector_norms(field: &Volume<[f32; 3]>) -> Volume<f32> {
    field.map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_labels_on_a_line() {
        let labels = Volume::from_slices(&[[[1u32, 1, 2, 2]]]);
        let field = boundary_vector_distance_transform(&labels);

        assert_eq!(
            field.as_slice(),
            &[
                [0.0, 0.0, 1.5],
                [0.0, 0.0, 0.5],
                [0.0, 0.0, -0.5],
                [0.0, 0.0, -1.5]
            ]
        );
        assert_eq!(vector_norms(&field).as_slice(), &[1.5, 0.5, 0.5, 1.5]);
    }

    #[test]
    fn test_single_label_has_no_boundary() {
        let labels = Volume::filled([2, 3, 3], 7u32);
        let field = boundary_vector_distance_transform(&labels);
        assert!(field.as_slice().iter().all(|v| *v == [0.0; 3]));
    }

    #[test]
    fn test_voxels_touching_a_boundary_are_half_a_voxel_away() {
        let labels = Volume::from_slices(&[
            [[0u32, 0, 0], [0, 1, 0], [0, 0, 0]],
            [[0, 0, 0], [0, 1, 0], [0, 0, 0]],
        ]);
        let norms = vector_norms(&boundary_vector_distance_transform(&labels));
        // Every voxel here is face-adjacent to a voxel with a different label.
        for (voxel, &n) in norms.iter() {
            let touches = voxel.a1 == 1 || voxel.a2 == 1;
            if touches {
                assert!((n - 0.5).abs() < 1e-6, "voxel {:?} at {}", voxel, n);
            }
        }
    }
}
