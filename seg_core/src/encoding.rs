//! Relative point position descriptors.
//!
//! For every (query point, neighbour) pair the descriptor is
//! `[query(3), neighbour(3), query - neighbour(3), distance(1)]`.

use crate::cloud::CloudBatch;
use crate::error::{Result, SegCoreError};
use crate::neighbors::NeighborIndex;

/// Width of one relative position descriptor.
pub const DESCRIPTOR_DIM: usize = 10;

/// Assemble descriptors for every pair in `index`, laid out `[batch, query, k, 10]`.
///
/// `queries` supplies the centre points and `support` the points `index` refers into.
pub fn relative_position_encoding(
    queries: &CloudBatch,
    support: &CloudBatch,
    index: &NeighborIndex,
) -> Result<Vec<f32>> {
    if index.batch() != queries.batch() || support.batch() != queries.batch() {
        return Err(SegCoreError::LengthMismatch {
            expected: queries.batch(),
            got: index.batch(),
        });
    }
    if index.num_queries() != queries.num_points() {
        return Err(SegCoreError::LengthMismatch {
            expected: queries.num_points(),
            got: index.num_queries(),
        });
    }
    if let Some(max) = index.max_index() {
        if max >= support.num_points() {
            return Err(SegCoreError::InvalidNeighborCount {
                k: max + 1,
                available: support.num_points(),
            });
        }
    }

    let k = index.k();
    let mut out = Vec::with_capacity(queries.batch() * queries.num_points() * k * DESCRIPTOR_DIM);

    for b in 0..queries.batch() {
        let centres = queries.element(b);
        let points = support.element(b);
        for (q, centre) in centres.iter().enumerate() {
            let neighbours = index.neighbors_of(b, q);
            let distances = index.distances_of(b, q);
            for (&j, &dist) in neighbours.iter().zip(distances) {
                let n = points[j];
                out.extend_from_slice(centre);
                out.extend_from_slice(&n);
                out.extend_from_slice(&[centre[0] - n[0], centre[1] - n[1], centre[2] - n[2]]);
                out.push(dist);
            }
        }
    }

    Ok(out)
}
