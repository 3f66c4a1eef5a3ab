//! K-nearest-neighbour search between point sets.
//!
//! The search is an external collaborator of the network: it receives host-side coordinates
//! and returns, for every query point, the indices of the `k` closest support points and
//! their Euclidean distances, ordered nearest first. Ties are broken by the lower index.
//!
//! Each implementation declares a [`DeviceAffinity`] so callers know whether its results are
//! tied to host memory and have to be transferred explicitly before device-side gathers.

use std::cmp::Ordering;
use std::num::NonZero;

use kiddo::{ImmutableKdTree, SquaredEuclidean};

use crate::cloud::CloudBatch;
use crate::error::{Result, SegCoreError};

/// Where a neighbour search is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAffinity {
    /// Runs on general-purpose compute only; consumers must move results to the device.
    Host,
    /// No placement restriction; consumers may finish the work on whichever device holds
    /// the tensors.
    Any,
}

/// Neighbour lists for a batch of query sets, stored `[batch, query, k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborIndex {
    batch: usize,
    num_queries: usize,
    k: usize,
    indices: Vec<usize>,
    distances: Vec<f32>,
}

impl NeighborIndex {
    /// Wrap flat index and distance buffers.
    pub fn new(
        batch: usize,
        num_queries: usize,
        k: usize,
        indices: Vec<usize>,
        distances: Vec<f32>,
    ) -> Result<Self> {
        let expected = batch * num_queries * k;
        if indices.len() != expected {
            return Err(SegCoreError::LengthMismatch {
                expected,
                got: indices.len(),
            });
        }
        if distances.len() != expected {
            return Err(SegCoreError::LengthMismatch {
                expected,
                got: distances.len(),
            });
        }
        Ok(Self {
            batch,
            num_queries,
            k,
            indices,
            distances,
        })
    }

    /// Concatenate single-cloud results along the batch axis.
    pub fn stack(parts: Vec<NeighborIndex>) -> Result<Self> {
        let Some(first) = parts.first() else {
            return Err(SegCoreError::EmptyPointSet);
        };
        let (num_queries, k) = (first.num_queries, first.k);
        let mut batch = 0;
        let mut indices = Vec::with_capacity(parts.len() * num_queries * k);
        let mut distances = Vec::with_capacity(parts.len() * num_queries * k);
        for part in parts {
            if part.num_queries != num_queries || part.k != k {
                return Err(SegCoreError::LengthMismatch {
                    expected: num_queries * k,
                    got: part.num_queries * part.k,
                });
            }
            batch += part.batch;
            indices.extend(part.indices);
            distances.extend(part.distances);
        }
        Ok(Self {
            batch,
            num_queries,
            k,
            indices,
            distances,
        })
    }

    /// Number of query sets.
    #[inline]
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Queries per set.
    #[inline]
    pub fn num_queries(&self) -> usize {
        self.num_queries
    }

    /// Neighbours per query.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Flat neighbour indices, local to each batch element.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Flat neighbour distances.
    #[inline]
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Neighbours of one query point.
    pub fn neighbors_of(&self, b: usize, query: usize) -> &[usize] {
        let start = (b * self.num_queries + query) * self.k;
        &self.indices[start..start + self.k]
    }

    /// Distances of one query point's neighbours.
    pub fn distances_of(&self, b: usize, query: usize) -> &[f32] {
        let start = (b * self.num_queries + query) * self.k;
        &self.distances[start..start + self.k]
    }

    /// Indices offset by `b * support_len`, addressing rows of a batch-flattened tensor.
    pub fn global_indices(&self, support_len: usize) -> Vec<i64> {
        let per_batch = self.num_queries * self.k;
        self.indices
            .iter()
            .enumerate()
            .map(|(i, &index)| ((i / per_batch) * support_len + index) as i64)
            .collect()
    }

    /// Largest index in the table, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }
}

/// A k-nearest-neighbour search service.
pub trait NeighborSearch {
    /// Placement capability of this search.
    fn affinity(&self) -> DeviceAffinity;

    /// For each query, the `k` nearest support points (nearest first).
    ///
    /// Fails if `k` is zero or exceeds `support.len()`.
    fn search(&self, support: &[[f32; 3]], queries: &[[f32; 3]], k: usize)
        -> Result<NeighborIndex>;

    /// Run [`search`](Self::search) for every batch element.
    fn search_batch(
        &self,
        support: &CloudBatch,
        queries: &CloudBatch,
        k: usize,
    ) -> Result<NeighborIndex> {
        if support.batch() != queries.batch() {
            return Err(SegCoreError::LengthMismatch {
                expected: support.batch(),
                got: queries.batch(),
            });
        }
        let parts = (0..support.batch())
            .map(|b| self.search(support.element(b), queries.element(b), k))
            .collect::<Result<Vec<_>>>()?;
        NeighborIndex::stack(parts)
    }
}

fn check_k(k: usize, available: usize) -> Result<NonZero<usize>> {
    match NonZero::new(k) {
        Some(k_nz) if k <= available => Ok(k_nz),
        _ => Err(SegCoreError::InvalidNeighborCount { k, available }),
    }
}

#[inline]
fn squared_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

fn by_distance_then_index(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.partial_cmp(&b.1)
        .unwrap_or(Ordering::Equal)
        .then(a.0.cmp(&b.0))
}

/// Exact neighbour search by scanning every support point.
///
/// Quadratic, but free of any placement restriction; used as the reference implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceSearch;

impl NeighborSearch for BruteForceSearch {
    fn affinity(&self) -> DeviceAffinity {
        DeviceAffinity::Any
    }

    fn search(
        &self,
        support: &[[f32; 3]],
        queries: &[[f32; 3]],
        k: usize,
    ) -> Result<NeighborIndex> {
        check_k(k, support.len())?;

        let mut indices = Vec::with_capacity(queries.len() * k);
        let mut distances = Vec::with_capacity(queries.len() * k);
        let mut scratch: Vec<(usize, f32)> = Vec::with_capacity(support.len());

        for q in queries {
            scratch.clear();
            scratch.extend(
                support
                    .iter()
                    .enumerate()
                    .map(|(j, p)| (j, squared_distance(q, p))),
            );
            scratch.sort_by(by_distance_then_index);
            for &(j, d2) in scratch.iter().take(k) {
                indices.push(j);
                distances.push(d2.sqrt());
            }
        }

        NeighborIndex::new(1, queries.len(), k, indices, distances)
    }
}

/// Neighbour search over an immutable k-d tree built per call.
///
/// `nearest_n` settles the k-th distance; every support point within that radius is then
/// collected and ranked by (distance, index), so ties at the k-th place resolve exactly as
/// in [`BruteForceSearch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KdTreeSearch;

/// Relative slack on the k-th radius passed to `within_unsorted`; exact ties are filtered after.
const RADIUS_SLACK: f32 = 1e-5;

impl NeighborSearch for KdTreeSearch {
    fn affinity(&self) -> DeviceAffinity {
        DeviceAffinity::Host
    }

    fn search(
        &self,
        support: &[[f32; 3]],
        queries: &[[f32; 3]],
        k: usize,
    ) -> Result<NeighborIndex> {
        let k_nz = check_k(k, support.len())?;
        let tree: ImmutableKdTree<f32, 3> = ImmutableKdTree::new_from_slice(support);

        let mut indices = Vec::with_capacity(queries.len() * k);
        let mut distances = Vec::with_capacity(queries.len() * k);
        let mut scratch: Vec<(usize, f32)> = Vec::with_capacity(k);

        for q in queries {
            let kth = tree
                .nearest_n::<SquaredEuclidean>(q, k_nz)
                .into_iter()
                .map(|n| squared_distance(q, &support[n.item as usize]))
                .fold(0.0_f32, f32::max);
            let radius = kth * (1.0 + RADIUS_SLACK) + f32::EPSILON;

            scratch.clear();
            scratch.extend(
                tree.within_unsorted::<SquaredEuclidean>(q, radius)
                    .into_iter()
                    .map(|n| n.item as usize)
                    .map(|j| (j, squared_distance(q, &support[j])))
                    .filter(|&(_, d2)| d2 <= kth),
            );
            scratch.sort_by(by_distance_then_index);
            for &(j, d2) in scratch.iter().take(k) {
                indices.push(j);
                distances.push(d2.sqrt());
            }
        }

        log::trace!(
            "kd-tree search: {} queries against {} support points, k = {}",
            queries.len(),
            support.len(),
            k
        );

        NeighborIndex::new(1, queries.len(), k, indices, distances)
    }
}
