//! Explicit permutations over point indices.
//!
//! Decimation keeps a prefix of the point order, so the order is shuffled first. The shuffle
//! is a value of its own: callers either pass one in or draw it from a seeded generator,
//! which makes every forward pass reproducible.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, SegCoreError};

/// A bijection over `0..len`.
///
/// Applying the permutation to a sequence produces `out[i] = items[indices[i]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<usize>,
}

impl Permutation {
    /// The identity permutation.
    pub fn identity(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    /// A uniformly random permutation drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);
        Self { indices }
    }

    /// A random permutation from a fixed seed.
    pub fn seeded(len: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::random(len, &mut rng)
    }

    /// Validate and wrap an index list.
    pub fn from_indices(indices: Vec<usize>) -> Result<Self> {
        let len = indices.len();
        let mut seen = vec![false; len];
        for &index in &indices {
            if index >= len {
                return Err(SegCoreError::PermutationIndexOutOfRange { index, len });
            }
            if seen[index] {
                return Err(SegCoreError::DuplicatePermutationIndex { index });
            }
            seen[index] = true;
        }
        Ok(Self { indices })
    }

    /// Number of elements permuted.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The source index for each output position.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The inverse permutation, so that `inverse.apply(self.apply(x)) == x`.
    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0; self.indices.len()];
        for (position, &source) in self.indices.iter().enumerate() {
            inverse[source] = position;
        }
        Self { indices: inverse }
    }

    /// Reorder `items`: `out[i] = items[self.indices()[i]]`.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Result<Vec<T>> {
        if items.len() != self.indices.len() {
            return Err(SegCoreError::LengthMismatch {
                expected: self.indices.len(),
                got: items.len(),
            });
        }
        Ok(self.indices.iter().map(|&i| items[i].clone()).collect())
    }

    /// Compose with an inner permutation: `out[i] = self.indices()[inner.indices()[i]]`.
    ///
    /// Applying the result to `x` equals applying `inner` to the output of `self` on `x`.
    pub fn compose(&self, inner: &Permutation) -> Result<Self> {
        Ok(Self {
            indices: inner.apply(&self.indices)?,
        })
    }

    /// Indices as `i64`, the integer type tensor backends index with.
    pub fn to_i64(&self) -> Vec<i64> {
        self.indices.iter().map(|&i| i as i64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let perm = Permutation::identity(4);
        assert_eq!(perm.apply(&['a', 'b', 'c', 'd']).unwrap(), vec!['a', 'b', 'c', 'd']);
        assert_eq!(perm.inverse(), perm);
    }

    #[test]
    fn test_apply_and_inverse() {
        let perm = Permutation::from_indices(vec![2, 0, 3, 1]).unwrap();
        let items = [10, 20, 30, 40];

        let permuted = perm.apply(&items).unwrap();
        assert_eq!(permuted, vec![30, 10, 40, 20]);

        let restored = perm.inverse().apply(&permuted).unwrap();
        assert_eq!(restored, items.to_vec());
    }

    #[test]
    fn test_from_indices_rejects_invalid() {
        assert_eq!(
            Permutation::from_indices(vec![0, 3, 1]).unwrap_err(),
            SegCoreError::PermutationIndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(
            Permutation::from_indices(vec![0, 1, 1]).unwrap_err(),
            SegCoreError::DuplicatePermutationIndex { index: 1 }
        );
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = Permutation::seeded(64, 7);
        let b = Permutation::seeded(64, 7);
        let c = Permutation::seeded(64, 8);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(Permutation::from_indices(a.indices().to_vec()).is_ok());
    }

    #[test]
    fn test_compose_matches_sequential_application() {
        let outer = Permutation::from_indices(vec![1, 2, 0, 3]).unwrap();
        let inner = Permutation::from_indices(vec![3, 1, 0, 2]).unwrap();
        let items = ['w', 'x', 'y', 'z'];

        let composed = outer.compose(&inner).unwrap();
        let sequential = inner.apply(&outer.apply(&items).unwrap()).unwrap();
        assert_eq!(composed.apply(&items).unwrap(), sequential);
    }

    #[test]
    fn test_apply_length_mismatch() {
        let perm = Permutation::identity(3);
        assert!(perm.apply(&[1, 2]).is_err());
    }
}
