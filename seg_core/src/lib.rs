//! # seg_core
//!
//! Framework-free algorithms behind hierarchical point-cloud networks.
//!
//! This crate holds everything in a RandLA-style encoder/decoder that is not a learned
//! layer: neighbour search, relative position descriptors, the permutation that precedes
//! decimation, the decimation ladder itself and the stage stack that couples the encoder to
//! the decoder. It also carries the dense-volume label analysis used when preparing
//! segmentation targets.
//!
//! ## Modules
//!
//! - [`types`]: Core value types (Point3, VoxelCoord)
//! - [`cloud`]: Host-side coordinates for a batch of clouds
//! - [`neighbors`]: K-nearest-neighbour search service and its implementations
//! - [`encoding`]: 10-wide relative position descriptors
//! - [`permutation`]: Explicit, seedable permutations
//! - [`ladder`]: Decimation ladder bookkeeping
//! - [`stage_stack`]: Bounded LIFO of encoder outputs
//! - [`volume`]: Connected components, centres of mass, boundary vector fields
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```
//! use seg_core::prelude::*;
//!
//! let cloud = CloudBatch::single(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
//! let index = KdTreeSearch.search_batch(&cloud, &cloud, 2).unwrap();
//! assert_eq!(index.neighbors_of(0, 0), &[0, 1]);
//!
//! let ladder = DecimationLadder::new(256, 4, 4).unwrap();
//! assert_eq!(ladder.counts(), vec![256, 64, 16, 4, 1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cloud;
pub mod encoding;
pub mod error;
pub mod ladder;
pub mod neighbors;
pub mod permutation;
pub mod stage_stack;
pub mod types;
pub mod volume;

/// Prelude module for convenient imports.
///
/// Provides the most commonly used types and functions.
pub mod prelude {
    pub use crate::cloud::CloudBatch;
    pub use crate::encoding::{relative_position_encoding, DESCRIPTOR_DIM};
    pub use crate::error::{Result, SegCoreError};
    pub use crate::ladder::DecimationLadder;
    pub use crate::neighbors::{
        BruteForceSearch, DeviceAffinity, KdTreeSearch, NeighborIndex, NeighborSearch,
    };
    pub use crate::permutation::Permutation;
    pub use crate::stage_stack::StageStack;
    pub use crate::types::{Point3, VoxelCoord};
    pub use crate::volume::{
        boundary_vector_distance_transform, center_offsets, centers_of_mass, label_components,
        vector_norms, Connectivity, Labeling, Volume,
    };
}

// Re-export everything at crate root for convenience
pub use cloud::CloudBatch;
pub use encoding::{relative_position_encoding, DESCRIPTOR_DIM};
pub use error::{Result, SegCoreError};
pub use ladder::DecimationLadder;
pub use neighbors::{BruteForceSearch, DeviceAffinity, KdTreeSearch, NeighborIndex, NeighborSearch};
pub use permutation::Permutation;
pub use stage_stack::StageStack;
pub use types::{Point3, VoxelCoord};
pub use volume::{Connectivity, Labeling, Volume};
