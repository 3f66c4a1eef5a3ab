//! Neighbourhood plumbing between the host-side search and device tensors.
//!
//! Every encoder stage works on a prefix of the permuted cloud. [`ActivePoints`] keeps the
//! host copy the search runs on and the device copy the layers consume in lockstep, so the
//! two can never disagree on point order.

use burn::prelude::*;
use log::trace;
use seg_core::{
    relative_position_encoding, CloudBatch, DeviceAffinity, NeighborIndex, NeighborSearch,
    Permutation, DESCRIPTOR_DIM,
};

use crate::error::{NeuralSegError, Result};

/// Coordinates of the currently active points, mirrored on host and device.
#[derive(Debug, Clone)]
pub struct ActivePoints<B: Backend> {
    host: CloudBatch,
    device: Tensor<B, 3>,
}

impl<B: Backend> ActivePoints<B> {
    /// Read device coordinates `[batch, num_points, 3]` back to the host.
    pub fn from_tensor(coords: Tensor<B, 3>) -> Result<Self> {
        let [batch, num_points, width] = coords.dims();
        if width != 3 {
            return Err(NeuralSegError::input(format!(
                "coordinates must have 3 channels, got {width}"
            )));
        }
        let flat = read_f32(coords.clone())?;
        let host = CloudBatch::from_flat(batch, num_points, &flat)?;
        Ok(Self {
            host,
            device: coords,
        })
    }

    /// Upload host coordinates.
    pub fn from_host(host: CloudBatch, device: &B::Device) -> Self {
        let shape = [host.batch(), host.num_points(), 3];
        let tensor = Tensor::from_data(TensorData::new(host.to_flat(), shape), device);
        Self {
            host,
            device: tensor,
        }
    }

    /// Host coordinates.
    pub fn host(&self) -> &CloudBatch {
        &self.host
    }

    /// Device coordinates.
    pub fn tensor(&self) -> &Tensor<B, 3> {
        &self.device
    }

    /// Number of clouds.
    pub fn batch(&self) -> usize {
        self.host.batch()
    }

    /// Points per cloud.
    pub fn len(&self) -> usize {
        self.host.num_points()
    }

    /// Whether the clouds are empty.
    pub fn is_empty(&self) -> bool {
        self.host.num_points() == 0
    }

    /// Reorder both copies by the same permutation.
    pub fn permuted(&self, permutation: &Permutation) -> Result<Self> {
        let host = self.host.permuted(permutation)?;
        let device = permute_rows(self.device.clone(), permutation);
        Ok(Self { host, device })
    }

    /// Keep the first `len` points of both copies.
    pub fn prefix(&self, len: usize) -> Result<Self> {
        let host = self.host.prefix(len)?;
        let device = self.device.clone().narrow(1, 0, len);
        Ok(Self { host, device })
    }
}

/// Reorder axis 1 of `[batch, rows, channels]` so that row `i` becomes row `permutation[i]`.
pub fn permute_rows<B: Backend>(x: Tensor<B, 3>, permutation: &Permutation) -> Tensor<B, 3> {
    let device = x.device();
    let indices = Tensor::<B, 1, Int>::from_data(
        TensorData::new(permutation.to_i64(), [permutation.len()]),
        &device,
    );
    x.select(1, indices)
}

/// Search the `k` nearest neighbours of every active point among the active points and
/// build the `[batch, points, k, 10]` relative position descriptors.
///
/// Searches pinned to the host get their descriptors assembled next to the coordinates and
/// uploaded once; unrestricted searches only ship indices and distances and the descriptor
/// is gathered from the device coordinates.
pub fn neighborhood<B: Backend>(
    points: &ActivePoints<B>,
    search: &dyn NeighborSearch,
    k: usize,
) -> Result<Tensor<B, 4>> {
    let index = search.search_batch(&points.host, &points.host, k)?;
    trace!(
        "neighbourhood of {} x {} points, k = {}, affinity {:?}",
        points.batch(),
        points.len(),
        k,
        search.affinity()
    );
    match search.affinity() {
        DeviceAffinity::Host => descriptors_on_host(points, &index),
        DeviceAffinity::Any => Ok(descriptors_on_device(points, &index)),
    }
}

/// Assemble descriptors on the host and upload them.
pub fn descriptors_on_host<B: Backend>(
    points: &ActivePoints<B>,
    index: &NeighborIndex,
) -> Result<Tensor<B, 4>> {
    let flat = relative_position_encoding(&points.host, &points.host, index)?;
    let shape = [index.batch(), index.num_queries(), index.k(), DESCRIPTOR_DIM];
    Ok(Tensor::from_data(
        TensorData::new(flat, shape),
        &points.device.device(),
    ))
}

/// Gather neighbour coordinates on the device and assemble descriptors there.
pub fn descriptors_on_device<B: Backend>(
    points: &ActivePoints<B>,
    index: &NeighborIndex,
) -> Tensor<B, 4> {
    let device = points.device.device();
    let [batch, n, _] = points.device.dims();
    let k = index.k();

    let neighbours = gather_points(points.device.clone(), index).reshape([batch, n, k, 3]);
    let centres = points
        .device
        .clone()
        .unsqueeze_dim::<4>(2)
        .repeat_dim(2, k);
    let distances = Tensor::<B, 1>::from_data(
        TensorData::new(index.distances().to_vec(), [batch * n * k]),
        &device,
    )
    .reshape([batch, n, k, 1]);

    Tensor::cat(
        vec![
            centres.clone(),
            neighbours.clone(),
            centres - neighbours,
            distances,
        ],
        3,
    )
}

/// Broadcast-gather rows of `[batch, support, channels]` through a neighbour table.
///
/// Returns `[batch, queries * k, channels]`; with `k = 1` this is nearest-neighbour
/// upsampling of `source` onto the query set.
pub fn gather_points<B: Backend>(source: Tensor<B, 3>, index: &NeighborIndex) -> Tensor<B, 3> {
    let device = source.device();
    let [batch, support, channels] = source.dims();
    let rows = index.num_queries() * index.k();

    let global = index.global_indices(support);
    let indices = Tensor::<B, 1, Int>::from_data(TensorData::new(global, [batch * rows]), &device);

    source
        .reshape([batch * support, channels])
        .select(0, indices)
        .reshape([batch, rows, channels])
}

/// Copy a float tensor back to host memory.
pub(crate) fn read_f32<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .into_vec::<f32>()
        .map_err(|e| NeuralSegError::InvalidData(format!("cannot read tensor: {e:?}")))
}
