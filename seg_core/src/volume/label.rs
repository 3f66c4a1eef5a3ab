//! Connected-component labelling with union-find.

use super::Volume;
use crate::types::VoxelCoord;

/// Which voxels count as adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Voxels sharing a face (6 neighbours).
    #[default]
    Face,
    /// Voxels sharing a face or an edge (18 neighbours).
    Edge,
    /// Voxels sharing a face, edge or corner (26 neighbours).
    Vertex,
}

impl Connectivity {
    /// Neighbour offsets that precede a voxel in raster order.
    fn backward_offsets(self) -> Vec<[isize; 3]> {
        let max_nonzero = match self {
            Connectivity::Face => 1,
            Connectivity::Edge => 2,
            Connectivity::Vertex => 3,
        };
        let mut offsets = Vec::new();
        for d0 in -1isize..=1 {
            for d1 in -1isize..=1 {
                for d2 in -1isize..=1 {
                    let nonzero = [d0, d1, d2].iter().filter(|&&d| d != 0).count();
                    if nonzero == 0 || nonzero > max_nonzero {
                        continue;
                    }
                    // Lexicographically negative offsets point at already visited voxels.
                    if (d0, d1, d2) < (0, 0, 0) {
                        offsets.push([d0, d1, d2]);
                    }
                }
            }
        }
        offsets
    }
}

/// Result of connected-component labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Labeling {
    /// Label per voxel: 0 for background, `1..=count` for components.
    pub labels: Volume<u32>,
    /// Number of components found.
    pub count: u32,
}

impl Labeling {
    /// Voxels carrying `label`, in raster order.
    pub fn voxels_of(&self, label: u32) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.labels
            .iter()
            .filter(move |(_, &l)| l == label)
            .map(|(voxel, _)| voxel)
    }
}

fn uf_find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn uf_union(parent: &mut [usize], a: usize, b: usize) {
    let ra = uf_find(parent, a);
    let rb = uf_find(parent, b);
    if ra != rb {
        // Keep the earlier voxel as root so labels follow first occurrence.
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

/// Label the connected components of the foreground of `volume`.
///
/// Components are numbered from 1 in raster order of their first voxel.
pub fn label_components<T: PartialEq + Default>(
    volume: &Volume<T>,
    connectivity: Connectivity,
) -> Labeling {
    let shape = volume.shape();
    let background = T::default();
    let foreground: Vec<bool> = volume.as_slice().iter().map(|v| *v != background).collect();
    let offsets = connectivity.backward_offsets();

    let mut parent: Vec<usize> = (0..foreground.len()).collect();

    for (index, &is_fg) in foreground.iter().enumerate() {
        if !is_fg {
            continue;
        }
        let voxel = VoxelCoord::from_flat_index(index, shape);
        for offset in &offsets {
            let neighbour = [
                voxel.a0 as isize + offset[0],
                voxel.a1 as isize + offset[1],
                voxel.a2 as isize + offset[2],
            ];
            if neighbour.iter().zip(shape).any(|(&n, s)| n < 0 || n >= s as isize) {
                continue;
            }
            let n_index =
                VoxelCoord::new(neighbour[0] as usize, neighbour[1] as usize, neighbour[2] as usize)
                    .flat_index(shape);
            if foreground[n_index] {
                uf_union(&mut parent, index, n_index);
            }
        }
    }

    let mut root_label = vec![0u32; foreground.len()];
    let mut count = 0u32;
    let mut labels = Vec::with_capacity(foreground.len());
    for (index, &is_fg) in foreground.iter().enumerate() {
        if !is_fg {
            labels.push(0);
            continue;
        }
        let root = uf_find(&mut parent, index);
        if root_label[root] == 0 {
            count += 1;
            root_label[root] = count;
        }
        labels.push(root_label[root]);
    }

    Labeling {
        labels: Volume {
            shape,
            data: labels,
        },
        count,
    }
}
