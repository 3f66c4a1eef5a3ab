//! Volume label analysis on a small hand-written volume.
//!
//! Labels the connected components of three stacked 4x4 slices, computes their centres of
//! mass and the per-voxel offsets to them, then the boundary vector distance transform of
//! the binary mask and its norms.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin volume_labels
//! RUST_LOG=info cargo run --bin volume_labels -- --vertex   # 26-connectivity
//! ```

use std::env;
use std::fmt::Display;

use log::info;

use seg_core::prelude::*;

/// Print a volume slice by slice along axis 0.
fn print_volume<T>(title: &str, volume: &Volume<T>, fmt: impl Fn(&T) -> String) {
    let [d0, d1, d2] = volume.shape();
    println!("{}:", title);
    for a0 in 0..d0 {
        println!("  slice {}", a0);
        for a1 in 0..d1 {
            let row: Vec<String> = (0..d2)
                .filter_map(|a2| volume.get(VoxelCoord::new(a0, a1, a2)))
                .map(&fmt)
                .collect();
            println!("    [{}]", row.join(", "));
        }
    }
    println!();
}

fn plain<T: Display>(value: &T) -> String {
    format!("{}", value)
}

fn main() {
    env_logger::init();

    let connectivity = if env::args().any(|a| a == "--vertex") {
        Connectivity::Vertex
    } else if env::args().any(|a| a == "--edge") {
        Connectivity::Edge
    } else {
        Connectivity::Face
    };

    let volume: Volume<u8> = Volume::from_slices(&[
        [[0, 0, 0, 0], [0, 0, 1, 1], [0, 0, 1, 1], [1, 0, 0, 0]],
        [[1, 1, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [1, 0, 0, 0]],
        [[0, 0, 0, 0], [1, 0, 0, 1], [1, 0, 0, 1], [1, 0, 0, 0]],
    ]);
    println!("Input volume shape: {:?}", volume.shape());
    print_volume("Input", &volume, plain);

    // =========================================================================
    // Connected components and centres of mass
    // =========================================================================
    let labeling = label_components(&volume, connectivity);
    info!("{:?} connectivity: {} components", connectivity, labeling.count);
    print_volume("Labels", &labeling.labels, plain);

    let centers = match centers_of_mass(&volume, &labeling) {
        Ok(centers) => centers,
        Err(e) => {
            eprintln!("Centre of mass computation failed: {}", e);
            return;
        }
    };
    println!("Centres of mass:");
    for (i, center) in centers.iter().enumerate() {
        match center {
            Some(c) => println!("  label {}: [{:.3}, {:.3}, {:.3}]", i + 1, c[0], c[1], c[2]),
            None => println!("  label {}: no mass", i + 1),
        }
    }
    println!();

    let offsets = center_offsets(&labeling, &centers);
    print_volume("Offsets to centre of mass", &offsets, |v| {
        format!("({:.2} {:.2} {:.2})", v[0], v[1], v[2])
    });

    // =========================================================================
    // Boundary vector distance transform of the binary mask
    // =========================================================================
    let mask = volume.map(|&v| u32::from(v));
    let field = boundary_vector_distance_transform(&mask);
    let norms = vector_norms(&field);
    info!("vector distance transform shape: {:?}", field.shape());
    print_volume("Distance to nearest boundary", &norms, |n| format!("{:.3}", n));
}
