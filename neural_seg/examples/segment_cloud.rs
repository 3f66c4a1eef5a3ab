//! Example: Segmenting a synthetic scene.
//!
//! Builds a small scene (a floor, a sphere resting on it and a pole), normalizes it, and
//! runs an untrained segmentation network over two views of it. The weights are random, so
//! the predicted labels are arbitrary; the example shows the data flow and the shapes.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -p neural_seg --example segment_cloud
//! ```

use burn::backend::NdArray;
use burn::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use neural_seg::{
    config::RandLaNetConfig,
    data::{collate, PointCloud},
    Point3,
};

type MyBackend = NdArray;

const NUM_POINTS: usize = 1024;
const NUM_CLASSES: usize = 3;

/// Sample a scene and use height and distance from the scene axis as features.
fn synthetic_scene(rng: &mut ChaCha8Rng) -> PointCloud {
    let mut points = Vec::with_capacity(NUM_POINTS);
    for i in 0..NUM_POINTS {
        let p = match i % 4 {
            // Floor
            0 | 1 => Point3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 0.0),
            // Sphere of radius 0.5 touching the floor
            2 => {
                let theta = rng.gen_range(0.0..std::f32::consts::TAU);
                let z: f32 = rng.gen_range(-1.0..1.0);
                let r = (1.0 - z * z).sqrt();
                Point3::new(0.5 * r * theta.cos(), 0.5 * r * theta.sin(), 0.5 + 0.5 * z)
            }
            // Pole
            _ => {
                let theta = rng.gen_range(0.0..std::f32::consts::TAU);
                Point3::new(
                    1.5 + 0.05 * theta.cos(),
                    1.5 + 0.05 * theta.sin(),
                    rng.gen_range(0.0..2.0),
                )
            }
        };
        points.push(p);
    }

    let features = points
        .iter()
        .flat_map(|p| [p.z, (p.x * p.x + p.y * p.y).sqrt()])
        .collect();

    let mut cloud = PointCloud::with_features(points, features, 2)
        .expect("two features per point");
    cloud.normalize();
    cloud
}

fn main() {
    env_logger::init();

    let device = burn::backend::ndarray::NdArrayDevice::Cpu;
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    println!("═══════════════════════════════════════════════════════════════");
    println!("          Point Cloud Segmentation (untrained)");
    println!("═══════════════════════════════════════════════════════════════");

    let clouds = vec![synthetic_scene(&mut rng), synthetic_scene(&mut rng)];
    let (coords, features) = collate::<MyBackend>(&clouds, &device).expect("equal-size clouds");
    println!("  Input coordinates: {:?}", coords.dims());
    println!("  Input features:    {:?}", features.dims());

    let config = RandLaNetConfig::new(2, NUM_CLASSES);
    let net = config.init::<MyBackend>(&device).expect("valid configuration");
    println!(
        "  Network:           {} stages, k = {}, decimation {}",
        net.num_stages(),
        net.num_neighbors(),
        net.decimation()
    );

    let scores = match net.forward(coords, features, &mut rng) {
        Ok(scores) => scores,
        Err(e) => {
            eprintln!("Segmentation failed: {}", e);
            return;
        }
    };
    println!("  Output scores:     {:?}", scores.dims());

    let labels = scores
        .argmax(2)
        .into_data()
        .convert::<i64>()
        .into_vec::<i64>()
        .expect("integer labels");

    for (b, chunk) in labels.chunks(NUM_POINTS).enumerate() {
        let mut counts = [0usize; NUM_CLASSES];
        for &label in chunk {
            counts[label as usize] += 1;
        }
        println!("  Cloud {}: points per class {:?}", b, counts);
    }
}
