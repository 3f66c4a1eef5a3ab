//! Classification forward-pass timing.
//!
//! Runs the classification network over batches of random clouds with random features and
//! reports the wall-clock time per sample.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin timing_benchmark
//! cargo run --release --bin timing_benchmark -- --quick   # Smaller clouds, fewer passes
//! ```

use std::env;

use burn::backend::NdArray;
use burn::prelude::*;
use burn::tensor::Distribution;
use instant::Instant;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neural_seg::config::RandLaClassifierConfig;

type MyBackend = NdArray;

/// Benchmark configuration
struct BenchConfig {
    /// Clouds per batch
    batch: usize,
    /// Points per cloud
    num_points: usize,
    /// Per-point feature width
    num_features: usize,
    /// Output classes
    num_classes: usize,
    /// Neighbours per point
    num_neighbors: usize,
    /// Decimation ratio per stage
    decimation: usize,
    /// Timed forward passes
    iterations: usize,
}

impl BenchConfig {
    fn full() -> Self {
        Self {
            batch: 5,
            num_points: 1 << 15,
            num_features: 4,
            num_classes: 10,
            num_neighbors: 16,
            decimation: 4,
            iterations: 10,
        }
    }

    fn quick() -> Self {
        Self {
            batch: 2,
            num_points: 1 << 12,
            iterations: 2,
            ..Self::full()
        }
    }
}

fn main() {
    env_logger::init();

    let config = if env::args().any(|a| a == "--quick") {
        BenchConfig::quick()
    } else {
        BenchConfig::full()
    };

    let device = burn::backend::ndarray::NdArrayDevice::Cpu;
    MyBackend::seed(0);

    let net = match RandLaClassifierConfig::new(config.num_features, config.num_classes)
        .with_num_neighbors(config.num_neighbors)
        .with_decimation(config.decimation)
        .init::<MyBackend>(&device)
    {
        Ok(net) => net,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    let noise = Distribution::Normal(0.0, 1000.0);
    let coords = Tensor::<MyBackend, 3>::random([config.batch, config.num_points, 3], noise, &device);
    let features = Tensor::<MyBackend, 3>::random(
        [config.batch, config.num_points, config.num_features],
        noise,
        &device,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    info!(
        "timing {} passes over {} clouds of {} points",
        config.iterations, config.batch, config.num_points
    );

    let start = Instant::now();
    for i in 0..config.iterations {
        match net.forward(coords.clone(), features.clone(), &mut rng) {
            Ok(scores) => info!("pass {}: scores {:?}", i, scores.dims()),
            Err(e) => {
                eprintln!("Forward pass failed: {}", e);
                return;
            }
        }
    }
    let elapsed = start.elapsed().as_secs_f64();

    let per_sample = elapsed / (config.batch * config.iterations) as f64;
    println!("Time per sample: {:.2} s", per_sample);
}
