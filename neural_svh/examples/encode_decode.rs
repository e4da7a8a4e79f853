//! Example: Encoding a point cloud into a sparse voxel hierarchy and decoding a field.
//!
//! This example walks through one forward pass of the pipeline:
//! 1. Sample a sphere with normals as per-point features
//! 2. Build a 3-depth sparse voxel hierarchy around the samples
//! 3. Encode the points into per-voxel latent codes at every depth
//! 4. Decode field values at query points on, inside and outside the sphere
//!
//! The networks are untrained, so the decoded values only show the data flow.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -p neural_svh --example encode_decode
//! ```

use burn::backend::NdArray;
use burn::prelude::*;

use neural_svh::{
    config::{MultiscaleDecoderConfig, PointEncoderConfig, VoxelGridConfig},
    data::{points_to_tensor, PointCloud},
    grid::{FeatureGrid, SparseFeatureHierarchy},
    nn::{MultiscalePointDecoder, PointEncoder},
    Point3,
};

type MyBackend = NdArray;

const DEPTHS: usize = 3;

fn sphere(n: usize, radius: f32) -> PointCloud {
    let mut points = Vec::with_capacity(n * n);
    let mut normals = Vec::with_capacity(n * n * 3);
    for i in 0..n {
        let theta = (i as f32 / n as f32) * std::f32::consts::PI * 2.0;
        for j in 1..n {
            let phi = (j as f32 / n as f32) * std::f32::consts::PI;
            let normal = Point3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            points.push(normal * radius);
            normals.extend_from_slice(&normal.as_array());
        }
    }

    let cloud = PointCloud::new(points);
    match cloud.clone().with_features(normals, 3) {
        Ok(with_normals) => with_normals,
        Err(e) => {
            eprintln!("Warning: dropping normals: {}", e);
            cloud
        }
    }
}

fn main() -> neural_svh::Result<()> {
    env_logger::init();

    let device = burn::backend::ndarray::NdArrayDevice::Cpu;

    println!("═══════════════════════════════════════════════════════════════");
    println!("        Point Encoding on a Sparse Voxel Hierarchy");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    // =========================================================================
    // Step 1: Sample the surface
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 1: Sampling Sphere                                     │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let radius = 0.4;
    let cloud = sphere(48, radius);
    println!("  Points:          {}", cloud.len());
    println!("  Feature width:   {}", cloud.feature_dim());
    if let Some((min, max)) = cloud.bounding_box() {
        println!(
            "  Bounds:          ({:.2}, {:.2}, {:.2}) - ({:.2}, {:.2}, {:.2})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    println!();

    // =========================================================================
    // Step 2: Build the hierarchy
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 2: Building Sparse Voxel Hierarchy                     │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let grid_config = VoxelGridConfig::new(0.04).with_dilation(1);
    let svh = SparseFeatureHierarchy::from_points(&grid_config, &cloud.points, DEPTHS)?;
    for depth in svh.present_depths() {
        if let Some(grid) = svh.grid(depth) {
            println!(
                "  Depth {}:         {} voxels of {:.3} m",
                depth,
                FeatureGrid::<MyBackend>::num_voxels(grid),
                FeatureGrid::<MyBackend>::voxel_size(grid).x
            );
        }
    }
    println!();

    // =========================================================================
    // Step 3: Encode
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 3: Encoding Points                                     │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let encoder_config = PointEncoderConfig::new(3 + cloud.feature_dim()).with_c_dim(16);
    let encoder = PointEncoder::<MyBackend>::new(&encoder_config, &device)?;

    let xyz = cloud.positions_tensor::<MyBackend>(&device);
    let features = cloud.features_tensor::<MyBackend>(&device);
    let codes = encoder.encode_hierarchy(xyz, features, &svh, &svh.present_depths())?;
    for (depth, tensor) in codes.iter() {
        let [rows, width] = tensor.dims();
        let mean: f32 = tensor.clone().abs().mean().into_scalar().elem();
        println!("  Depth {}:         {} x {} codes, mean |c| = {:.4}", depth, rows, width, mean);
    }
    println!();

    // =========================================================================
    // Step 4: Decode
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 4: Decoding Field Values                               │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let decoder_config = MultiscaleDecoderConfig::new()
        .with_c_each_dim(16)
        .with_multiscale_depths(DEPTHS);
    let decoder = MultiscalePointDecoder::<MyBackend>::new(&decoder_config, &device)?;
    println!(
        "  Aggregation:     {} ({} channels)",
        decoder.aggregation(),
        decoder.c_dim()
    );

    let queries = [
        ("surface", Point3::new(radius, 0.0, 0.0)),
        ("inside", Point3::new(0.5 * radius, 0.0, 0.0)),
        ("outside", Point3::new(1.5 * radius, 0.0, 0.0)),
        ("far", Point3::new(3.0, 3.0, 3.0)),
    ];
    let query_points: Vec<Point3> = queries.iter().map(|(_, p)| *p).collect();
    let values = decoder.decode(points_to_tensor(&query_points, &device), &svh, &codes)?;
    let values: Vec<f32> = values
        .to_data()
        .to_vec()
        .map_err(|e| neural_svh::NeuralSvhError::InvalidData(format!("{:?}", e)))?;

    for ((name, p), value) in queries.iter().zip(values) {
        println!(
            "  {:<8} ({:+.2}, {:+.2}, {:+.2}) -> {:+.5}",
            name, p.x, p.y, p.z, value
        );
    }
    println!();

    println!("Done.");
    Ok(())
}
