//! # neural_svh
//!
//! Learned point-to-voxel encoding and multiscale field decoding on sparse voxel
//! hierarchies, built with Burn.
//!
//! A point cloud is compressed into per-voxel latent codes at each depth of a
//! sparse voxel hierarchy, and those codes are turned back into a continuous
//! field (signed distance, occupancy, ...) at arbitrary query positions.
//!
//! ## Features
//!
//! - **Point encoder**: PointNet-style blocks with per-voxel max pooling and a
//!   per-voxel mean of the final codes
//! - **Multiscale decoder**: trilinear sampling of every depth, concatenated or
//!   summed, fused with a scale-consistent positional feature
//! - **Grid seam**: any storage implementing [`FeatureGrid`] can back the
//!   hierarchy; [`SparseVoxelGrid`] is a hash-map reference implementation
//!
//! ## Quick Start
//!
//! ```
//! use burn::backend::NdArray;
//! use neural_svh::prelude::*;
//!
//! type B = NdArray;
//! let device = Default::default();
//!
//! let points = vec![Point3::new(0.05, 0.05, 0.05), Point3::new(0.31, 0.12, 0.07)];
//! let svh = SparseFeatureHierarchy::from_points(&VoxelGridConfig::new(0.1), &points, 2)?;
//!
//! let encoder = PointEncoder::<B>::new(&PointEncoderConfig::new(3).with_c_dim(8), &device)?;
//! let decoder_config = MultiscaleDecoderConfig::new()
//!     .with_c_each_dim(8)
//!     .with_multiscale_depths(2);
//! let decoder = MultiscalePointDecoder::<B>::new(&decoder_config, &device)?;
//!
//! let xyz = points_to_tensor::<B>(&points, &device);
//! let codes = encoder.encode_hierarchy(xyz.clone(), None, &svh, &[0, 1])?;
//! let sdf = decoder.decode(xyz, &svh, &codes)?;
//! assert_eq!(sdf.dims(), [2, 1]);
//! # Ok::<(), neural_svh::NeuralSvhError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! svh_core (pure voxel math)
//!     │
//!     ▼
//! neural_svh
//!   grid ──────► nn::encoder ──► MultiscaleFeatures ──► nn::decoder
//!   (FeatureGrid)  (per depth)     (depth -> codes)       (field values)
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `ndarray` (default): CPU backend using ndarray
//! - `wgpu`: GPU acceleration via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod nn;

// Re-export key types for convenience
pub use config::{MultiscaleDecoderConfig, PointEncoderConfig, VoxelGridConfig};
pub use error::{NeuralSvhError, Result};
pub use grid::{FeatureGrid, MultiscaleFeatures, SparseFeatureHierarchy, SparseVoxelGrid};
pub use nn::{Aggregation, MultiscalePointDecoder, PointEncoder};

// Re-export from svh_core for convenience
pub use svh_core::{Point3, VoxelCoord};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        MultiscaleDecoderConfig, PointEncoderConfig, ResnetBlockConfig, VoxelGridConfig,
    };
    pub use crate::data::{points_from_tensor, points_to_tensor, PointCloud};
    pub use crate::error::{NeuralSvhError, Result};
    pub use crate::grid::{
        cell_offset_tensor, FeatureGrid, MultiscaleFeatures, SparseFeatureHierarchy,
        SparseVoxelGrid,
    };
    pub use crate::nn::{
        scatter_max, scatter_mean, Aggregation, MultiscalePointDecoder, PointEncoder,
        ResnetBlock, VoxelAssignment,
    };

    pub use svh_core::{Point3, VoxelCoord};
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::prelude::*;

    type TestBackend = Autodiff<NdArray>;

    fn sphere(n: usize, radius: f32) -> Vec<Point3> {
        let mut points = Vec::with_capacity(n * n);
        for i in 0..n {
            let theta = (i as f32 / n as f32) * std::f32::consts::PI * 2.0;
            for j in 0..n {
                let phi = (j as f32 / n as f32) * std::f32::consts::PI;
                points.push(Point3::new(
                    phi.sin() * theta.cos() * radius,
                    phi.sin() * theta.sin() * radius,
                    phi.cos() * radius,
                ));
            }
        }
        points
    }

    #[test]
    fn test_public_api() {
        let _encoder = PointEncoderConfig::new(3);
        let _decoder = MultiscaleDecoderConfig::new();
        let _grid = VoxelGridConfig::new(0.05);
        assert_eq!(Aggregation::default(), Aggregation::Concatenate);
    }

    #[test]
    fn test_sphere_pipeline() {
        let device = Default::default();
        let points = sphere(20, 0.3);
        let svh =
            SparseFeatureHierarchy::from_points(&VoxelGridConfig::new(0.05), &points, 3).unwrap();

        let encoder: PointEncoder<TestBackend> = PointEncoderConfig::new(3)
            .with_c_dim(16)
            .init(&device)
            .unwrap();
        let decoder: MultiscalePointDecoder<TestBackend> = MultiscaleDecoderConfig::new()
            .with_multiscale_depths(3)
            .init(&device)
            .unwrap();

        let xyz = data::points_to_tensor::<TestBackend>(&points, &device);
        let codes = encoder
            .encode_hierarchy(xyz.clone(), None, &svh, &svh.present_depths())
            .unwrap();
        assert_eq!(codes.len(), 3);

        let out = decoder.decode(xyz, &svh, &codes).unwrap();
        assert_eq!(out.dims(), [points.len(), 1]);

        let values: Vec<f32> = out.to_data().to_vec().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }
}
