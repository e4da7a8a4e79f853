//! Neural network modules for sparse voxel hierarchies.
//!
//! This module provides:
//! - [`PointEncoder`]: point positions (+ features) to per-voxel latent codes at one depth
//! - [`MultiscalePointDecoder`]: per-depth latent codes to field values at query points
//! - [`ResnetBlock`]: the residual building block shared by both
//! - [`scatter`]: the grouped reductions the encoder pools with

pub mod decoder;
pub mod encoder;
pub mod resnet;
pub mod scatter;

pub use decoder::{Aggregation, MultiscalePointDecoder};
pub use encoder::PointEncoder;
pub use resnet::{ResnetBlock, ResnetBlockConfig};
pub use scatter::{scatter_max, scatter_mean, VoxelAssignment};
