//! Configuration types for neural_svh.
//!
//! This module provides Burn-style configuration structs for the residual block,
//! the encoder, the decoder and the reference voxel grid. All of them serialize to JSON through
//! Burn's `Config` trait.

mod grid;
mod network;

pub use grid::VoxelGridConfig;
pub use network::{MultiscaleDecoderConfig, PointEncoderConfig};
pub use crate::nn::resnet::ResnetBlockConfig;
