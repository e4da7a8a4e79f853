//! Encoder turning point sets into per-voxel latent codes.

mod point;

pub use point::PointEncoder;
