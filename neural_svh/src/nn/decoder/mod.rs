//! Decoder mapping per-depth voxel codes to field values at query points.

mod aggregation;
mod multiscale;

pub use aggregation::Aggregation;
pub use multiscale::MultiscalePointDecoder;
