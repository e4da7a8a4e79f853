//! Sparse voxel hierarchy seam.
//!
//! The encoder and decoder only see the hierarchy through the [`FeatureGrid`]
//! trait and the [`SparseFeatureHierarchy`] container. [`SparseVoxelGrid`] is a
//! hash-map backed implementation used by the tests and demos.

mod feature_grid;
mod hierarchy;
mod sparse_grid;

pub use feature_grid::{cell_offset_tensor, FeatureGrid};
pub use hierarchy::{MultiscaleFeatures, SparseFeatureHierarchy};
pub use sparse_grid::SparseVoxelGrid;
