//! # svh_core
//!
//! Pure coordinate mathematics for sparse voxel hierarchies.
//!
//! This crate holds the tensor-free half of the neural surface pipeline: how world
//! points map onto the voxels of one hierarchy depth, how they fold into their
//! voxel's unit cell, and how trilinear stencils are weighted. `neural_svh`
//! builds its encoder, decoder and reference grid on top of it.
//!
//! ## Features
//!
//! - **no_std compatible**: only `libm` is required
//! - **Pure algorithms**: no storage, no tensors
//! - **Tensor-compatible conventions**: rounding ties to even and floor-modulo,
//!   matching the batched tensor ops used downstream
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables standard library support (`std::error::Error`)
//!
//! ## Modules
//!
//! - [`types`]: Core data types (Point3, VoxelCoord, CORNER_OFFSETS)
//! - [`coords`]: World/grid transforms, voxel rounding, unit-cell folding
//! - [`interpolation`]: Trilinear stencil weights
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```
//! use svh_core::prelude::*;
//!
//! let origin = Point3::splat(0.05);
//! let voxel_size = Point3::splat(0.1);
//!
//! let g = world_to_grid(Point3::new(0.32, 0.11, 0.02), origin, voxel_size);
//! let voxel = nearest_voxel(g);
//! assert_eq!(voxel, VoxelCoord::new(3, 1, 0));
//!
//! let local = fold_point_to_unit_cell(g);
//! assert!(local.x >= 0.0 && local.x < 1.0);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

pub mod coords;
pub mod error;
pub mod interpolation;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::coords::{
        cell_offset, cell_offset_point, floor_mod, fold_point_to_unit_cell, fold_to_unit_cell,
        grid_to_world, nearest_voxel, trilinear_base, validate_voxel_size, world_to_grid,
    };
    pub use crate::error::SvhCoreError;
    pub use crate::interpolation::{compute_trilinear_weights, trilinear_interpolate};
    pub use crate::types::{Point3, VoxelCoord, CORNER_OFFSETS};
}

pub use coords::{
    cell_offset, cell_offset_point, floor_mod, fold_point_to_unit_cell, fold_to_unit_cell,
    grid_to_world, nearest_voxel, trilinear_base, validate_voxel_size, world_to_grid,
};
pub use error::SvhCoreError;
pub use interpolation::{compute_trilinear_weights, trilinear_interpolate};
pub use types::{Point3, VoxelCoord, CORNER_OFFSETS};
