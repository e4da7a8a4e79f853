//! Coordinate mathematics for a single hierarchy depth.
//!
//! World space and grid space are related by an origin (the world-space centre
//! of voxel `(0, 0, 0)`) and a per-axis voxel size. In grid space voxel centres
//! sit on integer coordinates.

use crate::error::SvhCoreError;
use crate::types::{Point3, VoxelCoord};

/// Transform a world-space point into continuous grid coordinates.
///
/// # Example
/// ```
/// use svh_core::coords::world_to_grid;
/// use svh_core::types::Point3;
///
/// let g = world_to_grid(Point3::new(0.35, 0.0, -0.05), Point3::splat(0.05), Point3::splat(0.1));
/// assert!((g.x - 3.0).abs() < 1e-5);
/// assert!((g.z + 1.0).abs() < 1e-5);
/// ```
#[inline]
pub fn world_to_grid(point: Point3, origin: Point3, voxel_size: Point3) -> Point3 {
    (point - origin).div_elem(voxel_size)
}

/// Transform continuous grid coordinates back into world space.
#[inline]
pub fn grid_to_world(grid_point: Point3, origin: Point3, voxel_size: Point3) -> Point3 {
    grid_point.mul_elem(voxel_size) + origin
}

/// Round a grid-space point to the voxel whose centre is nearest.
///
/// Ties round to the even integer, the same convention as tensor `round`.
#[inline]
pub fn nearest_voxel(grid_point: Point3) -> VoxelCoord {
    VoxelCoord::new(
        libm::rintf(grid_point.x) as i32,
        libm::rintf(grid_point.y) as i32,
        libm::rintf(grid_point.z) as i32,
    )
}

/// Floor-modulo: the result has the sign of `m` (for positive `m`, lies in `[0, m)`).
#[inline]
pub fn floor_mod(v: f32, m: f32) -> f32 {
    v - libm::floorf(v / m) * m
}

/// Fold a grid coordinate into the unit cell of its nearest voxel: `(v + 0.5) mod 1`.
///
/// A point at a voxel centre maps to `0.5`; the voxel faces map to `0` / `1`.
/// Negative coordinates fold the same way as positive ones.
#[inline]
pub fn fold_to_unit_cell(v: f32) -> f32 {
    let shifted = v + 0.5;
    shifted - libm::floorf(shifted)
}

/// [`fold_to_unit_cell`] applied to each component.
#[inline]
pub fn fold_point_to_unit_cell(grid_point: Point3) -> Point3 {
    Point3::new(
        fold_to_unit_cell(grid_point.x),
        fold_to_unit_cell(grid_point.y),
        fold_to_unit_cell(grid_point.z),
    )
}

/// Position of `x` inside its voxel of size `voxel_size`, in `[-0.5, 0.5)`.
///
/// Computed as `(x mod s) / s - 0.5`, so it is periodic in `x` with period `s`.
#[inline]
pub fn cell_offset(x: f32, voxel_size: f32) -> f32 {
    floor_mod(x, voxel_size) / voxel_size - 0.5
}

/// [`cell_offset`] applied to each component with a per-axis voxel size.
#[inline]
pub fn cell_offset_point(point: Point3, voxel_size: Point3) -> Point3 {
    Point3::new(
        cell_offset(point.x, voxel_size.x),
        cell_offset(point.y, voxel_size.y),
        cell_offset(point.z, voxel_size.z),
    )
}

/// Split a grid-space point into the lower corner voxel of its trilinear stencil
/// and the fractional position inside the stencil, in `[0, 1)^3`.
#[inline]
pub fn trilinear_base(grid_point: Point3) -> (VoxelCoord, [f32; 3]) {
    let base = grid_point.floor();
    let frac = grid_point - base;
    (
        VoxelCoord::new(base.x as i32, base.y as i32, base.z as i32),
        frac.as_array(),
    )
}

/// Check that a per-axis voxel size is finite and strictly positive.
pub fn validate_voxel_size(voxel_size: Point3) -> Result<(), SvhCoreError> {
    for value in voxel_size.as_array() {
        if !value.is_finite() || value <= 0.0 {
            return Err(SvhCoreError::InvalidVoxelSize { value });
        }
    }
    Ok(())
}
