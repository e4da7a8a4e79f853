//! The per-depth grid interface consumed by the encoder and decoder.

use burn::prelude::*;
use burn::tensor::TensorData;

use svh_core::{Point3, VoxelCoord};

use crate::error::Result;

/// One depth of a sparse voxel hierarchy.
///
/// Implementors own voxel membership and spatial indexing. Active voxels are
/// numbered densely in `[0, num_voxels)`; a per-voxel feature tensor has one row
/// per active voxel in that order.
pub trait FeatureGrid<B: Backend> {
    /// Transform world positions into continuous grid coordinates, in which voxel
    /// centres sit on integers.
    ///
    /// Input shape: [N, 3]
    /// Output shape: [N, 3]
    fn world_to_grid(&self, xyz: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Dense row of each voxel coordinate, or `None` if the voxel is not active.
    fn ijk_to_index(&self, ijk: &[VoxelCoord]) -> Vec<Option<usize>>;

    /// Number of active voxels.
    fn num_voxels(&self) -> usize;

    /// Per-axis voxel edge length in world units.
    fn voxel_size(&self) -> Point3;

    /// Trilinearly interpolate a per-voxel feature field at world positions.
    ///
    /// Input shapes: xyz [M, 3], features [num_voxels, C]
    /// Output shape: [M, C]
    fn sample_trilinear(&self, xyz: Tensor<B, 2>, features: Tensor<B, 2>) -> Result<Tensor<B, 2>>;
}

/// Position of each query inside its voxel of the given size, in `[-0.5, 0.5)^3`.
///
/// Computed as `(xyz mod s) / s - 0.5` per axis; periodic in each axis with the
/// voxel size as period.
///
/// Input shape: [M, 3]
/// Output shape: [M, 3]
pub fn cell_offset_tensor<B: Backend>(xyz: Tensor<B, 2>, voxel_size: Point3) -> Tensor<B, 2> {
    let device = xyz.device();
    let voxel_size = Tensor::<B, 2>::from_data(
        TensorData::new(voxel_size.as_array().to_vec(), [1, 3]),
        &device,
    );

    let scaled = xyz / voxel_size;
    let frac = scaled.clone() - scaled.floor();
    frac - 0.5
}
