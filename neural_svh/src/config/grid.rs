//! Reference voxel grid configuration.

use burn::config::Config;
use svh_core::{validate_voxel_size, Point3};

use crate::error::Result as SvhResult;

/// Configuration for one depth of the reference [`SparseVoxelGrid`](crate::grid::SparseVoxelGrid).
#[derive(Config, Debug)]
pub struct VoxelGridConfig {
    /// Edge length of a voxel in world units.
    pub voxel_size: f32,

    /// World-space centre of voxel `(0, 0, 0)`. Defaults to half a voxel, so that
    /// voxel `(0, 0, 0)` spans `[0, voxel_size)^3`.
    pub origin: Option<[f32; 3]>,

    /// Number of voxel rings activated around each input point by `from_points`.
    #[config(default = 0)]
    pub dilation: u32,
}

impl VoxelGridConfig {
    /// Per-axis voxel size.
    #[inline]
    pub fn voxel_size_point(&self) -> Point3 {
        Point3::splat(self.voxel_size)
    }

    /// Resolved origin.
    #[inline]
    pub fn origin_point(&self) -> Point3 {
        match self.origin {
            Some(origin) => Point3::from(origin),
            None => Point3::splat(self.voxel_size * 0.5),
        }
    }

    /// Configuration for the depth `levels` steps coarser (voxel size doubled per level).
    ///
    /// An explicit origin is kept; the default origin follows the new voxel size.
    pub fn coarsened(&self, levels: u32) -> Self {
        let scale = (1u32 << levels) as f32;
        Self {
            voxel_size: self.voxel_size * scale,
            ..self.clone()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SvhResult<()> {
        validate_voxel_size(self.voxel_size_point())?;
        Ok(())
    }
}
