//! A hash-indexed reference implementation of [`FeatureGrid`].

use std::collections::HashMap;

use burn::prelude::*;
use burn::tensor::TensorData;

use svh_core::{
    compute_trilinear_weights, nearest_voxel, trilinear_base, world_to_grid, Point3, VoxelCoord,
    CORNER_OFFSETS,
};

use crate::config::VoxelGridConfig;
use crate::data::points_from_tensor;
use crate::error::{NeuralSvhError, Result};
use crate::grid::{FeatureGrid, SparseFeatureHierarchy};

/// One depth of a sparse voxel hierarchy backed by a coordinate hash map.
///
/// Voxel rows are assigned in insertion order, so building the same grid from
/// the same input always yields the same numbering.
#[derive(Debug, Clone)]
pub struct SparseVoxelGrid {
    voxel_size: Point3,
    origin: Point3,
    index: HashMap<VoxelCoord, usize>,
    coords: Vec<VoxelCoord>,
    dilation: u32,
}

impl SparseVoxelGrid {
    /// Create an empty grid.
    pub fn new(config: &VoxelGridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            voxel_size: config.voxel_size_point(),
            origin: config.origin_point(),
            index: HashMap::new(),
            coords: Vec::new(),
            dilation: config.dilation,
        })
    }

    /// Create a grid with the given active voxels. Duplicates collapse onto the
    /// first occurrence.
    pub fn from_coords<I>(config: &VoxelGridConfig, coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = VoxelCoord>,
    {
        let mut grid = Self::new(config)?;
        for coord in coords {
            grid.insert(coord);
        }
        Ok(grid)
    }

    /// Create a grid activating the voxel nearest each point, plus `dilation`
    /// rings of neighbours around it.
    pub fn from_points(config: &VoxelGridConfig, points: &[Point3]) -> Result<Self> {
        let mut grid = Self::new(config)?;
        let d = grid.dilation as i32;

        for point in points {
            if !point.is_finite() {
                log::warn!("skipping non-finite point {:?}", point);
                continue;
            }
            let centre = nearest_voxel(world_to_grid(*point, grid.origin, grid.voxel_size));
            for dz in -d..=d {
                for dy in -d..=d {
                    for dx in -d..=d {
                        grid.insert(centre.offset([dx, dy, dz]));
                    }
                }
            }
        }

        log::debug!(
            "built voxel grid: {} voxels of size {:?} from {} points",
            grid.coords.len(),
            grid.voxel_size,
            points.len()
        );
        Ok(grid)
    }

    /// Activate a voxel and return its row. Already active voxels keep their row.
    pub fn insert(&mut self, coord: VoxelCoord) -> usize {
        if let Some(&row) = self.index.get(&coord) {
            return row;
        }
        let row = self.coords.len();
        self.index.insert(coord, row);
        self.coords.push(coord);
        row
    }

    /// Whether a voxel is active.
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.index.contains_key(&coord)
    }

    /// Row of an active voxel.
    pub fn index_of(&self, coord: VoxelCoord) -> Option<usize> {
        self.index.get(&coord).copied()
    }

    /// Active voxels in row order.
    pub fn coords(&self) -> &[VoxelCoord] {
        &self.coords
    }

    /// World-space centre of voxel `(0, 0, 0)`.
    pub fn origin(&self) -> Point3 {
        self.origin
    }
}

impl SparseFeatureHierarchy<SparseVoxelGrid> {
    /// Build `num_depths` grids over the same points, depth 0 at `config`'s voxel
    /// size and each following depth twice as coarse.
    pub fn from_points(
        config: &VoxelGridConfig,
        points: &[Point3],
        num_depths: usize,
    ) -> Result<Self> {
        (0..num_depths)
            .map(|depth| {
                SparseVoxelGrid::from_points(&config.coarsened(depth as u32), points).map(Some)
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}

impl<B: Backend> FeatureGrid<B> for SparseVoxelGrid {
    fn world_to_grid(&self, xyz: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = xyz.device();
        let origin = Tensor::<B, 2>::from_data(
            TensorData::new(self.origin.as_array().to_vec(), [1, 3]),
            &device,
        );
        let voxel_size = Tensor::<B, 2>::from_data(
            TensorData::new(self.voxel_size.as_array().to_vec(), [1, 3]),
            &device,
        );
        (xyz - origin) / voxel_size
    }

    fn ijk_to_index(&self, ijk: &[VoxelCoord]) -> Vec<Option<usize>> {
        ijk.iter().map(|coord| self.index_of(*coord)).collect()
    }

    fn num_voxels(&self) -> usize {
        self.coords.len()
    }

    fn voxel_size(&self) -> Point3 {
        self.voxel_size
    }

    /// Corners of the stencil that are not active contribute zero; the remaining
    /// weights are not renormalised.
    fn sample_trilinear(&self, xyz: Tensor<B, 2>, features: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let [num_points, dim] = xyz.dims();
        if dim != 3 {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![num_points, 3],
                got: vec![num_points, dim],
            });
        }
        let [rows, channels] = features.dims();
        if rows != self.coords.len() {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![self.coords.len(), channels],
                got: vec![rows, channels],
            });
        }

        let device = features.device();
        if num_points == 0 || rows == 0 || channels == 0 {
            return Ok(Tensor::zeros([num_points, channels], &device));
        }

        let points = points_from_tensor(xyz)?;

        // CPU-side stencil lookup; only the gather below touches the features
        let mut corner_indices = Vec::with_capacity(num_points * 8);
        let mut weights = Vec::with_capacity(num_points * 8);
        for point in &points {
            let (base, frac) = trilinear_base(world_to_grid(*point, self.origin, self.voxel_size));
            let corner_weights = compute_trilinear_weights(frac);

            for (offset, weight) in CORNER_OFFSETS.iter().zip(corner_weights) {
                match self.index_of(base.offset(*offset)) {
                    Some(row) => {
                        corner_indices.push(row as i64);
                        weights.push(weight);
                    }
                    None => {
                        corner_indices.push(0);
                        weights.push(0.0);
                    }
                }
            }
        }

        let indices = Tensor::<B, 1, Int>::from_data(
            TensorData::new(corner_indices, [num_points * 8]),
            &device,
        );
        let weights =
            Tensor::<B, 3>::from_data(TensorData::new(weights, [num_points, 8, 1]), &device);

        let corner_values: Tensor<B, 3> = features
            .select(0, indices)
            .reshape([num_points, 8, channels]);

        Ok((corner_values * weights)
            .sum_dim(1)
            .reshape([num_points, channels]))
    }
}
