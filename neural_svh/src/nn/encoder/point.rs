//! Point-to-voxel encoder with per-voxel max pooling.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;

use svh_core::{nearest_voxel, VoxelCoord};

use crate::config::PointEncoderConfig;
use crate::data::points_from_tensor;
use crate::error::{NeuralSvhError, Result};
use crate::grid::{FeatureGrid, MultiscaleFeatures, SparseFeatureHierarchy};
use crate::nn::resnet::{ResnetBlock, ResnetBlockConfig};
use crate::nn::scatter::{scatter_max, scatter_mean, VoxelAssignment};

/// PointNet-style encoder producing one latent code per active voxel.
///
/// Each point is routed to its nearest active voxel. Point features pass through
/// a stack of residual blocks; before every block after the first, each point
/// sees the max-pool of all points sharing its voxel. The final per-point codes
/// are averaged per voxel.
#[derive(Module, Debug)]
pub struct PointEncoder<B: Backend> {
    /// Projection of the local coordinate (+ point feature) to twice the hidden width.
    fc_pos: Linear<B>,
    /// Residual blocks, each `2 * hidden_dim -> hidden_dim`.
    blocks: Vec<ResnetBlock<B>>,
    /// Projection to the code width.
    fc_c: Linear<B>,
    #[module(skip)]
    dim: usize,
    #[module(skip)]
    c_dim: usize,
    #[module(skip)]
    hidden_dim: usize,
}

impl<B: Backend> PointEncoder<B> {
    /// Create a new encoder from configuration.
    pub fn new(config: &PointEncoderConfig, device: &B::Device) -> Result<Self> {
        config.validate()?;

        let hidden = config.hidden_dim;
        let fc_pos = LinearConfig::new(config.dim, 2 * hidden).init(device);
        let blocks = (0..config.n_blocks)
            .map(|_| {
                ResnetBlockConfig::new(2 * hidden)
                    .with_size_out(Some(hidden))
                    .init(device)
            })
            .collect();
        let fc_c = LinearConfig::new(hidden, config.c_dim).init(device);

        Ok(Self {
            fc_pos,
            blocks,
            fc_c,
            dim: config.dim,
            c_dim: config.c_dim,
            hidden_dim: hidden,
        })
    }

    /// Encode a point set into the voxels of one hierarchy depth.
    ///
    /// Points whose nearest voxel is not active, or whose position is not finite,
    /// are dropped before any pooling.
    /// Voxels that receive no point get a zero code.
    ///
    /// Input shapes: xyz [N, 3] in world space, features [N, dim - 3]
    /// Output shape: [num_voxels, c_dim]
    pub fn encode<G: FeatureGrid<B>>(
        &self,
        xyz: Tensor<B, 2>,
        features: Option<Tensor<B, 2>>,
        svh: &SparseFeatureHierarchy<G>,
        depth: usize,
    ) -> Result<Tensor<B, 2>> {
        let grid = svh
            .grid(depth)
            .ok_or(NeuralSvhError::GridNotBuilt { depth })?;
        self.check_inputs(&xyz, features.as_ref())?;

        let device = xyz.device();
        let num_voxels = grid.num_voxels();

        let local = grid.world_to_grid(xyz);
        let grid_points = points_from_tensor(local.clone())?;
        let ijk: Vec<VoxelCoord> = grid_points.iter().copied().map(nearest_voxel).collect();

        // Non-finite positions have no voxel
        let lookup: Vec<Option<usize>> = grid
            .ijk_to_index(&ijk)
            .into_iter()
            .zip(&grid_points)
            .map(|(row, p)| row.filter(|_| p.is_finite()))
            .collect();
        let assignment = VoxelAssignment::from_lookup(&lookup, num_voxels)?;

        log::debug!(
            "depth {}: {} of {} points routed to {} voxels ({} dropped)",
            depth,
            assignment.num_kept(),
            assignment.num_points(),
            num_voxels,
            assignment.num_dropped()
        );
        if assignment.is_empty() {
            log::warn!(
                "depth {}: no point falls in an active voxel, codes are all zero",
                depth
            );
            return Ok(Tensor::zeros([num_voxels, self.c_dim], &device));
        }

        // Fold into the unit cell of the nearest voxel
        let shifted = assignment.select_kept(local)? + 0.5;
        let frac = shifted.clone() - shifted.floor();

        let input = match features {
            Some(features) => Tensor::cat(vec![frac, assignment.select_kept(features)?], 1),
            None => frac,
        };

        let voxel_ids = assignment.voxel_index_tensor(&device);
        let mut net = self.fc_pos.forward(input);
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                let pooled = scatter_max(net.clone(), &assignment)?.select(0, voxel_ids.clone());
                net = Tensor::cat(vec![net, pooled], 1);
            }
            net = block.forward(net);
        }

        scatter_mean(self.fc_c.forward(net), &assignment)
    }

    /// Encode the same point set at each of `depths`.
    pub fn encode_hierarchy<G: FeatureGrid<B>>(
        &self,
        xyz: Tensor<B, 2>,
        features: Option<Tensor<B, 2>>,
        svh: &SparseFeatureHierarchy<G>,
        depths: &[usize],
    ) -> Result<MultiscaleFeatures<B>> {
        depths
            .iter()
            .map(|&depth| {
                self.encode(xyz.clone(), features.clone(), svh, depth)
                    .map(|codes| (depth, codes))
            })
            .collect()
    }

    fn check_inputs(&self, xyz: &Tensor<B, 2>, features: Option<&Tensor<B, 2>>) -> Result<()> {
        let [n, dim] = xyz.dims();
        if dim != 3 {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![n, 3],
                got: vec![n, dim],
            });
        }

        let feature_dim = self.dim - 3;
        match features {
            Some(f) if f.dims() != [n, feature_dim] => Err(NeuralSvhError::ShapeMismatch {
                expected: vec![n, feature_dim],
                got: f.dims().to_vec(),
            }),
            None if feature_dim != 0 => Err(NeuralSvhError::ShapeMismatch {
                expected: vec![n, feature_dim],
                got: vec![n, 0],
            }),
            _ => Ok(()),
        }
    }

    /// Width of the per-point input (3 + feature width).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Width of the per-voxel code.
    pub fn c_dim(&self) -> usize {
        self.c_dim
    }

    /// Hidden width of the residual blocks.
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Number of residual blocks.
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }
}
