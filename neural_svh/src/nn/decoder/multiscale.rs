//! Multiscale point decoder.

use burn::module::{Ignored, Module, Param};
use burn::nn::{Initializer, Linear, LinearConfig, Relu};
use burn::prelude::*;

use crate::config::MultiscaleDecoderConfig;
use crate::error::{NeuralSvhError, Result};
use crate::grid::{cell_offset_tensor, FeatureGrid, MultiscaleFeatures, SparseFeatureHierarchy};
use crate::nn::decoder::Aggregation;
use crate::nn::resnet::{ResnetBlock, ResnetBlockConfig};

/// Decoder mapping query positions and per-depth voxel codes to field values.
///
/// Architecture:
/// 1. Positional feature: the query's offset inside its voxel at each of the
///    `coords_depths`, concatenated
/// 2. Multiscale feature: the codes of depths `0..multiscale_depths` sampled
///    trilinearly and aggregated (absent depths contribute zeros)
/// 3. `net = fc_p(pos)`, then per block `net = block(net + fc_c(feature))`
/// 4. `fc_out(relu(net))`
#[derive(Module, Debug)]
pub struct MultiscalePointDecoder<B: Backend> {
    /// Projection of the positional feature to the hidden width.
    pub fc_p: Linear<B>,
    /// Per-block projections of the multiscale feature.
    pub fc_c: Vec<Linear<B>>,
    /// Residual stack.
    pub blocks: Vec<ResnetBlock<B>>,
    /// Output layer.
    pub fc_out: Linear<B>,
    activation: Relu,
    #[module(skip)]
    aggregation: Ignored<Aggregation>,
    #[module(skip)]
    coords_depths: Vec<usize>,
    #[module(skip)]
    multiscale_depths: usize,
    #[module(skip)]
    c_each_dim: usize,
    #[module(skip)]
    c_dim: usize,
    #[module(skip)]
    out_dim: usize,
}

impl<B: Backend> MultiscalePointDecoder<B> {
    /// Create a decoder from configuration.
    ///
    /// Fails with [`NeuralSvhError::UnsupportedAggregation`] for an unknown
    /// aggregation mode, and [`NeuralSvhError::InvalidConfig`] for empty widths
    /// or depth lists.
    pub fn new(config: &MultiscaleDecoderConfig, device: &B::Device) -> Result<Self> {
        config.validate()?;

        let aggregation = config.aggregation_mode()?;
        let coords_depths = config.resolved_coords_depths();
        let c_dim = aggregation.feature_dim(config.c_each_dim, config.multiscale_depths);
        let hidden = config.hidden_size;

        let fc_p = LinearConfig::new(3 * coords_depths.len(), hidden).init(device);
        let fc_c = (0..config.n_blocks)
            .map(|_| LinearConfig::new(c_dim, hidden).init(device))
            .collect();
        let blocks = (0..config.n_blocks)
            .map(|_| ResnetBlockConfig::new(hidden).init(device))
            .collect();

        let fc_out = match config.out_init {
            Some(value) => {
                let mut fc_out = LinearConfig::new(hidden, config.out_dim)
                    .with_initializer(Initializer::Zeros)
                    .init(device);
                fc_out.bias = Some(Param::from_tensor(Tensor::full(
                    [config.out_dim],
                    value,
                    device,
                )));
                fc_out
            }
            None => LinearConfig::new(hidden, config.out_dim).init(device),
        };

        log::debug!(
            "multiscale decoder: {} depths ({}), coords depths {:?}, {} blocks of width {}",
            config.multiscale_depths,
            aggregation,
            coords_depths,
            config.n_blocks,
            hidden
        );

        Ok(Self {
            fc_p,
            fc_c,
            blocks,
            fc_out,
            activation: Relu::new(),
            aggregation: Ignored(aggregation),
            coords_depths,
            multiscale_depths: config.multiscale_depths,
            c_each_dim: config.c_each_dim,
            c_dim,
            out_dim: config.out_dim,
        })
    }

    /// Offset of each query inside its voxel at every positional depth.
    ///
    /// Input shape: [M, 3]
    /// Output shape: [M, 3 * coords_depths.len()]
    pub fn positional_encoding<G: FeatureGrid<B>>(
        &self,
        xyz: Tensor<B, 2>,
        svh: &SparseFeatureHierarchy<G>,
    ) -> Result<Tensor<B, 2>> {
        let offsets = self
            .coords_depths
            .iter()
            .map(|&depth| {
                let grid = svh
                    .grid(depth)
                    .ok_or(NeuralSvhError::GridNotBuilt { depth })?;
                Ok(cell_offset_tensor(xyz.clone(), grid.voxel_size()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Tensor::cat(offsets, 1))
    }

    /// Sample every feature depth at the queries and aggregate across depths.
    ///
    /// Input shape: [M, 3]
    /// Output shape: [M, c_dim]
    pub fn multiscale_feature<G: FeatureGrid<B>>(
        &self,
        xyz: Tensor<B, 2>,
        svh: &SparseFeatureHierarchy<G>,
        features: &MultiscaleFeatures<B>,
    ) -> Result<Tensor<B, 2>> {
        let [num_queries, _] = xyz.dims();
        let device = xyz.device();

        let mut sampled = Vec::with_capacity(self.multiscale_depths);
        for depth in 0..self.multiscale_depths {
            let Some(grid) = svh.grid(depth) else {
                log::debug!("depth {} has no grid, sampling zeros", depth);
                sampled.push(Tensor::zeros([num_queries, self.c_each_dim], &device));
                continue;
            };

            let codes = features
                .get(depth)
                .ok_or(NeuralSvhError::MissingFeatures { depth })?;
            let [rows, width] = codes.dims();
            if width != self.c_each_dim {
                return Err(NeuralSvhError::ShapeMismatch {
                    expected: vec![rows, self.c_each_dim],
                    got: vec![rows, width],
                });
            }

            sampled.push(grid.sample_trilinear(xyz.clone(), codes.clone())?);
        }

        self.aggregation.0.aggregate(sampled)
    }

    /// Decode field values at world-space query positions.
    ///
    /// Input shape: [M, 3]
    /// Output shape: [M, out_dim]
    pub fn decode<G: FeatureGrid<B>>(
        &self,
        xyz: Tensor<B, 2>,
        svh: &SparseFeatureHierarchy<G>,
        features: &MultiscaleFeatures<B>,
    ) -> Result<Tensor<B, 2>> {
        let [num_queries, dim] = xyz.dims();
        if dim != 3 {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![num_queries, 3],
                got: vec![num_queries, dim],
            });
        }

        let p = self.positional_encoding(xyz.clone(), svh)?;
        if num_queries == 0 {
            return Ok(Tensor::zeros([0, self.out_dim], &xyz.device()));
        }
        let c = self.multiscale_feature(xyz, svh, features)?;

        let mut net = self.fc_p.forward(p);
        for (fc_c, block) in self.fc_c.iter().zip(&self.blocks) {
            net = block.forward(net + fc_c.forward(c.clone()));
        }

        Ok(self.fc_out.forward(self.activation.forward(net)))
    }

    /// Cross-depth aggregation mode.
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation.0
    }

    /// Depths used for the positional feature, sorted.
    pub fn coords_depths(&self) -> &[usize] {
        &self.coords_depths
    }

    /// Number of depths sampled for features.
    pub fn multiscale_depths(&self) -> usize {
        self.multiscale_depths
    }

    /// Width of the aggregated multiscale feature.
    pub fn c_dim(&self) -> usize {
        self.c_dim
    }

    /// Width of the output.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Number of residual blocks.
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }
}
