//! Grouped reductions of per-point rows into per-voxel rows.
//!
//! Points are routed to voxels once, through a [`VoxelAssignment`]. Points
//! without an active voxel are removed at that step, so the reductions below
//! only ever see valid voxel rows.

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::error::{NeuralSvhError, Result};

/// The validity mask and voxel routing of one point set at one depth.
///
/// Built from a voxel lookup (one `Option<usize>` per point). `kept_rows[i]` is
/// the original row of the i-th surviving point and `voxel_ids[i]` its voxel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelAssignment {
    kept_rows: Vec<usize>,
    voxel_ids: Vec<usize>,
    num_points: usize,
    num_voxels: usize,
}

impl VoxelAssignment {
    /// Build an assignment from a per-point voxel lookup.
    ///
    /// Fails if a lookup names a voxel row outside `[0, num_voxels)`.
    pub fn from_lookup(lookup: &[Option<usize>], num_voxels: usize) -> Result<Self> {
        let mut kept_rows = Vec::with_capacity(lookup.len());
        let mut voxel_ids = Vec::with_capacity(lookup.len());

        for (row, voxel) in lookup.iter().enumerate() {
            if let Some(voxel) = *voxel {
                if voxel >= num_voxels {
                    return Err(NeuralSvhError::InvalidData(format!(
                        "point {} mapped to voxel {} but the grid has {} voxels",
                        row, voxel, num_voxels
                    )));
                }
                kept_rows.push(row);
                voxel_ids.push(voxel);
            }
        }

        Ok(Self {
            kept_rows,
            voxel_ids,
            num_points: lookup.len(),
            num_voxels,
        })
    }

    /// Original rows of the surviving points.
    pub fn kept_rows(&self) -> &[usize] {
        &self.kept_rows
    }

    /// Voxel row of each surviving point.
    pub fn voxel_ids(&self) -> &[usize] {
        &self.voxel_ids
    }

    /// Number of points before masking.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Number of surviving points.
    pub fn num_kept(&self) -> usize {
        self.kept_rows.len()
    }

    /// Number of points without an active voxel.
    pub fn num_dropped(&self) -> usize {
        self.num_points - self.kept_rows.len()
    }

    /// Number of voxel rows in the output of a reduction.
    pub fn num_voxels(&self) -> usize {
        self.num_voxels
    }

    /// True when no point survived the mask.
    pub fn is_empty(&self) -> bool {
        self.kept_rows.is_empty()
    }

    /// Number of surviving points per voxel row.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_voxels];
        for &voxel in &self.voxel_ids {
            counts[voxel] += 1;
        }
        counts
    }

    /// Surviving rows as an index tensor.
    pub fn kept_index_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1, Int> {
        index_tensor(&self.kept_rows, device)
    }

    /// Voxel rows of the surviving points as an index tensor.
    pub fn voxel_index_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1, Int> {
        index_tensor(&self.voxel_ids, device)
    }

    /// Keep only the rows of surviving points.
    ///
    /// Input shape: [num_points, C]
    /// Output shape: [num_kept, C]
    pub fn select_kept<B: Backend>(&self, values: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let [rows, channels] = values.dims();
        if rows != self.num_points {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![self.num_points, channels],
                got: vec![rows, channels],
            });
        }
        let device = values.device();
        Ok(values.select(0, self.kept_index_tensor(&device)))
    }

    fn check_rows(&self, rows: usize, channels: usize) -> Result<()> {
        if rows != self.num_kept() {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![self.num_kept(), channels],
                got: vec![rows, channels],
            });
        }
        Ok(())
    }
}

fn index_tensor<B: Backend>(indices: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let data: Vec<i64> = indices.iter().map(|&i| i as i64).collect();
    let len = data.len();
    Tensor::from_data(TensorData::new(data, [len]), device)
}

/// Per-voxel, per-channel maximum of the surviving point rows.
///
/// Input shape: [num_kept, C]
/// Output shape: [num_voxels, C]; voxels without points are zero.
///
/// The winning row of each (voxel, channel) is found on the host and gathered
/// back from `values`, so gradients reach exactly the maximal entries.
pub fn scatter_max<B: Backend>(
    values: Tensor<B, 2>,
    assignment: &VoxelAssignment,
) -> Result<Tensor<B, 2>> {
    let [rows, channels] = values.dims();
    assignment.check_rows(rows, channels)?;

    let device = values.device();
    let num_voxels = assignment.num_voxels();
    if rows == 0 || num_voxels == 0 || channels == 0 {
        return Ok(Tensor::zeros([num_voxels, channels], &device));
    }

    let data = values
        .to_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| NeuralSvhError::InvalidData(format!("{:?}", e)))?;

    let mut winner: Vec<Option<usize>> = vec![None; num_voxels * channels];
    for (row, &voxel) in assignment.voxel_ids().iter().enumerate() {
        for channel in 0..channels {
            let slot = &mut winner[voxel * channels + channel];
            let value = data[row * channels + channel];
            match *slot {
                Some(best) if data[best * channels + channel] >= value => {}
                _ => *slot = Some(row),
            }
        }
    }

    let mut flat_index = Vec::with_capacity(winner.len());
    let mut empty = Vec::with_capacity(winner.len());
    for (slot, row) in winner.iter().enumerate() {
        let channel = slot % channels;
        match row {
            Some(row) => {
                flat_index.push((row * channels + channel) as i64);
                empty.push(false);
            }
            None => {
                flat_index.push(0);
                empty.push(true);
            }
        }
    }

    let index = Tensor::<B, 1, Int>::from_data(
        TensorData::new(flat_index, [num_voxels * channels]),
        &device,
    );
    let empty = Tensor::<B, 2, Bool>::from_data(
        TensorData::new(empty, [num_voxels, channels]),
        &device,
    );

    let flat: Tensor<B, 1> = values.reshape([rows * channels]);
    let gathered: Tensor<B, 2> = flat.select(0, index).reshape([num_voxels, channels]);

    Ok(gathered.mask_fill(empty, 0.0))
}

/// Per-voxel mean of the surviving point rows.
///
/// Input shape: [num_kept, C]
/// Output shape: [num_voxels, C]; voxels without points are zero.
pub fn scatter_mean<B: Backend>(
    values: Tensor<B, 2>,
    assignment: &VoxelAssignment,
) -> Result<Tensor<B, 2>> {
    let [rows, channels] = values.dims();
    assignment.check_rows(rows, channels)?;

    let device = values.device();
    let num_voxels = assignment.num_voxels();
    if rows == 0 || num_voxels == 0 {
        return Ok(Tensor::zeros([num_voxels, channels], &device));
    }

    let sums = Tensor::<B, 2>::zeros([num_voxels, channels], &device).select_assign(
        0,
        assignment.voxel_index_tensor(&device),
        values,
    );

    let counts: Vec<f32> = assignment
        .counts()
        .into_iter()
        .map(|count| count.max(1) as f32)
        .collect();
    let counts = Tensor::<B, 2>::from_data(TensorData::new(counts, [num_voxels, 1]), &device);

    Ok(sums / counts)
}
