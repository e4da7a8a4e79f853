//! Point cloud data structures and tensor conversion.

use burn::prelude::*;
use burn::tensor::TensorData;
use svh_core::Point3;

use crate::error::{NeuralSvhError, Result};

/// A point cloud with optional per-point feature vectors (normals, colours, ...).
#[derive(Debug, Clone)]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<Point3>,
    /// Row-major per-point features, `feature_dim` values per point.
    features: Option<Vec<f32>>,
    feature_dim: usize,
}

impl PointCloud {
    /// Create a new point cloud from points.
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            features: None,
            feature_dim: 0,
        }
    }

    /// Attach per-point features, `feature_dim` values per point in row-major order.
    pub fn with_features(mut self, features: Vec<f32>, feature_dim: usize) -> Result<Self> {
        if feature_dim == 0 || features.len() != self.points.len() * feature_dim {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![self.points.len(), feature_dim],
                got: vec![features.len()],
            });
        }
        self.features = Some(features);
        self.feature_dim = feature_dim;
        Ok(self)
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Width of the per-point features, 0 without features.
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Row-major per-point features.
    pub fn features(&self) -> Option<&[f32]> {
        self.features.as_deref()
    }

    /// Compute the bounding box.
    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }

    /// Positions as a [N, 3] tensor.
    pub fn positions_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        points_to_tensor(&self.points, device)
    }

    /// Features as a [N, F] tensor.
    pub fn features_tensor<B: Backend>(&self, device: &B::Device) -> Option<Tensor<B, 2>> {
        self.features.as_ref().map(|f| {
            Tensor::from_data(
                TensorData::new(f.clone(), [self.points.len(), self.feature_dim]),
                device,
            )
        })
    }
}

/// Stack points into a [N, 3] tensor.
pub fn points_to_tensor<B: Backend>(points: &[Point3], device: &B::Device) -> Tensor<B, 2> {
    let data: Vec<f32> = points.iter().flat_map(|p| p.as_array()).collect();
    Tensor::from_data(TensorData::new(data, [points.len(), 3]), device)
}

/// Read a [N, 3] tensor back to host points.
pub fn points_from_tensor<B: Backend>(xyz: Tensor<B, 2>) -> Result<Vec<Point3>> {
    let [n, dim] = xyz.dims();
    if dim != 3 {
        return Err(NeuralSvhError::ShapeMismatch {
            expected: vec![n, 3],
            got: vec![n, dim],
        });
    }
    let data = xyz
        .to_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| NeuralSvhError::InvalidData(format!("{:?}", e)))?;

    Ok(data
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}
