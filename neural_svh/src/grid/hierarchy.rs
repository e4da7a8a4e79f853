//! Per-depth containers for grids and latent code tensors.

use std::collections::BTreeMap;

use burn::prelude::*;

/// A sparse voxel hierarchy: one optional grid per depth, depth 0 finest.
///
/// A depth without a grid is absent; consumers substitute a zero contribution
/// for it instead of probing for null grids.
#[derive(Debug, Clone)]
pub struct SparseFeatureHierarchy<G> {
    grids: Vec<Option<G>>,
}

impl<G> SparseFeatureHierarchy<G> {
    /// Create a hierarchy from per-depth grids.
    pub fn new(grids: Vec<Option<G>>) -> Self {
        Self { grids }
    }

    /// Create a hierarchy with `num_depths` absent depths.
    pub fn with_depths(num_depths: usize) -> Self {
        Self {
            grids: (0..num_depths).map(|_| None).collect(),
        }
    }

    /// Number of depths, present or absent.
    pub fn num_depths(&self) -> usize {
        self.grids.len()
    }

    /// The grid at `depth`, if one is built. Depths past the end are absent.
    pub fn grid(&self, depth: usize) -> Option<&G> {
        self.grids.get(depth).and_then(Option::as_ref)
    }

    /// Whether a grid is built at `depth`.
    pub fn has_grid(&self, depth: usize) -> bool {
        self.grid(depth).is_some()
    }

    /// Install a grid at `depth`, growing the hierarchy if needed.
    ///
    /// Returns the grid previously stored there.
    pub fn set_grid(&mut self, depth: usize, grid: G) -> Option<G> {
        if depth >= self.grids.len() {
            self.grids.resize_with(depth + 1, || None);
        }
        self.grids[depth].replace(grid)
    }

    /// Remove the grid at `depth`, leaving the depth absent.
    pub fn remove_grid(&mut self, depth: usize) -> Option<G> {
        self.grids.get_mut(depth).and_then(Option::take)
    }

    /// Depths that have a grid, in increasing order.
    pub fn present_depths(&self) -> Vec<usize> {
        self.grids
            .iter()
            .enumerate()
            .filter_map(|(depth, grid)| grid.as_ref().map(|_| depth))
            .collect()
    }
}

impl<G> FromIterator<Option<G>> for SparseFeatureHierarchy<G> {
    fn from_iter<I: IntoIterator<Item = Option<G>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Latent code tensors keyed by hierarchy depth.
///
/// Each tensor has shape [num_voxels_at_depth, C]. Created per forward pass and
/// handed from the encoding stage to the decoder.
#[derive(Debug, Clone)]
pub struct MultiscaleFeatures<B: Backend> {
    features: BTreeMap<usize, Tensor<B, 2>>,
}

impl<B: Backend> MultiscaleFeatures<B> {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self {
            features: BTreeMap::new(),
        }
    }

    /// Store the codes of `depth`, returning any previous tensor.
    pub fn insert(&mut self, depth: usize, features: Tensor<B, 2>) -> Option<Tensor<B, 2>> {
        self.features.insert(depth, features)
    }

    /// The codes of `depth`.
    pub fn get(&self, depth: usize) -> Option<&Tensor<B, 2>> {
        self.features.get(&depth)
    }

    /// Depths with codes, in increasing order.
    pub fn depths(&self) -> Vec<usize> {
        self.features.keys().copied().collect()
    }

    /// Number of depths with codes.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no depth has codes.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate over `(depth, codes)` in increasing depth order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Tensor<B, 2>)> {
        self.features.iter().map(|(depth, features)| (*depth, features))
    }
}

impl<B: Backend> Default for MultiscaleFeatures<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> FromIterator<(usize, Tensor<B, 2>)> for MultiscaleFeatures<B> {
    fn from_iter<I: IntoIterator<Item = (usize, Tensor<B, 2>)>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_hierarchy_presence() {
        let mut svh = SparseFeatureHierarchy::new(vec![Some("d0"), None, Some("d2")]);

        assert_eq!(svh.num_depths(), 3);
        assert!(svh.has_grid(0));
        assert!(!svh.has_grid(1));
        assert!(!svh.has_grid(7));
        assert_eq!(svh.present_depths(), vec![0, 2]);

        assert_eq!(svh.set_grid(4, "d4"), None);
        assert_eq!(svh.num_depths(), 5);
        assert_eq!(svh.grid(4), Some(&"d4"));

        assert_eq!(svh.remove_grid(0), Some("d0"));
        assert_eq!(svh.present_depths(), vec![2, 4]);
    }

    #[test]
    fn test_empty_hierarchy() {
        let svh = SparseFeatureHierarchy::<u8>::with_depths(3);
        assert_eq!(svh.num_depths(), 3);
        assert!(svh.present_depths().is_empty());
    }

    #[test]
    fn test_multiscale_features() {
        let device = Default::default();
        let mut feats = MultiscaleFeatures::<TestBackend>::new();
        assert!(feats.is_empty());

        feats.insert(2, Tensor::zeros([4, 8], &device));
        feats.insert(0, Tensor::ones([9, 8], &device));

        assert_eq!(feats.len(), 2);
        assert_eq!(feats.depths(), vec![0, 2]);
        assert_eq!(feats.get(0).map(|t| t.dims()), Some([9, 8]));
        assert!(feats.get(1).is_none());
    }
}
