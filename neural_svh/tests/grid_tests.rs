//! Integration tests for the grid seam and the reference sparse grid.

use burn::backend::NdArray;
use burn::prelude::*;
use burn::tensor::TensorData;
use proptest::prelude::*;

use neural_svh::{
    config::{MultiscaleDecoderConfig, PointEncoderConfig, VoxelGridConfig},
    data::{points_from_tensor, points_to_tensor},
    grid::{FeatureGrid, SparseFeatureHierarchy, SparseVoxelGrid},
    nn::{MultiscalePointDecoder, PointEncoder},
    NeuralSvhError, Point3, Result, VoxelCoord,
};
use svh_core::{nearest_voxel, world_to_grid};

type TestBackend = NdArray;

/// A dense box of voxels with anisotropic voxel size and nearest-voxel sampling.
struct BoxGrid {
    dims: [i32; 3],
    origin: Point3,
    voxel_size: Point3,
}

impl BoxGrid {
    fn row(&self, ijk: VoxelCoord) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        let inside = (0..nx).contains(&ijk.x) && (0..ny).contains(&ijk.y) && (0..nz).contains(&ijk.z);
        inside.then(|| (ijk.x + nx * (ijk.y + ny * ijk.z)) as usize)
    }
}

impl<B: Backend> FeatureGrid<B> for BoxGrid {
    fn world_to_grid(&self, xyz: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = xyz.device();
        let origin = Tensor::<B, 2>::from_data(
            TensorData::new(self.origin.as_array().to_vec(), [1, 3]),
            &device,
        );
        let size = Tensor::<B, 2>::from_data(
            TensorData::new(self.voxel_size.as_array().to_vec(), [1, 3]),
            &device,
        );
        (xyz - origin) / size
    }

    fn ijk_to_index(&self, ijk: &[VoxelCoord]) -> Vec<Option<usize>> {
        ijk.iter().map(|c| self.row(*c)).collect()
    }

    fn num_voxels(&self) -> usize {
        self.dims.iter().product::<i32>() as usize
    }

    fn voxel_size(&self) -> Point3 {
        self.voxel_size
    }

    fn sample_trilinear(&self, xyz: Tensor<B, 2>, features: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let [m, _] = xyz.dims();
        let [rows, channels] = features.dims();
        if rows != FeatureGrid::<B>::num_voxels(self) {
            return Err(NeuralSvhError::ShapeMismatch {
                expected: vec![FeatureGrid::<B>::num_voxels(self), channels],
                got: vec![rows, channels],
            });
        }
        let device = features.device();

        let mut index = Vec::with_capacity(m);
        let mut weight = Vec::with_capacity(m);
        for p in points_from_tensor(xyz)? {
            match self.row(nearest_voxel(world_to_grid(p, self.origin, self.voxel_size))) {
                Some(row) => {
                    index.push(row as i64);
                    weight.push(1.0f32);
                }
                None => {
                    index.push(0);
                    weight.push(0.0);
                }
            }
        }

        let index = Tensor::<B, 1, Int>::from_data(TensorData::new(index, [m]), &device);
        let weight = Tensor::<B, 2>::from_data(TensorData::new(weight, [m, 1]), &device);
        Ok(features.select(0, index) * weight)
    }
}

fn box_grid(voxel_size: Point3) -> BoxGrid {
    BoxGrid {
        dims: [4, 3, 2],
        origin: voxel_size * 0.5,
        voxel_size,
    }
}

#[test]
fn test_custom_grid_backs_encoder_and_decoder() {
    let device = Default::default();
    let fine = box_grid(Point3::new(0.1, 0.2, 0.3));
    let coarse = box_grid(Point3::new(0.2, 0.4, 0.6));
    let svh = SparseFeatureHierarchy::new(vec![Some(fine), Some(coarse)]);

    let encoder = PointEncoder::<TestBackend>::new(
        &PointEncoderConfig::new(3).with_c_dim(4),
        &device,
    )
    .unwrap();
    let decoder = MultiscalePointDecoder::<TestBackend>::new(
        &MultiscaleDecoderConfig::new()
            .with_c_each_dim(4)
            .with_multiscale_depths(2),
        &device,
    )
    .unwrap();

    let points = vec![
        Point3::new(0.05, 0.1, 0.15),
        Point3::new(0.33, 0.5, 0.4),
        Point3::new(2.0, 2.0, 2.0),
    ];
    let xyz = points_to_tensor::<TestBackend>(&points, &device);

    let codes = encoder.encode_hierarchy(xyz.clone(), None, &svh, &[0, 1]).unwrap();
    assert_eq!(codes.get(0).map(|t| t.dims()), Some([24, 4]));
    assert_eq!(codes.get(1).map(|t| t.dims()), Some([24, 4]));

    let out = decoder.decode(xyz, &svh, &codes).unwrap();
    assert_eq!(out.dims(), [3, 1]);
}

#[test]
fn test_anisotropic_positional_encoding() {
    let device = Default::default();
    let svh = SparseFeatureHierarchy::new(vec![Some(box_grid(Point3::new(0.1, 0.2, 0.4)))]);
    let decoder = MultiscalePointDecoder::<TestBackend>::new(
        &MultiscaleDecoderConfig::new()
            .with_c_each_dim(2)
            .with_multiscale_depths(1),
        &device,
    )
    .unwrap();

    let xyz = Tensor::<TestBackend, 2>::from_data([[0.15f32, 0.15, 0.3]], &device);
    let enc: Vec<f32> = decoder
        .positional_encoding(xyz, &svh)
        .unwrap()
        .to_data()
        .to_vec()
        .unwrap();

    assert!((enc[0] - 0.0).abs() < 1e-4);
    assert!((enc[1] - 0.25).abs() < 1e-4);
    assert!((enc[2] - 0.25).abs() < 1e-4);
}

#[test]
fn test_hierarchy_voxel_counts_shrink_with_depth() {
    let points: Vec<Point3> = (0..200)
        .map(|i| {
            let t = i as f32 / 200.0 * std::f32::consts::PI * 2.0;
            Point3::new(t.cos() * 0.5, t.sin() * 0.5, 0.0)
        })
        .collect();
    let svh = SparseFeatureHierarchy::from_points(&VoxelGridConfig::new(0.02), &points, 4).unwrap();

    let counts: Vec<usize> = (0..4)
        .filter_map(|d| svh.grid(d))
        .map(|g| g.coords().len())
        .collect();
    assert_eq!(counts.len(), 4);
    for pair in counts.windows(2) {
        assert!(pair[1] <= pair[0], "{:?}", counts);
    }
}

fn dilated_grid() -> SparseVoxelGrid {
    let config = VoxelGridConfig::new(0.1).with_dilation(2);
    SparseVoxelGrid::from_points(&config, &[Point3::splat(0.05)]).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_constant_field_is_reproduced(
        x in -0.04f32..0.14,
        y in -0.04f32..0.14,
        z in -0.04f32..0.14,
        v in -10.0f32..10.0,
    ) {
        let device = Default::default();
        let grid = dilated_grid();
        let rows = grid.coords().len();
        let features = Tensor::<TestBackend, 2>::full([rows, 2], v, &device);
        let xyz = Tensor::<TestBackend, 2>::from_data([[x, y, z]], &device);

        let sampled: Vec<f32> = grid
            .sample_trilinear(xyz, features)
            .unwrap()
            .to_data()
            .to_vec()
            .unwrap();
        for s in sampled {
            prop_assert!((s - v).abs() < 1e-4 * (1.0 + v.abs()), "{} vs {}", s, v);
        }
    }

    #[test]
    fn prop_linear_field_is_reproduced(
        x in -0.04f32..0.14,
        y in -0.04f32..0.14,
        z in -0.04f32..0.14,
    ) {
        let device = Default::default();
        let grid = dilated_grid();

        // f(voxel) = i + 2j - 3k, evaluated at voxel centres
        let values: Vec<f32> = grid
            .coords()
            .iter()
            .map(|c| (c.x + 2 * c.y - 3 * c.z) as f32)
            .collect();
        let rows = values.len();
        let features = Tensor::<TestBackend, 2>::from_data(TensorData::new(values, [rows, 1]), &device);
        let xyz = Tensor::<TestBackend, 2>::from_data([[x, y, z]], &device);

        let sampled: Vec<f32> = grid
            .sample_trilinear(xyz, features)
            .unwrap()
            .to_data()
            .to_vec()
            .unwrap();

        let g = world_to_grid(Point3::new(x, y, z), grid.origin(), Point3::splat(0.1));
        let expected = g.x + 2.0 * g.y - 3.0 * g.z;
        prop_assert!((sampled[0] - expected).abs() < 1e-3, "{} vs {}", sampled[0], expected);
    }
}
