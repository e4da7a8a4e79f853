//! Property tests for the voxel coordinate maths.

use proptest::prelude::*;
use svh_core::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Folded coordinates always land in the unit cell.
    #[test]
    fn fold_lands_in_unit_cell(v in -1000.0f32..1000.0) {
        let f = fold_to_unit_cell(v);
        prop_assert!((0.0..=1.0).contains(&f), "fold({}) = {}", v, f);
    }

    /// The folded coordinate is the position relative to the nearest voxel centre.
    #[test]
    fn fold_matches_nearest_voxel(
        x in -50.0f32..50.0,
        y in -50.0f32..50.0,
        z in -50.0f32..50.0,
    ) {
        let g = Point3::new(x, y, z);
        let voxel = nearest_voxel(g);
        let folded = fold_point_to_unit_cell(g);

        for (c, (f, i)) in g.as_array().iter().zip(folded.as_array().iter().zip(voxel.as_array())) {
            let expected = c - i as f32 + 0.5;
            // Exact ties may fold to either face of the cell.
            let d = (f - expected).abs();
            prop_assert!(d < 1e-3 || (d - 1.0).abs() < 1e-3,
                "coord {} voxel {} folded {} expected {}", c, i, f, expected);
        }
    }

    /// Cell offsets stay in [-0.5, 0.5].
    #[test]
    fn cell_offset_in_range(x in -100.0f32..100.0, s in 0.01f32..2.0) {
        let o = cell_offset(x, s);
        prop_assert!((-0.5..=0.5).contains(&o), "offset({}, {}) = {}", x, s, o);
    }

    /// Stencil weights are non-negative and sum to one.
    #[test]
    fn stencil_weights_partition_unity(
        x in -20.0f32..20.0,
        y in -20.0f32..20.0,
        z in -20.0f32..20.0,
    ) {
        let (_, frac) = trilinear_base(Point3::new(x, y, z));
        let weights = compute_trilinear_weights(frac);
        let sum: f32 = weights.iter().sum();

        prop_assert!(weights.iter().all(|w| *w >= -1e-6));
        prop_assert!((sum - 1.0).abs() < 1e-4);
    }

    /// World and grid transforms invert each other.
    #[test]
    fn world_grid_roundtrip(
        x in -10.0f32..10.0,
        y in -10.0f32..10.0,
        z in -10.0f32..10.0,
        s in 0.05f32..1.0,
    ) {
        let origin = Point3::splat(s * 0.5);
        let voxel_size = Point3::splat(s);
        let p = Point3::new(x, y, z);

        let back = grid_to_world(world_to_grid(p, origin, voxel_size), origin, voxel_size);
        prop_assert!((back - p).length() < 1e-3);
    }
}

#[test]
fn nearest_voxel_is_stable_inside_voxel() {
    let origin = Point3::splat(0.05);
    let voxel_size = Point3::splat(0.1);

    let centre = grid_to_world(Point3::new(4.0, -2.0, 7.0), origin, voxel_size);
    for d in [-0.04f32, -0.01, 0.0, 0.02, 0.049] {
        let p = centre + Point3::splat(d);
        assert_eq!(
            nearest_voxel(world_to_grid(p, origin, voxel_size)),
            VoxelCoord::new(4, -2, 7)
        );
    }
}

#[test]
fn invalid_voxel_sizes_are_rejected() {
    for bad in [0.0f32, -1.0, f32::NAN, f32::INFINITY] {
        assert!(validate_voxel_size(Point3::new(0.1, bad, 0.1)).is_err());
    }
}
