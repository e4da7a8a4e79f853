//! Trilinear interpolation weights.
//!
//! The sampling itself lives with the storage that owns the voxel features; this
//! module only provides the stencil weights so every storage agrees on them.

/// Compute trilinear interpolation weights for a fractional stencil position.
///
/// Returns the 8 weights in [`CORNER_OFFSETS`](crate::types::CORNER_OFFSETS) order. For `frac = (u, v, w)`
/// in `[0, 1]^3`:
/// - weight[0] = (1-u)(1-v)(1-w)  at offset (0,0,0)
/// - weight[1] = u(1-v)(1-w)      at offset (1,0,0)
/// - weight[2] = uv(1-w)          at offset (1,1,0)
/// - weight[3] = (1-u)v(1-w)      at offset (0,1,0)
/// - weight[4] = (1-u)(1-v)w      at offset (0,0,1)
/// - weight[5] = u(1-v)w          at offset (1,0,1)
/// - weight[6] = uvw              at offset (1,1,1)
/// - weight[7] = (1-u)vw          at offset (0,1,1)
#[inline]
pub fn compute_trilinear_weights(frac: [f32; 3]) -> [f32; 8] {
    let [u, v, w] = frac;

    let u0 = 1.0 - u;
    let v0 = 1.0 - v;
    let w0 = 1.0 - w;

    [
        u0 * v0 * w0,
        u * v0 * w0,
        u * v * w0,
        u0 * v * w0,
        u0 * v0 * w,
        u * v0 * w,
        u * v * w,
        u0 * v * w,
    ]
}

/// Interpolate a scalar field given its values at the 8 stencil corners.
///
/// `corner_values` must be in [`CORNER_OFFSETS`](crate::types::CORNER_OFFSETS) order.
#[inline]
pub fn trilinear_interpolate(corner_values: &[f32; 8], frac: [f32; 3]) -> f32 {
    let weights = compute_trilinear_weights(frac);
    weights
        .iter()
        .zip(corner_values.iter())
        .map(|(w, v)| w * v)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CORNER_OFFSETS;

    #[test]
    fn test_weights_sum_to_one() {
        for frac in [
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [0.5, 0.5, 0.5],
            [0.25, 0.75, 0.33],
        ] {
            let sum: f32 = compute_trilinear_weights(frac).iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "weights sum to {} for {:?}", sum, frac);
        }
    }

    #[test]
    fn test_weights_at_corners() {
        for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
            let frac = [offset[0] as f32, offset[1] as f32, offset[2] as f32];
            let weights = compute_trilinear_weights(frac);
            for (j, w) in weights.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((w - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_interpolate_linear_field() {
        // f(x, y, z) = x + 2y + 3z sampled at the corners
        let mut corner_values = [0.0f32; 8];
        for (i, o) in CORNER_OFFSETS.iter().enumerate() {
            corner_values[i] = o[0] as f32 + 2.0 * o[1] as f32 + 3.0 * o[2] as f32;
        }

        let value = trilinear_interpolate(&corner_values, [0.2, 0.5, 0.9]);
        assert!((value - (0.2 + 1.0 + 2.7)).abs() < 1e-5);
    }
}
