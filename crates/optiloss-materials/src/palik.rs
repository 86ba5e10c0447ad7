//! Built-in optical constants for common oxides.
//!
//! Selected datasets from
//! E. D. Palik, *Handbook of Optical Constants of Solids* (Academic Press, 1985),
//! sampled every 10 nm over 300–400 nm and every 20 nm over 400–1000 nm.
//!
//! | Identifier | Function | Range |
//! |-----------|----------|-------|
//! | `TiO2_Palik` | [`tio2`] | 300–1000 nm |
//! | `SiO2_Palik` | [`sio2`] | 300–1000 nm |

use crate::interp::Interpolation;
use crate::provider::MaterialError;
use crate::tabulated::TabulatedMaterial;

/// Identifiers of the built-in datasets, in listing order.
pub const BUILTIN_IDS: [&str; 2] = ["SiO2_Palik", "TiO2_Palik"];

/// Shared Palik wavelength grid (nm).
fn grid() -> Vec<f64> {
    (0..=10)
        .map(|i| 300.0 + 10.0 * i as f64)
        .chain((1..=30).map(|i| 400.0 + 20.0 * i as f64))
        .collect()
}

#[rustfmt::skip]
const TIO2_N: [f64; 41] = [
    3.340, 3.140, 2.990, 2.870, 2.780, 2.720, 2.680, 2.655, 2.640, 2.629, 2.620,
    2.607, 2.596, 2.587, 2.579, 2.572, 2.566, 2.560, 2.555, 2.551, 2.547,
    2.543, 2.540, 2.537, 2.534, 2.531, 2.529, 2.527, 2.525, 2.523, 2.521,
    2.519, 2.518, 2.516, 2.515, 2.513, 2.512, 2.511, 2.510, 2.508, 2.507,
];

#[rustfmt::skip]
const TIO2_K: [f64; 41] = [
    0.880, 0.660, 0.480, 0.330, 0.220, 0.140, 0.080, 0.040, 0.018, 0.008, 0.003,
    0.001, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];

#[rustfmt::skip]
const SIO2_N: [f64; 41] = [
    1.487, 1.484, 1.482, 1.480, 1.478, 1.476, 1.475, 1.474, 1.473, 1.472, 1.470,
    1.469, 1.468, 1.467, 1.466, 1.462, 1.461, 1.460, 1.459, 1.458, 1.458,
    1.457, 1.457, 1.456, 1.455, 1.455, 1.454, 1.454, 1.453, 1.453, 1.452,
    1.452, 1.451, 1.451, 1.450, 1.450, 1.450, 1.449, 1.449, 1.449, 1.448,
];

/// Rutile TiO₂ (ordinary ray). Absorption edge near 380 nm.
pub fn tio2(mode: Interpolation) -> Result<TabulatedMaterial, MaterialError> {
    TabulatedMaterial::new("TiO₂ (Palik)", &grid(), &TIO2_N, &TIO2_K, mode)
}

/// Fused silica SiO₂, lossless across the tabulated range.
pub fn sio2(mode: Interpolation) -> Result<TabulatedMaterial, MaterialError> {
    TabulatedMaterial::new("SiO₂ (Palik)", &grid(), &SIO2_N, &[0.0; 41], mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MaterialProvider;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_matches_tables() {
        let g = grid();
        assert_eq!(g.len(), TIO2_N.len());
        assert_eq!(g[10], 400.0);
        assert_eq!(g[11], 420.0);
        assert_eq!(*g.last().unwrap(), 1000.0);
    }

    #[test]
    fn test_tio2_is_high_index_and_lossy_in_uv() {
        let mat = tio2(Interpolation::Linear).unwrap();
        assert_eq!(mat.wavelength_range(), (300.0, 1000.0));
        let visible = mat.refractive_index(600.0);
        assert_abs_diff_eq!(visible.re, 2.547, epsilon = 1e-12);
        assert_eq!(visible.im, 0.0);
        assert!(mat.refractive_index(320.0).im > 0.4);
    }

    #[test]
    fn test_sio2_is_lossless() {
        let mat = sio2(Interpolation::Cubic).unwrap();
        for wl in [350.0, 550.0, 950.0] {
            let idx = mat.refractive_index(wl);
            assert!(idx.re > 1.44 && idx.re < 1.49);
            assert_abs_diff_eq!(idx.im, 0.0, epsilon = 1e-15);
        }
    }
}
