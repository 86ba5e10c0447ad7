//! Physical constants used by the photocurrent pipeline.
//!
//! Values match those conventionally used with the AM1.5G reference data, so
//! integrated currents agree with the reference tables to the quoted digits.

use num_complex::Complex64;

pub use optiloss_materials::HC_EV_NM;

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;

/// Planck constant (J·s).
pub const PLANCK: f64 = 6.626e-34;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 2.998e8;

/// Index of the semi-infinite incident and exit media.
pub const AMBIENT_INDEX: Complex64 = Complex64::new(1.0, 0.0);

/// Photons per joule at `wavelength_nm`, multiplied by the elementary charge:
/// $q\lambda / (hc)$ with $\lambda$ converted to metres.
pub fn charge_per_joule(wavelength_nm: f64) -> f64 {
    ELEMENTARY_CHARGE * wavelength_nm * 1e-9 / (PLANCK * SPEED_OF_LIGHT)
}
