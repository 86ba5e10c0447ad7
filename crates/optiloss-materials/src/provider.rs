//! Material property provider trait.
//!
//! Every optical-constant source implements [`MaterialProvider`], which maps
//! photon energy to a complex refractive index $\tilde{n} = n + ik$.

use num_complex::Complex64;
use thiserror::Error;

/// $hc$ in eV·nm, used for all wavelength/energy conversions.
pub const HC_EV_NM: f64 = 1239.84193;

/// Convert a vacuum wavelength (nm) to photon energy (eV).
pub fn wavelength_to_energy(wavelength_nm: f64) -> f64 {
    HC_EV_NM / wavelength_nm
}

/// Errors from material providers and their data sources.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Material not found: {0}")]
    NotFound(String),

    #[error("Data format error at line {line}: {message}")]
    DataFormat { line: usize, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Provides a continuous complex refractive index for one material.
///
/// Implementations never fail at evaluation time: tabulated sources
/// extrapolate beyond their data instead of rejecting the query.
pub trait MaterialProvider: Send + Sync {
    /// Human-readable name of this material.
    fn name(&self) -> &str;

    /// Wavelength range covered by the underlying data (nm).
    ///
    /// Unbounded sources report `(0.0, f64::INFINITY)`.
    fn wavelength_range(&self) -> (f64, f64);

    /// Complex refractive index at a photon energy in eV.
    fn index_at_energy(&self, energy_ev: f64) -> Complex64;

    /// Complex refractive index at a vacuum wavelength in nm.
    fn refractive_index(&self, wavelength_nm: f64) -> Complex64 {
        self.index_at_energy(wavelength_to_energy(wavelength_nm))
    }

    /// Whether `wavelength_nm` lies inside the tabulated range.
    fn covers(&self, wavelength_nm: f64) -> bool {
        let (lo, hi) = self.wavelength_range();
        wavelength_nm >= lo && wavelength_nm <= hi
    }
}
