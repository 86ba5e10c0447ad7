//! Materials defined by tabulated $(\lambda, n, k)$ data.
//!
//! Wavelengths are converted to photon energy with $E = hc/\lambda$ and the
//! real and imaginary parts of $\tilde{n} = n + ik$ are interpolated over
//! energy. Queries outside the tabulated range are extrapolated linearly.

use std::path::Path;

use num_complex::Complex64;

use crate::interp::{Curve, Interpolation};
use crate::provider::{wavelength_to_energy, MaterialError, MaterialProvider};
use crate::tabular::{parse_table, read_table, ColumnSpec, Table};

fn is_wavelength_header(name: &str) -> bool {
    name.starts_with('λ')
        || name.starts_with("lambda")
        || name.starts_with("wavelength")
        || name.starts_with("wl")
}

fn is_n_header(name: &str) -> bool {
    name == "n"
}

fn is_k_header(name: &str) -> bool {
    name == "k"
}

const NK_COLUMNS: [ColumnSpec; 3] = [
    ColumnSpec {
        role: "wavelength",
        fallback_index: 0,
        matches: is_wavelength_header,
    },
    ColumnSpec {
        role: "n",
        fallback_index: 1,
        matches: is_n_header,
    },
    ColumnSpec {
        role: "k",
        fallback_index: 2,
        matches: is_k_header,
    },
];

/// A material with interpolated optical constants.
#[derive(Debug, Clone)]
pub struct TabulatedMaterial {
    name: String,
    wavelength_range: (f64, f64),
    samples: usize,
    n_curve: Curve,
    k_curve: Curve,
}

impl TabulatedMaterial {
    /// Construct from parallel `(λ, n, k)` sequences.
    ///
    /// Samples need not be sorted, but wavelengths must be distinct, positive
    /// and finite.
    pub fn new(
        name: impl Into<String>,
        wavelengths_nm: &[f64],
        n: &[f64],
        k: &[f64],
        mode: Interpolation,
    ) -> Result<Self, MaterialError> {
        if wavelengths_nm.len() != n.len() || n.len() != k.len() {
            return Err(MaterialError::DataFormat {
                line: 0,
                message: format!(
                    "Column lengths differ: {} wavelengths, {} n, {} k",
                    wavelengths_nm.len(),
                    n.len(),
                    k.len()
                ),
            });
        }
        let table = Table {
            columns: vec![wavelengths_nm.to_vec(), n.to_vec(), k.to_vec()],
            lines: (1..=wavelengths_nm.len()).collect(),
        };
        Self::from_table(name, table, mode)
    }

    /// Parse a CSV table of wavelength (nm), n and k.
    pub fn parse(
        name: impl Into<String>,
        content: &str,
        mode: Interpolation,
    ) -> Result<Self, MaterialError> {
        let table = parse_table(content, &NK_COLUMNS)?;
        Self::from_table(name, table, mode)
    }

    /// Load a CSV table of wavelength (nm), n and k from disk.
    pub fn load(
        name: impl Into<String>,
        path: &Path,
        mode: Interpolation,
    ) -> Result<Self, MaterialError> {
        let table = read_table(path, &NK_COLUMNS)?;
        let material = Self::from_table(name, table, mode)?;
        log::debug!(
            "Loaded '{}' from {} ({} samples, {:.1}–{:.1} nm)",
            material.name,
            path.display(),
            material.samples,
            material.wavelength_range.0,
            material.wavelength_range.1
        );
        Ok(material)
    }

    fn from_table(
        name: impl Into<String>,
        mut table: Table,
        mode: Interpolation,
    ) -> Result<Self, MaterialError> {
        if let Some(i) = table.columns[0].iter().position(|&w| !(w > 0.0) || !w.is_finite()) {
            return Err(MaterialError::DataFormat {
                line: table.lines[i],
                message: format!("Wavelength must be positive, got {}", table.columns[0][i]),
            });
        }
        if table.len() < 2 {
            return Err(MaterialError::DataFormat {
                line: table.lines.first().copied().unwrap_or(1),
                message: "At least two distinct wavelength samples are required".into(),
            });
        }

        table.sort_by_column(0)?;
        let wavelengths = &table.columns[0];
        let wavelength_range = (wavelengths[0], wavelengths[wavelengths.len() - 1]);

        // Energy decreases with wavelength: reverse so the knots increase.
        let energies: Vec<f64> = wavelengths
            .iter()
            .rev()
            .map(|&w| wavelength_to_energy(w))
            .collect();
        let n: Vec<f64> = table.columns[1].iter().rev().copied().collect();
        let k: Vec<f64> = table.columns[2].iter().rev().copied().collect();

        Ok(Self {
            name: name.into(),
            wavelength_range,
            samples: table.len(),
            n_curve: Curve::new(mode, energies.clone(), n)?,
            k_curve: Curve::new(mode, energies, k)?,
        })
    }

    /// Number of tabulated samples.
    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl MaterialProvider for TabulatedMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.wavelength_range
    }

    fn index_at_energy(&self, energy_ev: f64) -> Complex64 {
        Complex64::new(self.n_curve.evaluate(energy_ev), self.k_curve.evaluate(energy_ev))
    }
}
