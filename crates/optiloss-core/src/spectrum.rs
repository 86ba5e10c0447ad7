//! Reference illumination spectra (e.g. AM1.5G).
//!
//! A spectrum is a table of wavelength (nm) against spectral flux in whatever
//! units the source file uses. The integrator resamples it onto the sweep grid
//! with linear interpolation and never extrapolates.

use std::path::Path;

use optiloss_materials::tabular::{parse_table, read_table, ColumnSpec, Table};
use optiloss_materials::MaterialError;

use crate::constants::charge_per_joule;
use crate::error::PipelineError;
use crate::photocurrent::trapezoid;

fn is_wavelength_header(name: &str) -> bool {
    name == "wl"
        || name.starts_with("wavelength")
        || name.starts_with('λ')
        || name.starts_with("lambda")
}

fn is_flux_header(name: &str) -> bool {
    name == "pw"
        || name.starts_with("flux")
        || name.starts_with("irradiance")
        || name.starts_with("global")
}

const SPECTRUM_COLUMNS: [ColumnSpec; 2] = [
    ColumnSpec {
        role: "wavelength",
        fallback_index: 0,
        matches: is_wavelength_header,
    },
    ColumnSpec {
        role: "flux",
        fallback_index: 1,
        matches: is_flux_header,
    },
];

/// A tabulated reference spectrum, sorted by wavelength.
#[derive(Debug, Clone)]
pub struct ReferenceSpectrum {
    name: String,
    wavelengths_nm: Vec<f64>,
    flux: Vec<f64>,
}

impl ReferenceSpectrum {
    /// Build from parallel wavelength and flux sequences (any order).
    pub fn new(
        name: impl Into<String>,
        wavelengths_nm: Vec<f64>,
        flux: Vec<f64>,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        if wavelengths_nm.len() != flux.len() {
            return Err(PipelineError::DataFormat {
                source_name: name,
                source: MaterialError::DataFormat {
                    line: 0,
                    message: format!(
                        "{} wavelengths but {} flux values",
                        wavelengths_nm.len(),
                        flux.len()
                    ),
                },
            });
        }
        let lines = (1..=wavelengths_nm.len()).collect();
        Self::from_table(
            name,
            Table {
                columns: vec![wavelengths_nm, flux],
                lines,
            },
        )
    }

    /// Parse a CSV spectrum with `wl` and `pw` columns (or a headerless
    /// two-column table).
    pub fn parse(name: impl Into<String>, content: &str) -> Result<Self, PipelineError> {
        let name = name.into();
        match parse_table(content, &SPECTRUM_COLUMNS) {
            Ok(table) => Self::from_table(name, table),
            Err(source) => Err(PipelineError::from_material(&name, source)),
        }
    }

    /// Load a CSV spectrum from disk.
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self, PipelineError> {
        let name = name.into();
        let table = read_table(path, &SPECTRUM_COLUMNS)
            .map_err(|source| PipelineError::from_material(&name, source))?;
        let spectrum = Self::from_table(name, table)?;
        log::info!(
            "Loaded spectrum '{}' from {} ({} samples, {:.1}–{:.1} nm)",
            spectrum.name,
            path.display(),
            spectrum.len(),
            spectrum.range().0,
            spectrum.range().1
        );
        Ok(spectrum)
    }

    fn from_table(name: String, mut table: Table) -> Result<Self, PipelineError> {
        let data_error = |line: usize, message: String| PipelineError::DataFormat {
            source_name: name.clone(),
            source: MaterialError::DataFormat { line, message },
        };

        if table.len() < 2 {
            return Err(data_error(
                table.lines.first().copied().unwrap_or(1),
                "A spectrum needs at least two samples".into(),
            ));
        }
        if let Some(i) = table.columns[0].iter().position(|w| !(w.is_finite() && *w > 0.0)) {
            return Err(data_error(
                table.lines[i],
                format!("Wavelength must be positive, got {}", table.columns[0][i]),
            ));
        }
        if let Some(i) = table.columns[1].iter().position(|f| !f.is_finite()) {
            return Err(data_error(table.lines[i], "Non-finite flux value".into()));
        }
        table
            .sort_by_column(0)
            .map_err(|source| PipelineError::from_material(&name, source))?;

        let mut columns = table.columns.into_iter();
        let wavelengths_nm = columns.next().unwrap_or_default();
        let flux = columns.next().unwrap_or_default();
        Ok(Self {
            name,
            wavelengths_nm,
            flux,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.wavelengths_nm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths_nm.is_empty()
    }

    pub fn wavelengths_nm(&self) -> &[f64] {
        &self.wavelengths_nm
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    /// Tabulated wavelength range (nm).
    pub fn range(&self) -> (f64, f64) {
        (self.wavelengths_nm[0], self.wavelengths_nm[self.len() - 1])
    }

    /// Whether `[lo, hi]` lies within the tabulated range.
    pub fn covers(&self, lo: f64, hi: f64) -> bool {
        let (min, max) = self.range();
        lo >= min && hi <= max
    }

    /// A copy with every flux value multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            name: self.name.clone(),
            wavelengths_nm: self.wavelengths_nm.clone(),
            flux: self.flux.iter().map(|f| f * factor).collect(),
        }
    }

    /// Fail with a configuration error unless the spectrum covers `grid`.
    pub fn check_coverage(&self, grid: &[f64]) -> Result<(), PipelineError> {
        let lo = grid.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = grid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if grid.is_empty() || self.covers(lo, hi) {
            return Ok(());
        }
        let (min, max) = self.range();
        Err(PipelineError::Configuration(format!(
            "Reference spectrum '{}' covers {:.1}–{:.1} nm but the wavelength grid spans {:.1}–{:.1} nm",
            self.name, min, max, lo, hi
        )))
    }

    /// Flux linearly interpolated at each grid wavelength.
    pub fn resample(&self, grid: &[f64]) -> Result<Vec<f64>, PipelineError> {
        self.check_coverage(grid)?;
        Ok(grid.iter().map(|&w| self.interpolate(w)).collect())
    }

    /// Current density obtained if every photon over `grid` were collected
    /// (channel response ≡ 1).
    pub fn integrated_current(&self, grid: &[f64]) -> Result<f64, PipelineError> {
        let flux = self.resample(grid)?;
        let integrand: Vec<f64> = grid
            .iter()
            .zip(&flux)
            .map(|(&w, f)| charge_per_joule(w) * f)
            .collect();
        Ok(trapezoid(grid, &integrand))
    }

    /// Linear interpolation inside the tabulated range.
    fn interpolate(&self, wavelength_nm: f64) -> f64 {
        let xs = &self.wavelengths_nm;
        let hi = xs.partition_point(|&x| x < wavelength_nm).clamp(1, xs.len() - 1);
        let lo = hi - 1;
        let t = (wavelength_nm - xs[lo]) / (xs[hi] - xs[lo]);
        self.flux[lo] * (1.0 - t) + self.flux[hi] * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    #[test]
    fn test_parse_wl_pw_columns() {
        let s = ReferenceSpectrum::parse("AM1.5G", "wl,pw\n300,0.0\n400,1.0\n500,1.5\n").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.range(), (300.0, 500.0));
        let resampled = s.resample(&[300.0, 350.0, 450.0, 500.0]).unwrap();
        assert_abs_diff_eq!(resampled[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(resampled[1], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(resampled[2], 1.25, epsilon = 1e-15);
        assert_abs_diff_eq!(resampled[3], 1.5, epsilon = 1e-15);
    }

    #[test]
    fn test_uncovered_grid_is_configuration_error() {
        let s = ReferenceSpectrum::new("flat", vec![400.0, 700.0], vec![1.0, 1.0]).unwrap();
        assert!(s.covers(400.0, 700.0));
        let err = s.resample(&[300.0, 600.0, 900.0]).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("400.0–700.0"));
    }

    #[test]
    fn test_malformed_spectrum_is_data_format_error() {
        let err = ReferenceSpectrum::parse("bad", "wl,pw\n400,abc\n500,1\n").unwrap_err();
        assert!(matches!(err, PipelineError::DataFormat { .. }));

        let err = ReferenceSpectrum::parse("bad", "wl,irr\n400,1\n500,1\n").unwrap_err();
        assert!(matches!(err, PipelineError::DataFormat { .. }));
    }

    #[test]
    fn test_scaled() {
        let s = ReferenceSpectrum::new("s", vec![400.0, 500.0], vec![1.0, 2.0]).unwrap();
        assert_eq!(s.scaled(3.0).flux(), &[3.0, 6.0]);
    }

    #[test]
    fn test_integrated_current_flat_spectrum() {
        let s = ReferenceSpectrum::new("flat", vec![400.0, 600.0], vec![1.0, 1.0]).unwrap();
        // Integrand is linear in λ, so the trapezoid rule is exact.
        let expected = 0.5 * (charge_per_joule(400.0) + charge_per_joule(600.0)) * 200.0;
        let j = s.integrated_current(&[400.0, 500.0, 600.0]).unwrap();
        assert_abs_diff_eq!(j, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# AM1.5G excerpt\nwl,pw\n280,0.0\n900,0.9").unwrap();
        let s = ReferenceSpectrum::load("AM1.5G", file.path()).unwrap();
        assert_eq!(s.name(), "AM1.5G");
        assert!(s.covers(280.0, 900.0));
    }
}
