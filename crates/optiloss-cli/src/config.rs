//! TOML configuration deserialisation for analysis jobs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use num_complex::Complex64;
use optiloss_materials::{Interpolation, MaterialSource};
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub spectrum: SpectrumConfig,
    #[serde(default, rename = "material")]
    pub materials: Vec<MaterialConfig>,
    #[serde(rename = "layer")]
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    /// Directory of the job file; relative input paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Sweep parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub wavelengths: WavelengthSpec,
    #[serde(default)]
    pub incidence_angle_deg: f64,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            wavelengths: WavelengthSpec::default(),
            incidence_angle_deg: 0.0,
            parallel: false,
            interpolation: Interpolation::default(),
        }
    }
}

/// Wavelength specification: either a range or explicit list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WavelengthSpec {
    Range {
        range: [f64; 2],
        points: usize,
    },
    List {
        values: Vec<f64>,
    },
}

impl Default for WavelengthSpec {
    fn default() -> Self {
        WavelengthSpec::Range {
            range: [280.0, 900.0],
            points: 500,
        }
    }
}

impl WavelengthSpec {
    /// Grid in nm. Ranges are evenly spaced and include both ends.
    pub fn grid(&self) -> Vec<f64> {
        match self {
            WavelengthSpec::Range { range, points } => {
                let [start, end] = *range;
                (0..*points)
                    .map(|i| start + (end - start) * i as f64 / (*points - 1).max(1) as f64)
                    .collect()
            }
            WavelengthSpec::List { values } => values.clone(),
        }
    }
}

/// Reference spectrum file.
#[derive(Debug, Deserialize)]
pub struct SpectrumConfig {
    #[serde(default = "default_spectrum_name")]
    pub name: String,
    pub file: PathBuf,
}

fn default_spectrum_name() -> String {
    "AM1.5G".into()
}

/// A material declared by the job: a CSV file or a fixed index.
#[derive(Debug, Deserialize)]
pub struct MaterialConfig {
    pub id: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// `[n, k]`.
    #[serde(default)]
    pub index: Option<[f64; 2]>,
}

impl MaterialConfig {
    pub fn source(&self, base_dir: &Path) -> Result<MaterialSource> {
        match (&self.file, self.index) {
            (Some(file), None) => Ok(MaterialSource::File(resolve(base_dir, file))),
            (None, Some([n, k])) => Ok(MaterialSource::Constant(Complex64::new(n, k))),
            (Some(_), Some(_)) => {
                anyhow::bail!("Material '{}': give either 'file' or 'index', not both", self.id)
            }
            (None, None) => anyhow::bail!("Material '{}' requires 'file' or 'index'", self.id),
        }
    }
}

/// One layer of the stack, listed from the incident side.
#[derive(Debug, Deserialize)]
pub struct LayerConfig {
    /// Material identifier (built-in or declared under `[[material]]`).
    pub material: String,
    /// Thickness in nm (default: 100).
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    /// Channel name in the report (default: the material identifier).
    #[serde(default)]
    pub name: Option<String>,
}

fn default_thickness() -> f64 {
    100.0
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save channel spectra as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_spectra: bool,
    /// Whether to also save the full result as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_spectra: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// `path` as given if absolute, otherwise relative to `base_dir`.
pub fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read job file {}", path.display()))?;
    let mut config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid job file {}", path.display()))?;
    config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(config)
}
