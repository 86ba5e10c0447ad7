//! Errors surfaced by the analysis pipeline.
//!
//! Every variant is fatal to the current request: nothing is retried and no
//! partial result is returned.

use optiloss_materials::MaterialError;
use thiserror::Error;

use crate::solver::SolverError;
use crate::types::Polarization;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or missing columns in a material or reference table.
    #[error("Data format error in {source_name}: {source}")]
    DataFormat {
        source_name: String,
        #[source]
        source: MaterialError,
    },

    /// The solver failed at one wavelength.
    #[error("Solver failed at λ={wavelength_nm:.2} nm ({polarization}-polarised, {layers} layers): {source}")]
    SolverConvergence {
        wavelength_nm: f64,
        polarization: Polarization,
        layers: usize,
        #[source]
        source: SolverError,
    },

    /// Invalid request, rejected before any computation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A material could not be resolved.
    #[error("Material '{id}': {source}")]
    Material {
        id: String,
        #[source]
        source: MaterialError,
    },

    #[error("Sweep cancelled before λ={wavelength_nm:.2} nm")]
    Cancelled { wavelength_nm: f64 },
}

impl PipelineError {
    /// Classify a material-loading failure: parse problems are data-format
    /// errors, everything else is reported against the material id.
    pub fn from_material(id: &str, source: MaterialError) -> Self {
        match source {
            MaterialError::DataFormat { .. } => PipelineError::DataFormat {
                source_name: id.to_string(),
                source,
            },
            _ => PipelineError::Material {
                id: id.to_string(),
                source,
            },
        }
    }
}
