//! End-to-end optical-loss analysis: validate, sweep, integrate.

use std::sync::Arc;

use optiloss_materials::MaterialProvider;

use crate::error::PipelineError;
use crate::photocurrent::{channels_from_sweep, integrate, Channel, PhotocurrentReport};
use crate::solver::OpticalSolver;
use crate::spectrum::ReferenceSpectrum;
use crate::stack::validate_layers;
use crate::sweep::{sweep, validate_grid, SpectralSweepResult, SweepOptions};
use crate::types::CoherencyTags;

/// A layer of the stack: display name, material and thickness.
#[derive(Clone)]
pub struct Layer {
    pub name: String,
    pub material: Arc<dyn MaterialProvider>,
    pub thickness_nm: f64,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("material", &self.material.name())
            .field("thickness_nm", &self.thickness_nm)
            .finish()
    }
}

/// Everything the analysis produces for one stack.
#[derive(Debug, Clone)]
pub struct OpticalLossAnalysis {
    /// Layer names in stack order.
    pub layer_names: Vec<String>,
    pub sweep: SpectralSweepResult,
    /// Channel spectra in presentation order.
    pub channels: Vec<Channel>,
    pub report: PhotocurrentReport,
}

/// Check every input that can be checked without solving.
pub fn validate(
    layers: &[Layer],
    wavelengths_nm: &[f64],
    spectrum: &ReferenceSpectrum,
) -> Result<(), PipelineError> {
    let (materials, thicknesses) = split_layers(layers);
    validate_layers(&materials, &thicknesses)?;
    validate_grid(wavelengths_nm)?;
    spectrum.check_coverage(wavelengths_nm)
}

/// Sweep the stack over `wavelengths_nm` with all layers incoherent and
/// integrate the channel spectra against `spectrum`.
///
/// All configuration errors are raised before the solver is first called.
pub fn analyse<S: OpticalSolver + ?Sized>(
    solver: &S,
    layers: &[Layer],
    wavelengths_nm: &[f64],
    spectrum: &ReferenceSpectrum,
    options: &SweepOptions,
) -> Result<OpticalLossAnalysis, PipelineError> {
    validate(layers, wavelengths_nm, spectrum)?;

    let (materials, thicknesses) = split_layers(layers);
    let coherency = CoherencyTags::all_incoherent(layers.len());
    let result = sweep(
        solver,
        wavelengths_nm,
        &thicknesses,
        &coherency,
        &materials,
        options,
    )?;

    let names: Vec<String> = layers.iter().map(|l| l.name.clone()).collect();
    let channels = channels_from_sweep(&result, &names)?;
    let report = integrate(wavelengths_nm, &channels, spectrum)?;

    Ok(OpticalLossAnalysis {
        layer_names: names,
        sweep: result,
        channels,
        report,
    })
}

fn split_layers(layers: &[Layer]) -> (Vec<Arc<dyn MaterialProvider>>, Vec<f64>) {
    layers
        .iter()
        .map(|l| (Arc::clone(&l.material), l.thickness_nm))
        .unzip()
}
