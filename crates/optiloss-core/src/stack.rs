//! Stack assembly: material index functions + thicknesses → ambient-bounded
//! layer stack at one wavelength.

use std::sync::Arc;

use optiloss_materials::MaterialProvider;

use crate::constants::AMBIENT_INDEX;
use crate::error::PipelineError;
use crate::types::LayerStack;

/// Check that thicknesses are usable for a sweep: one per material, each
/// positive and finite.
pub fn validate_layers(
    materials: &[Arc<dyn MaterialProvider>],
    thicknesses_nm: &[f64],
) -> Result<(), PipelineError> {
    if materials.is_empty() {
        return Err(PipelineError::Configuration(
            "At least one layer is required".into(),
        ));
    }
    if materials.len() != thicknesses_nm.len() {
        return Err(PipelineError::Configuration(format!(
            "{} materials but {} thicknesses",
            materials.len(),
            thicknesses_nm.len()
        )));
    }
    if let Some((i, d)) = thicknesses_nm
        .iter()
        .enumerate()
        .find(|(_, d)| !(d.is_finite() && **d > 0.0))
    {
        return Err(PipelineError::Configuration(format!(
            "Layer {} ({}) has invalid thickness {} nm; thicknesses must be positive",
            i + 1,
            materials[i].name(),
            d
        )));
    }
    Ok(())
}

/// Build the stack seen by the solver at `wavelength_nm`.
///
/// The result is bounded by the ambient medium ($\tilde{n} = 1$, infinite
/// thickness) on both sides. Pure: each call allocates a fresh stack.
pub fn assemble(
    materials: &[Arc<dyn MaterialProvider>],
    thicknesses_nm: &[f64],
    wavelength_nm: f64,
) -> LayerStack {
    debug_assert_eq!(materials.len(), thicknesses_nm.len());

    let mut indices = Vec::with_capacity(materials.len() + 2);
    indices.push(AMBIENT_INDEX);
    indices.extend(materials.iter().map(|m| m.refractive_index(wavelength_nm)));
    indices.push(AMBIENT_INDEX);

    let mut thicknesses = Vec::with_capacity(thicknesses_nm.len() + 2);
    thicknesses.push(f64::INFINITY);
    thicknesses.extend_from_slice(thicknesses_nm);
    thicknesses.push(f64::INFINITY);

    LayerStack {
        indices,
        thicknesses_nm: thicknesses,
    }
}
