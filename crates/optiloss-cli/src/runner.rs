//! Analysis runner: ties together materials, spectrum, solver and output.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use optiloss_core::pipeline::validate;
use optiloss_core::{
    analyse, Layer, OpticalLossAnalysis, PhotocurrentReport, ReferenceSpectrum, SweepOptions,
};
use optiloss_materials::MaterialLibrary;
use optiloss_tmm::IncoherentTmm;

use crate::config::{resolve, JobConfig};

/// Everything needed to run a job, loaded and validated.
pub struct PreparedJob {
    pub layers: Vec<Layer>,
    pub wavelengths: Vec<f64>,
    pub spectrum: ReferenceSpectrum,
    pub options: SweepOptions,
}

/// Built-in materials plus those declared in the job.
pub fn build_library(job: &JobConfig) -> Result<MaterialLibrary> {
    let mut library = MaterialLibrary::new(job.simulation.interpolation);
    for material in &job.materials {
        library.register(material.id.clone(), material.source(&job.base_dir)?);
    }
    Ok(library)
}

/// Load materials and spectrum and validate the request without solving.
pub fn prepare(job: &JobConfig) -> Result<PreparedJob> {
    let library = build_library(job)?;
    let ids: Vec<&str> = job.layers.iter().map(|l| l.material.as_str()).collect();
    let providers = library
        .load_all(&ids)
        .context("Failed to load layer materials")?;

    let names = layer_names(job);
    let layers: Vec<Layer> = providers
        .into_iter()
        .zip(names)
        .zip(&job.layers)
        .map(|((material, name), layer)| Layer {
            name,
            material,
            thickness_nm: layer.thickness,
        })
        .collect();

    let spectrum_path = resolve(&job.base_dir, &job.spectrum.file);
    let spectrum = ReferenceSpectrum::load(job.spectrum.name.clone(), &spectrum_path)
        .with_context(|| format!("Failed to load spectrum {}", spectrum_path.display()))?;

    let wavelengths = job.simulation.wavelengths.grid();
    validate(&layers, &wavelengths, &spectrum)?;

    let grid_lo = wavelengths.iter().copied().fold(f64::INFINITY, f64::min);
    let grid_hi = wavelengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    for layer in &layers {
        let (lo, hi) = layer.material.wavelength_range();
        if grid_lo < lo || grid_hi > hi {
            log::warn!(
                "Layer '{}': grid extends beyond tabulated data ({:.1}–{:.1} nm); values are extrapolated",
                layer.name,
                lo,
                hi
            );
        }
    }

    let options = SweepOptions {
        angle_rad: job.simulation.incidence_angle_deg.to_radians(),
        parallel: job.simulation.parallel,
        cancel: None,
    };

    Ok(PreparedJob {
        layers,
        wavelengths,
        spectrum,
        options,
    })
}

/// Channel names: an explicit `name`, else the material identifier.
/// Repeated names get the layer position appended.
fn layer_names(job: &JobConfig) -> Vec<String> {
    let base: Vec<String> = job
        .layers
        .iter()
        .map(|l| l.name.clone().unwrap_or_else(|| l.material.clone()))
        .collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &base {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    base.iter()
        .enumerate()
        .map(|(i, name)| {
            if counts[name.as_str()] > 1 {
                format!("{} (layer {})", name, i + 1)
            } else {
                name.clone()
            }
        })
        .collect()
}

/// Run a full analysis from a parsed job configuration.
pub fn run_analysis(job: &JobConfig) -> Result<OpticalLossAnalysis> {
    let prepared = prepare(job)?;
    for (i, layer) in prepared.layers.iter().enumerate() {
        println!(
            "  Layer {}: {} ({}, {} nm)",
            i + 1,
            layer.name,
            layer.material.name(),
            layer.thickness_nm
        );
    }
    println!(
        "Sweeping {} wavelengths, {:.1}–{:.1} nm",
        prepared.wavelengths.len(),
        prepared.wavelengths[0],
        prepared.wavelengths[prepared.wavelengths.len() - 1]
    );

    let analysis = analyse(
        &IncoherentTmm,
        &prepared.layers,
        &prepared.wavelengths,
        &prepared.spectrum,
        &prepared.options,
    )?;
    Ok(analysis)
}

/// The per-channel current table.
pub fn format_report(report: &PhotocurrentReport) -> String {
    let width = report
        .entries
        .iter()
        .map(|e| e.name.chars().count())
        .chain(std::iter::once("Layer".len()))
        .max()
        .unwrap_or(5);
    let mut table = format!("{:<width$}  {:>10}\n", "Layer", "J (mA/cm²)");
    for entry in &report.entries {
        table.push_str(&format!(
            "{:<width$}  {:>10.2}\n",
            entry.name, entry.current_density
        ));
    }
    table
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    Ok(())
}

/// Write channel spectra (presentation order) to a CSV file with a
/// metadata header.
pub fn write_spectra_csv(
    analysis: &OpticalLossAnalysis,
    path: &Path,
    job: &JobConfig,
) -> Result<()> {
    create_parent(path)?;
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# Optiloss channel spectra")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# incidence_angle_deg: {}", job.simulation.incidence_angle_deg)?;
    for layer in &job.layers {
        writeln!(file, "# layer: material={}, thickness={} nm", layer.material, layer.thickness)?;
    }
    writeln!(file, "#")?;

    let header: Vec<&str> = std::iter::once("wavelength_nm")
        .chain(analysis.channels.iter().map(|c| c.name.as_str()))
        .collect();
    writeln!(file, "{}", header.join(","))?;

    for (i, wl) in analysis.sweep.wavelengths_nm.iter().enumerate() {
        let mut row = format!("{:.2}", wl);
        for channel in &analysis.channels {
            row.push_str(&format!(",{:.6e}", channel.response[i]));
        }
        writeln!(file, "{}", row)?;
    }

    println!("Spectra written to: {}", path.display());
    Ok(())
}

/// Write the photocurrent table to a CSV file.
pub fn write_report_csv(report: &PhotocurrentReport, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# Optiloss photocurrent, spectrum: {}", report.spectrum)?;
    writeln!(file, "# reference_current_mA_cm2: {:.6}", report.reference_current)?;
    writeln!(file, "channel,current_density_mA_cm2,fraction")?;
    for entry in &report.entries {
        writeln!(
            file,
            "{},{:.6},{:.6}",
            entry.name,
            entry.current_density,
            report.fraction(&entry.name).unwrap_or(0.0)
        )?;
    }

    println!("Photocurrent written to: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct JsonLayer<'a> {
    name: &'a str,
    absorption: Vec<f64>,
}

#[derive(Serialize)]
struct JsonResults<'a> {
    wavelengths_nm: &'a [f64],
    reflectance: &'a [f64],
    transmittance: &'a [f64],
    layers: Vec<JsonLayer<'a>>,
    photocurrent: &'a PhotocurrentReport,
}

/// Write the full result (sweep and report) to a JSON file.
pub fn write_json(analysis: &OpticalLossAnalysis, path: &Path) -> Result<()> {
    create_parent(path)?;
    let sweep = &analysis.sweep;
    let results = JsonResults {
        wavelengths_nm: &sweep.wavelengths_nm,
        reflectance: &sweep.reflectance,
        transmittance: &sweep.transmittance,
        layers: analysis
            .layer_names
            .iter()
            .enumerate()
            .map(|(j, name)| JsonLayer {
                name,
                absorption: sweep.layer_absorption(j).to_vec(),
            })
            .collect(),
        photocurrent: &analysis.report,
    };

    let json = serde_json::to_string_pretty(&results)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Results (JSON) written to: {}", path.display());
    Ok(())
}
