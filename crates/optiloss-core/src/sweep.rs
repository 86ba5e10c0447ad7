//! Spectral sweep driver.
//!
//! For every wavelength the stack is assembled afresh, the solver is run
//! once per polarisation at the configured incidence angle, and the two
//! results are averaged 50/50 to model unpolarised light. The two ambient
//! entries are stripped from the absorption vector so only physical layers
//! remain.
//!
//! Any solver failure aborts the whole sweep and reports the wavelength it
//! occurred at; no partial spectra are returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::{Array2, ArrayView1, Axis};
use optiloss_materials::MaterialProvider;
use rayon::prelude::*;

use crate::error::PipelineError;
use crate::solver::{OpticalSolver, SolverError};
use crate::stack::{assemble, validate_layers};
use crate::types::{CoherencyTags, Polarization};

/// Tolerance on $R + T + \sum A - 1$ above which a warning is logged.
pub const ENERGY_TOLERANCE: f64 = 1e-3;

/// Execution options for a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Incidence angle in the ambient medium (radians).
    pub angle_rad: f64,
    /// Evaluate wavelengths on the Rayon thread pool.
    pub parallel: bool,
    /// Checked before each wavelength; when set the sweep stops with
    /// [`PipelineError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Optical response at one wavelength, averaged over polarisations.
#[derive(Debug, Clone)]
struct SweepPoint {
    reflectance: f64,
    transmittance: f64,
    /// Physical layers only.
    absorption: Vec<f64>,
}

/// Reflectance, transmittance and per-layer absorptance across a grid.
#[derive(Debug, Clone)]
pub struct SpectralSweepResult {
    pub wavelengths_nm: Vec<f64>,
    pub reflectance: Vec<f64>,
    pub transmittance: Vec<f64>,
    /// Absorptance, shape (layers, wavelengths), in stack order.
    pub absorption: Array2<f64>,
}

impl SpectralSweepResult {
    pub fn len(&self) -> usize {
        self.wavelengths_nm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths_nm.is_empty()
    }

    pub fn layer_count(&self) -> usize {
        self.absorption.nrows()
    }

    /// Absorptance spectrum of physical layer `layer` (0 = nearest the
    /// incident medium).
    pub fn layer_absorption(&self, layer: usize) -> ArrayView1<'_, f64> {
        self.absorption.row(layer)
    }

    /// Mean absorptance of each layer over the wavelength grid.
    ///
    /// An unweighted diagnostic; it has no photocurrent meaning.
    pub fn mean_absorption(&self) -> Vec<f64> {
        self.absorption
            .mean_axis(Axis(1))
            .map(|m| m.to_vec())
            .unwrap_or_else(|| vec![0.0; self.layer_count()])
    }

    /// $R + T + \sum_j A_j - 1$ at each wavelength.
    pub fn energy_residuals(&self) -> Vec<f64> {
        let absorbed = self.absorption.sum_axis(Axis(0));
        self.reflectance
            .iter()
            .zip(&self.transmittance)
            .zip(absorbed.iter())
            .map(|((r, t), a)| r + t + a - 1.0)
            .collect()
    }

    pub fn max_energy_residual(&self) -> f64 {
        self.energy_residuals()
            .into_iter()
            .fold(0.0_f64, |acc, r| acc.max(r.abs()))
    }
}

/// Reject empty or unordered grids and non-positive or non-finite wavelengths.
pub fn validate_grid(wavelengths_nm: &[f64]) -> Result<(), PipelineError> {
    if wavelengths_nm.is_empty() {
        return Err(PipelineError::Configuration(
            "Wavelength grid is empty".into(),
        ));
    }
    if let Some(bad) = wavelengths_nm.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(PipelineError::Configuration(format!(
            "Invalid wavelength {} nm in grid",
            bad
        )));
    }
    if let Some(pair) = wavelengths_nm.windows(2).find(|p| p[1] <= p[0]) {
        return Err(PipelineError::Configuration(format!(
            "Wavelength grid must be strictly increasing ({} nm followed by {} nm)",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Run the solver over `wavelengths_nm` for the given stack.
pub fn sweep<S: OpticalSolver + ?Sized>(
    solver: &S,
    wavelengths_nm: &[f64],
    thicknesses_nm: &[f64],
    coherency: &CoherencyTags,
    materials: &[Arc<dyn MaterialProvider>],
    options: &SweepOptions,
) -> Result<SpectralSweepResult, PipelineError> {
    validate_grid(wavelengths_nm)?;
    validate_layers(materials, thicknesses_nm)?;
    if coherency.len() != materials.len() + 2 {
        return Err(PipelineError::Configuration(format!(
            "{} coherency tags for {} layers (expected {})",
            coherency.len(),
            materials.len(),
            materials.len() + 2
        )));
    }

    log::info!(
        "Sweeping {} wavelengths ({:.1}–{:.1} nm) over {} layers with {}{}",
        wavelengths_nm.len(),
        wavelengths_nm[0],
        wavelengths_nm[wavelengths_nm.len() - 1],
        materials.len(),
        solver.method_name(),
        if options.parallel { " (parallel)" } else { "" }
    );

    let evaluate = |&wavelength_nm: &f64| -> Result<SweepPoint, PipelineError> {
        if let Some(flag) = &options.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(PipelineError::Cancelled { wavelength_nm });
            }
        }
        solve_point(
            solver,
            materials,
            thicknesses_nm,
            coherency,
            options.angle_rad,
            wavelength_nm,
        )
    };

    // In parallel mode every wavelength is evaluated before the first error
    // (in grid order) is reported, so both modes fail on the same wavelength.
    let points: Vec<SweepPoint> = if options.parallel {
        wavelengths_nm
            .par_iter()
            .map(evaluate)
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<_, _>>()?
    } else {
        wavelengths_nm
            .iter()
            .map(evaluate)
            .collect::<Result<_, _>>()?
    };

    let layers = materials.len();
    let absorption = Array2::from_shape_fn((layers, points.len()), |(j, i)| {
        points[i].absorption[j]
    });

    let result = SpectralSweepResult {
        wavelengths_nm: wavelengths_nm.to_vec(),
        reflectance: points.iter().map(|p| p.reflectance).collect(),
        transmittance: points.iter().map(|p| p.transmittance).collect(),
        absorption,
    };

    let residual = result.max_energy_residual();
    if residual > ENERGY_TOLERANCE {
        log::warn!(
            "Energy conservation residual {:.2e} exceeds tolerance {:.0e}",
            residual,
            ENERGY_TOLERANCE
        );
    } else {
        log::debug!("Max energy residual {:.2e}", residual);
    }

    Ok(result)
}

fn solve_point<S: OpticalSolver + ?Sized>(
    solver: &S,
    materials: &[Arc<dyn MaterialProvider>],
    thicknesses_nm: &[f64],
    coherency: &CoherencyTags,
    angle_rad: f64,
    wavelength_nm: f64,
) -> Result<SweepPoint, PipelineError> {
    let stack = assemble(materials, thicknesses_nm, wavelength_nm);
    let layers = stack.layer_count();
    let fail = |polarization: Polarization, source: SolverError| PipelineError::SolverConvergence {
        wavelength_nm,
        polarization,
        layers,
        source,
    };

    let mut reflectance = 0.0;
    let mut transmittance = 0.0;
    let mut absorption = vec![0.0; layers];

    for polarization in Polarization::BOTH {
        let solution = solver
            .solve_incoherent(polarization, &stack, coherency, angle_rad, wavelength_nm)
            .map_err(|e| fail(polarization, e))?;
        let absorbed = solver
            .absorption_per_layer(&solution)
            .map_err(|e| fail(polarization, e))?;

        if absorbed.len() != stack.len() {
            return Err(fail(
                polarization,
                SolverError::InvalidStack(format!(
                    "Absorption vector has {} entries for a stack of {}",
                    absorbed.len(),
                    stack.len()
                )),
            ));
        }
        let finite = solution.reflectance.is_finite()
            && solution.transmittance.is_finite()
            && absorbed.iter().all(|a| a.is_finite());
        if !finite {
            return Err(fail(
                polarization,
                SolverError::NonFinite("reflectance, transmittance or absorptance".into()),
            ));
        }

        reflectance += 0.5 * solution.reflectance;
        transmittance += 0.5 * solution.transmittance;
        for (acc, a) in absorption.iter_mut().zip(&absorbed[1..absorbed.len() - 1]) {
            *acc += 0.5 * a;
        }
    }

    log::debug!(
        "λ={:.2} nm: R={:.4} T={:.4} A={:?}",
        wavelength_nm,
        reflectance,
        transmittance,
        absorption
    );

    Ok(SweepPoint {
        reflectance,
        transmittance,
        absorption,
    })
}
