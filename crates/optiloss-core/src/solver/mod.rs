//! Optical solver contract.
//!
//! The sweep drives any implementation of [`OpticalSolver`]; the transfer
//! matrix algorithm itself lives outside this crate. Implementations must be
//! `Send + Sync` so a sweep can evaluate wavelengths on several threads.

use thiserror::Error;

use crate::types::{CoherencyTags, LayerStack, Polarization};

/// Errors that can occur during a single solve.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Degenerate stack: {0}")]
    Degenerate(String),

    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    #[error("Non-finite result: {0}")]
    NonFinite(String),

    #[error("Invalid stack: {0}")]
    InvalidStack(String),
}

/// Net power flow at the two faces of one stack entry.
///
/// Powers are normalised to the incident power. For the incident medium the
/// "leaving" value is taken at the first interface; for the exit medium the
/// "entering" value is the transmitted power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPower {
    pub entering: f64,
    pub leaving: f64,
}

/// Result of an incoherent solve for one polarisation and wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct IncoherentSolution {
    pub polarization: Polarization,
    pub wavelength_nm: f64,
    /// Incidence angle in the first medium (radians).
    pub angle_rad: f64,
    pub reflectance: f64,
    pub transmittance: f64,
    /// One entry per stack entry, boundary media included.
    pub layer_power: Vec<LayerPower>,
}

/// Interface every optical solver must implement.
pub trait OpticalSolver: Send + Sync {
    /// Solve the stack for reflectance, transmittance and the power flow in
    /// each layer.
    fn solve_incoherent(
        &self,
        polarization: Polarization,
        stack: &LayerStack,
        coherency: &CoherencyTags,
        angle_rad: f64,
        wavelength_nm: f64,
    ) -> Result<IncoherentSolution, SolverError>;

    /// Fraction of incident power absorbed in each stack entry.
    ///
    /// Entry 0 is the reflectance, the last entry the transmittance, and the
    /// entries in between the physical layers' absorptances, so the vector
    /// sums to one.
    fn absorption_per_layer(&self, solution: &IncoherentSolution) -> Result<Vec<f64>, SolverError> {
        let n = solution.layer_power.len();
        if n < 2 {
            return Err(SolverError::InvalidStack(format!(
                "Solution has {} layers; at least the two ambient media are required",
                n
            )));
        }
        let mut absorbed = Vec::with_capacity(n);
        absorbed.push(solution.reflectance);
        absorbed.extend(
            solution.layer_power[1..n - 1]
                .iter()
                .map(|p| p.entering - p.leaving),
        );
        absorbed.push(solution.transmittance);
        Ok(absorbed)
    }

    /// Human-readable name of the method.
    fn method_name(&self) -> &str;
}
