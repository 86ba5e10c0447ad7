//! # Optiloss Core
//!
//! Spectral aggregation pipeline for thin-film optical-loss analysis.
//!
//! ## Pipeline
//!
//! 1. **Stack assembly** ([`stack`]): material index functions and
//!    thicknesses become an ambient-bounded [`LayerStack`] at one wavelength.
//! 2. **Spectral sweep** ([`sweep`]): an [`OpticalSolver`] is run for s and p
//!    polarisation at each wavelength and the results averaged.
//! 3. **Photocurrent integration** ([`photocurrent`]): channel responses are
//!    weighted by a [`ReferenceSpectrum`] and integrated to current densities.
//!
//! [`pipeline::analyse`] runs all three after validating the request. The
//! transfer-matrix solver itself is supplied by the caller.

pub mod constants;
pub mod error;
pub mod photocurrent;
pub mod pipeline;
pub mod solver;
pub mod spectrum;
pub mod stack;
pub mod sweep;
pub mod types;

pub use error::PipelineError;
pub use photocurrent::{
    channels_from_sweep, integrate, Channel, ChannelCurrent, PhotocurrentReport, REFLECTION,
    TRANSMISSION,
};
pub use pipeline::{analyse, Layer, OpticalLossAnalysis};
pub use solver::{IncoherentSolution, LayerPower, OpticalSolver, SolverError};
pub use spectrum::ReferenceSpectrum;
pub use stack::assemble;
pub use sweep::{sweep, SpectralSweepResult, SweepOptions};
pub use types::{Coherency, CoherencyTags, LayerStack, Polarization};
