//! # Optiloss TMM
//!
//! Incoherent transfer-matrix solver for planar multilayers, implementing
//! [`optiloss_core::OpticalSolver`].
//!
//! - [`fresnel`]: Snell's law with complex cosines and Fresnel reflectances.
//! - [`incoherent`]: intensity transfer matrices and per-layer power flow.
//!
//! Interface transmittance is $1 - R$ (see [`fresnel::InterfacePower`]). Where
//! an absorbing layer meets another absorbing layer this differs from the
//! $|t|^2 \mathrm{Re}(n_f \cos\theta_f) / \mathrm{Re}(n_i \cos\theta_i)$
//! convention of the Python `tmm` package (`inc_tmm`), by about 12% at normal
//! incidence from $2.6 + 0.9i$ into $1.46$. Stacks whose absorbers are only
//! bordered by lossless media give the same results in both.
//!
//! ```no_run
//! use optiloss_core::{analyse, SweepOptions};
//! use optiloss_tmm::IncoherentTmm;
//! # fn run(layers: &[optiloss_core::Layer], spectrum: &optiloss_core::ReferenceSpectrum) {
//! let grid: Vec<f64> = (0..500).map(|i| 280.0 + 620.0 * i as f64 / 499.0).collect();
//! let analysis = analyse(&IncoherentTmm, layers, &grid, spectrum, &SweepOptions::default());
//! # }
//! ```

pub mod fresnel;
pub mod incoherent;

pub use incoherent::IncoherentTmm;
