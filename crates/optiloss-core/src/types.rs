//! Core types shared across the pipeline: polarisation, coherency tags and
//! the layer stack handed to the solver.

use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Polarisation state of the incident plane wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    /// Electric field perpendicular to the plane of incidence (TE).
    S,
    /// Electric field in the plane of incidence (TM).
    P,
}

impl Polarization {
    pub const BOTH: [Polarization; 2] = [Polarization::S, Polarization::P];
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarization::S => write!(f, "s"),
            Polarization::P => write!(f, "p"),
        }
    }
}

/// Whether a layer keeps phase information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coherency {
    /// Thin-film interference is resolved.
    Coherent,
    /// Intensity-only, phase-averaged propagation.
    Incoherent,
}

/// One coherency tag per stack entry, boundary media included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoherencyTags(Vec<Coherency>);

impl CoherencyTags {
    /// Tags for `layer_count` physical layers plus the two ambient media, all
    /// incoherent.
    pub fn all_incoherent(layer_count: usize) -> Self {
        Self(vec![Coherency::Incoherent; layer_count + 2])
    }

    pub fn from_vec(tags: Vec<Coherency>) -> Self {
        Self(tags)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Coherency] {
        &self.0
    }
}

/// The ambient-bounded stack at a single wavelength.
///
/// `indices[0]` and `indices[len-1]` are the semi-infinite incident and exit
/// media; their thicknesses are `f64::INFINITY`. Both vectors always have
/// `layer_count() + 2` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    pub indices: Vec<Complex64>,
    pub thicknesses_nm: Vec<f64>,
}

impl LayerStack {
    /// Number of physical (finite) layers.
    pub fn layer_count(&self) -> usize {
        self.indices.len().saturating_sub(2)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether the structural invariants hold: matching lengths, at least the
    /// two ambient media, infinite boundaries and finite non-negative interior
    /// thicknesses.
    pub fn is_well_formed(&self) -> bool {
        let n = self.indices.len();
        n >= 2
            && self.thicknesses_nm.len() == n
            && self.thicknesses_nm[0].is_infinite()
            && self.thicknesses_nm[n - 1].is_infinite()
            && self.thicknesses_nm[1..n - 1]
                .iter()
                .all(|d| d.is_finite() && *d >= 0.0)
    }
}
