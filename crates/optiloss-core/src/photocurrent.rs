//! Photocurrent integration.
//!
//! Each optical channel (a physical layer, transmission or reflection) has a
//! fractional response at every grid wavelength. Its current density is
//!
//! $$J = \int \frac{q\lambda}{hc}\,\Phi(\lambda)\,A(\lambda)\,d\lambda$$
//!
//! evaluated with the trapezoidal rule over the (possibly non-uniform) grid.
//! Channels are integrated independently and never renormalised.

use serde::Serialize;

use crate::constants::charge_per_joule;
use crate::error::PipelineError;
use crate::spectrum::ReferenceSpectrum;
use crate::sweep::SpectralSweepResult;

pub const TRANSMISSION: &str = "Transmission";
pub const REFLECTION: &str = "Reflection";

/// A named response spectrum aligned to the sweep grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub name: String,
    pub response: Vec<f64>,
}

/// Integrated current density of one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelCurrent {
    pub name: String,
    pub current_density: f64,
}

/// Per-channel current densities in channel order.
#[derive(Debug, Clone, Serialize)]
pub struct PhotocurrentReport {
    pub spectrum: String,
    pub entries: Vec<ChannelCurrent>,
    /// Current with every photon collected over the grid.
    pub reference_current: f64,
}

impl PhotocurrentReport {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.current_density)
    }

    /// Sum over all channels. Equals the reference current when the
    /// channels partition the incident power.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.current_density).sum()
    }

    /// Share of the reference current carried by channel `name`.
    pub fn fraction(&self, name: &str) -> Option<f64> {
        if self.reference_current == 0.0 {
            return None;
        }
        self.get(name).map(|j| j / self.reference_current)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Presentation-order channels for a sweep: physical layers nearest the exit
/// first, then transmission, then reflection.
pub fn channels_from_sweep(
    result: &SpectralSweepResult,
    layer_names: &[String],
) -> Result<Vec<Channel>, PipelineError> {
    if layer_names.len() != result.layer_count() {
        return Err(PipelineError::Configuration(format!(
            "{} layer names for {} absorbing layers",
            layer_names.len(),
            result.layer_count()
        )));
    }

    let mut channels: Vec<Channel> = layer_names
        .iter()
        .enumerate()
        .rev()
        .map(|(j, name)| Channel {
            name: name.clone(),
            response: result.layer_absorption(j).to_vec(),
        })
        .collect();
    channels.push(Channel {
        name: TRANSMISSION.into(),
        response: result.transmittance.clone(),
    });
    channels.push(Channel {
        name: REFLECTION.into(),
        response: result.reflectance.clone(),
    });
    Ok(channels)
}

/// Trapezoidal integral of `y` over `x`. Fewer than two samples integrate
/// to zero.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| 0.5 * (yw[0] + yw[1]) * (xw[1] - xw[0]))
        .sum()
}

/// Integrate every channel against the reference spectrum.
pub fn integrate(
    wavelengths_nm: &[f64],
    channels: &[Channel],
    spectrum: &ReferenceSpectrum,
) -> Result<PhotocurrentReport, PipelineError> {
    if let Some(bad) = channels
        .iter()
        .find(|c| c.response.len() != wavelengths_nm.len())
    {
        return Err(PipelineError::Configuration(format!(
            "Channel '{}' has {} samples for a grid of {}",
            bad.name,
            bad.response.len(),
            wavelengths_nm.len()
        )));
    }

    let flux = spectrum.resample(wavelengths_nm)?;
    let photon_current: Vec<f64> = wavelengths_nm
        .iter()
        .zip(&flux)
        .map(|(&w, f)| charge_per_joule(w) * f)
        .collect();

    let entries: Vec<ChannelCurrent> = channels
        .iter()
        .map(|channel| {
            let integrand: Vec<f64> = photon_current
                .iter()
                .zip(&channel.response)
                .map(|(p, a)| p * a)
                .collect();
            ChannelCurrent {
                name: channel.name.clone(),
                current_density: trapezoid(wavelengths_nm, &integrand),
            }
        })
        .collect();
    let reference_current = trapezoid(wavelengths_nm, &photon_current);

    let report = PhotocurrentReport {
        spectrum: spectrum.name().to_string(),
        entries,
        reference_current,
    };
    log::info!(
        "Integrated {} channels against '{}': total {:.3} of {:.3}",
        report.len(),
        report.spectrum,
        report.total(),
        report.reference_current
    );
    Ok(report)
}
