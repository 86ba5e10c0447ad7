//! # Optiloss Materials
//!
//! Optical-constant providers for thin-film stacks. Every material implements
//! [`MaterialProvider`](provider::MaterialProvider), which maps photon energy
//! to a complex refractive index $\tilde{n} = n + ik$.
//!
//! ## Sources
//!
//! | Source | Module |
//! |--------|--------|
//! | CSV tables of (λ, n, k) | [`tabulated`] |
//! | Palik handbook (TiO₂, SiO₂) | [`palik`] |
//! | Fixed index | [`constant`] |
//!
//! Tabulated data is interpolated over photon energy, linearly by default or
//! with a natural cubic spline ([`spline::CubicSpline`]), and extrapolated
//! linearly outside the data range.

pub mod constant;
pub mod interp;
pub mod library;
pub mod palik;
pub mod provider;
pub mod spline;
pub mod tabular;
pub mod tabulated;

pub use constant::ConstantMaterial;
pub use interp::Interpolation;
pub use library::{MaterialLibrary, MaterialSource};
pub use provider::{wavelength_to_energy, MaterialError, MaterialProvider, HC_EV_NM};
pub use tabulated::TabulatedMaterial;
