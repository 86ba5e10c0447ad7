//! Dispersionless materials with a fixed complex refractive index.

use num_complex::Complex64;

use crate::provider::MaterialProvider;

/// A material whose index does not depend on photon energy.
#[derive(Debug, Clone)]
pub struct ConstantMaterial {
    name: String,
    index: Complex64,
}

impl ConstantMaterial {
    pub fn new(name: impl Into<String>, index: Complex64) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Vacuum / air, $\tilde{n} = 1$.
    pub fn vacuum() -> Self {
        Self::new("Vacuum", Complex64::new(1.0, 0.0))
    }
}

impl MaterialProvider for ConstantMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }

    fn index_at_energy(&self, _energy_ev: f64) -> Complex64 {
        self.index
    }
}
