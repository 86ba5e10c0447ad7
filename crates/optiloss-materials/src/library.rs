//! Registry resolving material identifiers to optical-constant sources.
//!
//! The library is populated explicitly (built-ins plus whatever a job file
//! declares); it never scans directories.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use num_complex::Complex64;

use crate::constant::ConstantMaterial;
use crate::interp::Interpolation;
use crate::palik;
use crate::provider::{MaterialError, MaterialProvider};
use crate::tabulated::TabulatedMaterial;

/// Where a material's optical constants come from.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSource {
    /// One of the datasets compiled into [`palik`].
    Builtin,
    /// A CSV table of wavelength (nm), n and k.
    File(PathBuf),
    /// A fixed complex index.
    Constant(Complex64),
}

impl std::fmt::Display for MaterialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialSource::Builtin => write!(f, "built-in"),
            MaterialSource::File(path) => write!(f, "{}", path.display()),
            MaterialSource::Constant(n) => write!(f, "constant n={} k={}", n.re, n.im),
        }
    }
}

/// Maps identifiers to sources and loads them on demand.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    entries: BTreeMap<String, MaterialSource>,
    interpolation: Interpolation,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new(Interpolation::default())
    }
}

impl MaterialLibrary {
    /// A library containing the built-in datasets.
    pub fn new(interpolation: Interpolation) -> Self {
        let entries = palik::BUILTIN_IDS
            .iter()
            .map(|id| (id.to_string(), MaterialSource::Builtin))
            .collect();
        Self {
            entries,
            interpolation,
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Register (or replace) a material.
    pub fn register(&mut self, id: impl Into<String>, source: MaterialSource) {
        let id = id.into();
        if let Some(previous) = self.entries.insert(id.clone(), source) {
            log::warn!("Material '{}' redefined (was {})", id, previous);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn source(&self, id: &str) -> Option<&MaterialSource> {
        self.entries.get(id)
    }

    /// Registered identifiers with their sources, sorted by identifier.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &MaterialSource)> {
        self.entries.iter().map(|(id, src)| (id.as_str(), src))
    }

    /// Load the material registered under `id`.
    pub fn load(&self, id: &str) -> Result<Arc<dyn MaterialProvider>, MaterialError> {
        let source = self
            .entries
            .get(id)
            .ok_or_else(|| MaterialError::NotFound(id.to_string()))?;

        let provider: Arc<dyn MaterialProvider> = match source {
            MaterialSource::Builtin => match id {
                "SiO2_Palik" => Arc::new(palik::sio2(self.interpolation)?),
                "TiO2_Palik" => Arc::new(palik::tio2(self.interpolation)?),
                _ => return Err(MaterialError::NotFound(id.to_string())),
            },
            MaterialSource::File(path) => {
                Arc::new(TabulatedMaterial::load(id, path, self.interpolation)?)
            }
            MaterialSource::Constant(index) => Arc::new(ConstantMaterial::new(id, *index)),
        };
        Ok(provider)
    }

    /// Load each identifier once, returning providers in the order requested.
    ///
    /// Repeated identifiers share one provider.
    pub fn load_all(&self, ids: &[&str]) -> Result<Vec<Arc<dyn MaterialProvider>>, MaterialError> {
        let mut loaded: BTreeMap<&str, Arc<dyn MaterialProvider>> = BTreeMap::new();
        ids.iter()
            .map(|&id| {
                if let Some(provider) = loaded.get(id) {
                    return Ok(Arc::clone(provider));
                }
                let provider = self.load(id)?;
                loaded.insert(id, Arc::clone(&provider));
                Ok(provider)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtins_are_registered() {
        let lib = MaterialLibrary::default();
        assert!(lib.contains("SiO2_Palik"));
        assert!(lib.contains("TiO2_Palik"));
        let sio2 = lib.load("SiO2_Palik").unwrap();
        assert!(sio2.name().contains("SiO"));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let lib = MaterialLibrary::default();
        assert!(matches!(lib.load("Unobtainium"), Err(MaterialError::NotFound(_))));
    }

    #[test]
    fn test_constant_and_file_sources() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wl,n,k\n400,2.0,0.1\n800,1.8,0.0").unwrap();

        let mut lib = MaterialLibrary::default();
        lib.register("glass", MaterialSource::Constant(Complex64::new(1.5, 0.0)));
        lib.register("absorber", MaterialSource::File(file.path().to_path_buf()));

        let glass = lib.load("glass").unwrap();
        assert_eq!(glass.refractive_index(550.0), Complex64::new(1.5, 0.0));

        let absorber = lib.load("absorber").unwrap();
        assert_eq!(absorber.refractive_index(400.0), Complex64::new(2.0, 0.1));
    }

    #[test]
    fn test_load_all_shares_repeated_ids() {
        let mut lib = MaterialLibrary::default();
        lib.register("glass", MaterialSource::Constant(Complex64::new(1.5, 0.0)));
        let loaded = lib.load_all(&["glass", "SiO2_Palik", "glass"]).unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(Arc::ptr_eq(&loaded[0], &loaded[2]));
    }
}
