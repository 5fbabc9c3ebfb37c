//! Deployment settings: service area, shortlist size, provider options and
//! catalog source. Read from an optional JSON file; every field defaults.

use crate::area::ServiceAreaPolicy;
use crate::catalog::{Catalog, CatalogError};
use crate::location::LocationOptions;
use crate::proximity::ProximityResolver;
use crate::ranking::DEFAULT_TOP_K;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read settings file {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid service-area radius {0} km")]
    InvalidRadius(f64),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// ~/.gohubs, falling back to ./.gohubs without a home directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gohubs")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service_area: ServiceAreaPolicy,
    pub top_k: usize,
    pub location: LocationOptions,
    /// JSON catalog file; the built-in GOHUBS centers when absent.
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_area: ServiceAreaPolicy::default(),
            top_k: DEFAULT_TOP_K,
            location: LocationOptions::default(),
            catalog_path: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        app_dir().join("settings.json")
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = serde_json::from_str(&data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from the default file if it exists, built-in defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading settings");
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = self.service_area.radius_km;
        if !r.is_finite() || r < 0.0 {
            return Err(ConfigError::InvalidRadius(r));
        }
        Ok(())
    }

    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => Ok(Catalog::load_from(path)?),
            None => Ok(Catalog::builtin()),
        }
    }

    pub fn build_resolver(&self) -> Result<ProximityResolver, ConfigError> {
        self.validate()?;
        let catalog = self.load_catalog()?;
        tracing::debug!(centers = catalog.len(), radius_km = self.service_area.radius_km, "resolver configured");
        Ok(ProximityResolver::new(catalog, self.service_area).with_top_k(self.top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.top_k, 4);
        assert_eq!(s.service_area.radius_km, 100.0);
        assert!((s.service_area.anchor.lat() - 17.6868).abs() < 1e-9);
        assert!(s.catalog_path.is_none());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "top_k": 2,
                "service_area": {"anchor": {"lat": 17.0, "lon": 82.0}, "radius_km": 50},
                "location": {"timeout": 3}
            }"#,
        )
        .unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.top_k, 2);
        assert_eq!(s.service_area.radius_km, 50.0);
        assert_eq!(s.location.timeout, Duration::from_secs(3));
        assert!(s.location.high_accuracy);
    }

    #[test]
    fn test_invalid_anchor_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"service_area": {"anchor": {"lat": 91, "lon": 0}, "radius_km": 5}}"#).unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"service_area": {"anchor": {"lat": 17, "lon": 83}, "radius_km": -1}}"#).unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::InvalidRadius(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_build_resolver_with_catalog_file() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("centers.json");
        fs::write(&catalog, r#"[{"id": "x", "name": "X", "lat": 17.69, "lon": 83.2}]"#).unwrap();

        let settings = Settings { catalog_path: Some(catalog), ..Default::default() };
        let resolver = settings.build_resolver().unwrap();
        assert_eq!(resolver.catalog().len(), 1);
        assert_eq!(resolver.top_k(), 4);
    }

    #[test]
    fn test_build_resolver_bad_catalog() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            catalog_path: Some(dir.path().join("missing.json")),
            ..Default::default()
        };
        assert!(matches!(settings.build_resolver(), Err(ConfigError::Catalog(_))));
    }
}
