//! `ledger_app.toml` manifest and Rust `Cargo.toml` reading

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{Device, Language};

pub const MANIFEST_FILE: &str = "ledger_app.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppManifest {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub use_cases: BTreeMap<String, String>,
    #[serde(default)]
    pub tests: TestsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSection {
    pub build_directory: Option<String>,
    pub sdk: Option<Language>,
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestsSection {
    pub pytest_directory: Option<String>,
    pub unit_directory: Option<String>,
}

impl AppManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
            .map_err(|e| Error::ManifestError(format!("{}: {e}", path.display())))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::ManifestError(e.to_string()))
    }

    /// Load the manifest at the root of `folder`, if there is one.
    /// A manifest that fails to parse is logged and ignored.
    pub fn find_in(folder: &Path) -> Option<Self> {
        let path = folder.join(MANIFEST_FILE);
        if !path.is_file() {
            return None;
        }
        match Self::load(&path) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!("Ignoring unreadable manifest: {e}");
                None
            }
        }
    }

    pub fn build_dir(&self) -> Option<PathBuf> {
        self.app.build_directory.as_deref().map(normalize_relative)
    }

    pub fn pytest_dir(&self) -> Option<PathBuf> {
        self.tests.pytest_directory.as_deref().map(normalize_relative)
    }

    /// Devices listed in the manifest; unknown names are skipped
    pub fn devices(&self) -> Vec<Device> {
        let mut devices = Vec::new();
        for name in &self.app.devices {
            match Device::parse(name) {
                Some(device) if !devices.contains(&device) => devices.push(device),
                Some(_) => {}
                None => tracing::warn!("Unknown device '{}' in {}", name, MANIFEST_FILE),
            }
        }
        devices
    }
}

/// Turn `./tests/` style manifest paths into `tests`, and `./` into `.`
fn normalize_relative(raw: &str) -> PathBuf {
    let trimmed = raw.trim().trim_start_matches("./").trim_end_matches('/');
    if trimmed.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(trimmed)
    }
}

/// Package name from the `Cargo.toml` in `dir`, for Rust apps
pub fn rust_package_name(dir: &Path) -> Option<String> {
    let bytes = std::fs::read(dir.join("Cargo.toml")).ok()?;
    match cargo_toml::Manifest::from_slice(&bytes) {
        Ok(manifest) => manifest.package.map(|p| p.name),
        Err(e) => {
            tracing::warn!("Failed to parse Cargo.toml in {:?}: {}", dir, e);
            None
        }
    }
}
