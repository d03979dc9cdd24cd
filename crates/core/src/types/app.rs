use serde::Serialize;
use std::path::{Path, PathBuf};

use super::Device;
use crate::impl_case_insensitive_deserialize;

/// Name reported for apps whose Makefile has no `APPNAME` assignment
pub const UNKNOWN_APP_NAME: &str = "unknown";

/// Build use case every app has, building with no extra make flags
pub const DEFAULT_BUILD_USE_CASE: &str = "release";

/// SDK language of an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Language {
    #[default]
    C,
    Rust,
}

impl_case_insensitive_deserialize!(
    Language,
    C => "c",
    Rust => "rust"
);

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Rust => "Rust",
        }
    }
}

/// A named set of extra make flags, e.g. `debug = "DEBUG=1"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildUseCase {
    pub name: String,
    pub flags: String,
}

/// Makefile variant parameter and the values it accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantInfo {
    pub param: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzingInfo {
    /// Fuzzing directory relative to the app folder
    pub directory: PathBuf,
    pub harnesses: Vec<String>,
    /// Recorded crash inputs, relative to the fuzzing directory
    pub crashes: Vec<String>,
}

/// An embedded app discovered in a workspace folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct App {
    pub name: String,
    /// Name of the workspace folder holding the app, used as its identity
    pub folder_name: String,
    pub folder_path: PathBuf,
    /// Directory holding the build descriptor, relative to `folder_path`
    pub build_dir: PathBuf,
    pub container_name: String,
    pub language: Language,
    pub compatible_devices: Vec<Device>,
    pub build_use_cases: Vec<BuildUseCase>,
    pub pytest_dir: PathBuf,
    pub variants: Option<VariantInfo>,
    pub fuzzing: Option<FuzzingInfo>,
}

impl App {
    /// Create an app rooted at `folder_path` with defaults for everything
    /// the build descriptor does not say.
    pub fn new(name: impl Into<String>, folder_path: &Path, language: Language) -> Self {
        let folder_name = folder_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app")
            .to_string();
        Self {
            name: name.into(),
            container_name: container_name_for(&folder_name),
            folder_name,
            folder_path: folder_path.to_path_buf(),
            build_dir: PathBuf::from("."),
            language,
            compatible_devices: Device::ALL.to_vec(),
            build_use_cases: vec![BuildUseCase {
                name: DEFAULT_BUILD_USE_CASE.to_string(),
                flags: String::new(),
            }],
            pytest_dir: PathBuf::from("tests"),
            variants: None,
            fuzzing: None,
        }
    }

    pub fn is_compatible(&self, device: Device) -> bool {
        self.compatible_devices.contains(&device)
    }

    /// First compatible device, used as the fallback selection
    pub fn default_device(&self) -> Device {
        self.compatible_devices
            .first()
            .copied()
            .unwrap_or(Device::NanoX)
    }

    pub fn build_use_case(&self, name: &str) -> Option<&BuildUseCase> {
        self.build_use_cases.iter().find(|u| u.name == name)
    }

    /// True when the build descriptor lives in the app folder itself
    pub fn builds_in_root(&self) -> bool {
        self.build_dir.as_os_str().is_empty() || self.build_dir == Path::new(".")
    }
}

pub fn container_name_for(folder_name: &str) -> String {
    format!("{folder_name}-container")
}
