use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".ledgerdev.json";
pub const ALT_CONFIG_FILE: &str = "ledgerdev.json";
pub const DOCKER_IMAGE_ENV: &str = "LEDGERDEV_DOCKER_IMAGE";

pub const DEFAULT_DOCKER_IMAGE: &str =
    "ghcr.io/ledgerhq/ledger-app-builder/ledger-app-dev-tools:latest";
pub const DEFAULT_ONBOARDING_PIN: &str = "1234";
pub const DEFAULT_ONBOARDING_SEED: &str = "glory promote mansion idle axis finger extra february uncover one trip resource lawn turtle enact monster seven myth punch hobby comfort wild raise skin";

/// Settings stored per app, keyed by the app folder name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_device: Option<String>,
    /// Device restored when leaving the `All` target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_use_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzz_harness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzz_crash: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_tests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub docker_image: String,
    pub onboarding_pin: String,
    pub onboarding_seed: String,
    /// Extra shell fragment run before test dependencies, per app folder name
    pub additional_deps_per_app: BTreeMap<String, String>,
    pub open_container_as_root: bool,
    /// Workspace folders, relative to the directory holding the config file
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workspace_folders: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_app: Option<String>,
    pub apps: BTreeMap<String, AppSettings>,

    // Where the config was loaded from (internal, not exposed in JSON)
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker_image: DEFAULT_DOCKER_IMAGE.to_string(),
            onboarding_pin: DEFAULT_ONBOARDING_PIN.to_string(),
            onboarding_seed: DEFAULT_ONBOARDING_SEED.to_string(),
            additional_deps_per_app: BTreeMap::new(),
            open_container_as_root: false,
            workspace_folders: Vec::new(),
            selected_app: None,
            apps: BTreeMap::new(),
            path: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Save back to the file the config came from; a config that was never
    /// bound to a file is kept in memory only.
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to_file(path),
            None => Ok(()),
        }
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            let config_path = current.join(ALT_CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest config above `start_path`, or defaults bound to
    /// `<start_path>/.ledgerdev.json` so that selections can be saved.
    pub fn discover(start_path: &Path) -> Result<Self> {
        let mut config = match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load_from_file(&path)?
            }
            None => Self {
                path: Some(start_path.join(CONFIG_FILE)),
                ..Self::default()
            },
        };
        config.apply_env_overrides(std::env::var(DOCKER_IMAGE_ENV).ok());
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, docker_image: Option<String>) {
        if let Some(image) = docker_image.filter(|i| !i.trim().is_empty()) {
            tracing::debug!("Docker image overridden from environment: {}", image);
            self.docker_image = image;
        }
    }

    /// Directory that relative workspace folders are resolved against
    pub fn base_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    pub fn resolved_workspace_folders(&self) -> Vec<PathBuf> {
        let base = self.base_dir().unwrap_or_else(|| Path::new("."));
        self.workspace_folders
            .iter()
            .map(|folder| {
                if folder.is_absolute() {
                    folder.clone()
                } else {
                    base.join(folder)
                }
            })
            .collect()
    }

    pub fn app_settings(&self, folder_name: &str) -> AppSettings {
        self.apps.get(folder_name).cloned().unwrap_or_default()
    }

    pub fn app_settings_mut(&mut self, folder_name: &str) -> &mut AppSettings {
        self.apps.entry(folder_name.to_string()).or_default()
    }

    pub fn additional_deps(&self, folder_name: &str) -> Option<&str> {
        self.additional_deps_per_app
            .get(folder_name)
            .map(String::as_str)
            .filter(|deps| !deps.trim().is_empty())
    }
}
