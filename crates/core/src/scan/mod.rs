//! Discovery of apps in workspace folders
//!
//! A workspace folder holds an app when it contains a Makefile including the
//! SDK definitions within two directory levels, or a `ledger_app.toml`
//! manifest at its root. Scanning never fails: folders that cannot be read
//! simply contribute no app.

pub mod fuzzing;
pub mod makefile;
pub mod manifest;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::{App, BuildUseCase, DEFAULT_BUILD_USE_CASE, Language, UNKNOWN_APP_NAME};
use makefile::{find_sdk_makefile, parse_app_name, parse_variants};
use manifest::{AppManifest, rust_package_name};

pub use makefile::SDK_MARKER;
pub use manifest::MANIFEST_FILE;

/// Scan every workspace folder, in order, for apps
pub fn scan(workspace_folders: &[PathBuf]) -> Vec<App> {
    let apps: Vec<App> = workspace_folders
        .iter()
        .filter_map(|folder| scan_folder(folder))
        .collect();
    info!(
        "Found {} app(s) in {} workspace folder(s)",
        apps.len(),
        workspace_folders.len()
    );
    apps
}

/// Build the app description for a single workspace folder
pub fn scan_folder(folder: &Path) -> Option<App> {
    let manifest = AppManifest::find_in(folder);
    let makefile = find_sdk_makefile(folder);

    if manifest.is_none() && makefile.is_none() {
        debug!("No app in {:?}", folder);
        return None;
    }

    let language = manifest
        .as_ref()
        .and_then(|m| m.app.sdk)
        .unwrap_or_default();

    let build_dir = manifest
        .as_ref()
        .and_then(AppManifest::build_dir)
        .or_else(|| makefile.as_ref().map(|mk| mk.build_dir(folder)))
        .unwrap_or_else(|| PathBuf::from("."));

    // With a manifest, the Makefile of interest is the one in the build directory
    let makefile_content = match &makefile {
        Some(mk) if mk.build_dir(folder) == build_dir => Some(mk.content.clone()),
        _ => std::fs::read_to_string(folder.join(&build_dir).join("Makefile")).ok(),
    };

    let name = match language {
        Language::Rust => rust_package_name(&folder.join(&build_dir)),
        Language::C => makefile_content.as_deref().map(parse_app_name),
    }
    .unwrap_or_else(|| UNKNOWN_APP_NAME.to_string());

    let mut app = App::new(name, folder, language);
    app.build_dir = build_dir;

    if let Some(manifest) = &manifest {
        let devices = manifest.devices();
        if !devices.is_empty() {
            app.compatible_devices = devices;
        }
        if let Some(pytest_dir) = manifest.pytest_dir() {
            app.pytest_dir = pytest_dir;
        }
        apply_use_cases(&mut app, manifest);
    }

    app.variants = makefile_content.as_deref().and_then(parse_variants);
    app.fuzzing = fuzzing::detect(folder);

    debug!(
        "App '{}' ({}) in {:?}, build dir {:?}",
        app.name,
        app.language.as_str(),
        folder,
        app.build_dir
    );
    Some(app)
}

fn apply_use_cases(app: &mut App, manifest: &AppManifest) {
    for (name, flags) in &manifest.use_cases {
        if name == DEFAULT_BUILD_USE_CASE {
            app.build_use_cases[0].flags = flags.clone();
        } else {
            app.build_use_cases.push(BuildUseCase {
                name: name.clone(),
                flags: flags.clone(),
            });
        }
    }
}

/// Process-wide list of discovered apps, replaced wholesale on every scan
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    folders: Vec<PathBuf>,
    apps: Vec<App>,
}

impl AppRegistry {
    pub fn new(folders: Vec<PathBuf>) -> Self {
        let mut registry = Self {
            folders,
            apps: Vec::new(),
        };
        registry.rescan();
        registry
    }

    /// Registry over an already known list of apps
    pub fn from_apps(apps: Vec<App>) -> Self {
        Self {
            folders: apps.iter().map(|a| a.folder_path.clone()).collect(),
            apps,
        }
    }

    pub fn rescan(&mut self) -> &[App] {
        self.apps = scan(&self.folders);
        &self.apps
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn apps(&self) -> &[App] {
        &self.apps
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Find an app by folder name first, then by app name
    pub fn find(&self, name: &str) -> Option<&App> {
        self.apps
            .iter()
            .find(|a| a.folder_name == name)
            .or_else(|| self.apps.iter().find(|a| a.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Device;
    use std::fs;
    use tempfile::TempDir;

    fn write_c_app(dir: &Path, appname_line: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("Makefile"),
            format!("{appname_line}\nVARIANT_PARAM = COIN\nVARIANT_VALUES = foo foo_testnet\n{SDK_MARKER}\n"),
        )
        .unwrap();
    }

    #[test]
    fn test_scan_single_c_app() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("app-foo");
        write_c_app(&folder, "APPNAME = foo");

        let apps = scan(&[folder.clone()]);
        assert_eq!(apps.len(), 1);
        let app = &apps[0];
        assert_eq!(app.name, "foo");
        assert_eq!(app.folder_name, "app-foo");
        assert_eq!(app.language, Language::C);
        assert_eq!(app.compatible_devices, Device::ALL.to_vec());
        assert_eq!(app.variants.as_ref().unwrap().param, "COIN");
        assert!(app.fuzzing.is_none());
    }

    #[test]
    fn test_scan_without_marker_finds_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("not-an-app");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("Makefile"), "APPNAME = foo\nall:\n\tcc main.c\n").unwrap();

        assert!(scan(&[folder]).is_empty());
    }

    #[test]
    fn test_scan_missing_folder_is_degraded_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good");
        write_c_app(&good, "APPNAME = good");

        let apps = scan(&[temp_dir.path().join("missing"), good]);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "good");
    }

    #[test]
    fn test_manifest_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("app-bar");
        write_c_app(&folder.join("app"), "APPNAME = \"Bar\"");
        fs::write(
            folder.join(MANIFEST_FILE),
            "[app]\nbuild_directory = \"./app\"\nsdk = \"C\"\ndevices = [\"nanox\", \"stax\"]\n\n[use_cases]\ndebug = \"DEBUG=1\"\n\n[tests]\npytest_directory = \"./app/tests/\"\n",
        )
        .unwrap();

        let app = scan_folder(&folder).unwrap();
        assert_eq!(app.name, "Bar");
        assert_eq!(app.build_dir, PathBuf::from("app"));
        assert_eq!(app.compatible_devices, vec![Device::NanoX, Device::Stax]);
        assert_eq!(app.pytest_dir, PathBuf::from("app/tests"));
        let use_cases: Vec<&str> = app.build_use_cases.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(use_cases, vec!["release", "debug"]);
    }

    #[test]
    fn test_rust_app_from_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("app-rs");
        fs::create_dir_all(&folder).unwrap();
        fs::write(
            folder.join(MANIFEST_FILE),
            "[app]\nbuild_directory = \"./\"\nsdk = \"Rust\"\ndevices = [\"nanox\", \"nanos+\"]\n",
        )
        .unwrap();
        fs::write(
            folder.join("Cargo.toml"),
            "[package]\nname = \"app-rs\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
        )
        .unwrap();

        let app = scan_folder(&folder).unwrap();
        assert_eq!(app.language, Language::Rust);
        assert_eq!(app.name, "app-rs");
        assert_eq!(app.default_device(), Device::NanoX);
    }

    #[test]
    fn test_registry_find_by_folder_or_name() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("app-foo");
        write_c_app(&folder, "APPNAME = Foo");

        let registry = AppRegistry::new(vec![folder]);
        assert_eq!(registry.apps().len(), 1);
        assert!(registry.find("app-foo").is_some());
        assert!(registry.find("Foo").is_some());
        assert!(registry.find("bar").is_none());
    }
}
