//! Session: the selected app, selected target and task catalog, passed
//! around explicitly instead of living in process-wide state.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::command::HostPlatform;
use crate::config::{AppSettings, Config};
use crate::error::{Error, Result};
use crate::scan::AppRegistry;
use crate::target::{Selection, TargetRegistry};
use crate::tasks::{CommandEnv, TaskCatalog, TaskSpec, UPDATE_CONTAINER};
use crate::types::{App, DEFAULT_BUILD_USE_CASE, Device, Target};

pub struct Session {
    config: Config,
    platform: HostPlatform,
    registry: AppRegistry,
    selected_app: Option<usize>,
    targets: TargetRegistry,
    catalog: TaskCatalog,
    /// Fallback warnings raised while restoring a selection
    warnings: Vec<String>,
}

fn app_at(registry: &AppRegistry, index: Option<usize>) -> Option<&App> {
    index.and_then(|i| registry.apps().get(i))
}

impl Session {
    /// Create a session and restore the app selection saved in `config`,
    /// falling back to the first discovered app.
    pub fn new(config: Config, platform: HostPlatform, registry: AppRegistry) -> Self {
        let mut session = Self {
            config,
            platform,
            registry,
            selected_app: None,
            targets: TargetRegistry::default(),
            catalog: TaskCatalog::new(),
            warnings: Vec::new(),
        };
        let saved = session.config.selected_app.clone();
        let index = saved
            .as_deref()
            .and_then(|name| session.index_of(name))
            .or(if session.registry.is_empty() { None } else { Some(0) });
        let warning = session.activate(index);
        session.warnings.extend(warning);
        session
    }

    /// Load the config found from `start_dir` and scan the workspace folders.
    ///
    /// Folders given explicitly win over the configured ones; without
    /// either, `start_dir` itself is the only workspace folder.
    pub fn open(start_dir: &Path, platform: HostPlatform, folders: Vec<PathBuf>) -> Result<Self> {
        let config = Config::discover(start_dir)?;
        let folders = if !folders.is_empty() {
            folders
        } else if !config.workspace_folders.is_empty() {
            config.resolved_workspace_folders()
        } else {
            vec![start_dir.to_path_buf()]
        };
        debug!("Workspace folders: {:?}", folders);
        Ok(Self::new(config, platform, AppRegistry::new(folders)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    pub fn workspace_folders(&self) -> &[PathBuf] {
        self.registry.folders()
    }

    pub fn apps(&self) -> &[App] {
        self.registry.apps()
    }

    pub fn current_app(&self) -> Option<&App> {
        app_at(&self.registry, self.selected_app)
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn selected_target(&self) -> Target {
        self.targets.selected()
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    /// Per-app selections of the current app
    pub fn selections(&self) -> AppSettings {
        self.current_app()
            .map(|app| self.config.app_settings(&app.folder_name))
            .unwrap_or_default()
    }

    pub fn build_use_case(&self) -> String {
        self.selections()
            .build_use_case
            .unwrap_or_else(|| DEFAULT_BUILD_USE_CASE.to_string())
    }

    pub fn task_label(&self, task: &TaskSpec) -> String {
        task.label(&self.build_use_case())
    }

    /// Scan the workspace folders again, keeping the selected app when it
    /// still exists.
    pub fn rescan(&mut self) {
        let previous = self.current_app().map(|a| a.folder_name.clone());
        self.registry.rescan();
        let index = previous
            .as_deref()
            .and_then(|name| self.index_of(name))
            .or(if self.registry.is_empty() { None } else { Some(0) });
        let warning = self.activate(index);
        self.warnings.extend(warning);
    }

    /// Warnings raised while opening or rescanning, cleared on read
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Select an app by folder name or app name. Returns a warning when the
    /// previously selected target had to be replaced.
    pub fn select_app(&mut self, name: &str) -> Result<Option<String>> {
        let index = self
            .index_of(name)
            .ok_or_else(|| Error::UnknownApp(name.to_string()))?;
        let warning = self.activate(Some(index));
        self.config.selected_app = self.current_app().map(|a| a.folder_name.clone());
        self.after_target_change();
        Ok(warning)
    }

    pub fn select_target(&mut self, name: &str) -> Result<Selection> {
        let app = app_at(&self.registry, self.selected_app);
        let selection = self.targets.set_selected_target(name, app)?;
        self.after_target_change();
        Ok(selection)
    }

    pub fn toggle_all_targets(&mut self) -> Selection {
        let app = app_at(&self.registry, self.selected_app);
        let selection = self.targets.toggle_all(app);
        self.after_target_change();
        selection
    }

    pub fn select_build_use_case(&mut self, name: &str) -> Result<()> {
        let app = self.require_app()?;
        if app.build_use_case(name).is_none() {
            return Err(Error::UnknownUseCase(name.to_string()));
        }
        let folder = app.folder_name.clone();
        self.config.app_settings_mut(&folder).build_use_case = Some(name.to_string());
        Ok(())
    }

    pub fn select_variant(&mut self, value: &str) -> Result<()> {
        let app = self.require_app()?;
        let known = app
            .variants
            .as_ref()
            .is_some_and(|v| v.values.iter().any(|known| known == value));
        if !known {
            return Err(Error::UnknownVariant(value.to_string()));
        }
        let folder = app.folder_name.clone();
        self.config.app_settings_mut(&folder).variant = Some(value.to_string());
        Ok(())
    }

    pub fn select_fuzz_harness(&mut self, harness: &str) -> Result<()> {
        let app = self.require_app()?;
        let fuzzing = app
            .fuzzing
            .as_ref()
            .ok_or_else(|| Error::MissingFuzzing(app.name.clone()))?;
        if !fuzzing.harnesses.iter().any(|h| h == harness) {
            return Err(Error::MissingFuzzing(format!("no harness named {harness}")));
        }
        let folder = app.folder_name.clone();
        self.config.app_settings_mut(&folder).fuzz_harness = Some(harness.to_string());
        Ok(())
    }

    pub fn select_fuzz_crash(&mut self, crash: &str) -> Result<()> {
        let app = self.require_app()?;
        let fuzzing = app
            .fuzzing
            .as_ref()
            .ok_or_else(|| Error::MissingFuzzing(app.name.clone()))?;
        // Accept both `crashes/crash-1` and the bare file name
        let found = fuzzing
            .crashes
            .iter()
            .find(|c| c.as_str() == crash || c.rsplit('/').next() == Some(crash))
            .cloned()
            .ok_or_else(|| Error::MissingFuzzing(format!("no crash named {crash}")))?;
        let folder = app.folder_name.clone();
        self.config.app_settings_mut(&folder).fuzz_crash = Some(found);
        Ok(())
    }

    /// Restrict the functional tests to `tests`; an empty list runs them all
    pub fn set_selected_tests(&mut self, tests: Vec<String>) -> Result<()> {
        let folder = self.require_app()?.folder_name.clone();
        self.config.app_settings_mut(&folder).selected_tests = tests;
        Ok(())
    }

    /// Store the extra shell fragment run before the test requirements are
    /// installed. A blank fragment removes it.
    pub fn set_test_dependencies(&mut self, dependencies: &str) -> Result<()> {
        let folder = self.require_app()?.folder_name.clone();
        if dependencies.trim().is_empty() {
            self.config.additional_deps_per_app.remove(&folder);
        } else {
            self.config
                .additional_deps_per_app
                .insert(folder, dependencies.trim().to_string());
        }
        Ok(())
    }

    /// Shell line for the task named `name`; empty when no app is selected
    pub fn command_for(&self, name: &str) -> Result<String> {
        let selections = self.selections();
        let env = CommandEnv {
            app: self.current_app(),
            target: self.targets.selected(),
            shell: self.platform.shell(),
            config: &self.config,
            selections: &selections,
        };
        self.catalog.command_for(name, &env)
    }

    /// Shell line recreating the app container
    pub fn recreate_command(&self) -> Result<String> {
        self.command_for(UPDATE_CONTAINER)
    }

    pub fn save(&self) -> Result<()> {
        self.config.save()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let apps = self.registry.apps();
        apps.iter()
            .position(|a| a.folder_name == name)
            .or_else(|| apps.iter().position(|a| a.name == name))
    }

    fn require_app(&self) -> Result<&App> {
        self.current_app()
            .ok_or_else(|| Error::Other("No app selected".to_string()))
    }

    /// Make `index` the selected app, restoring its saved device
    fn activate(&mut self, index: Option<usize>) -> Option<String> {
        self.selected_app = index;
        let app = app_at(&self.registry, index);
        let warning = match app {
            Some(app) => {
                info!("Selected app: {} ({})", app.name, app.folder_name);
                let saved = self.config.app_settings(&app.folder_name);
                let warning = match saved
                    .selected_device
                    .and_then(|name| self.targets.set_selected_target(&name, Some(app)).ok())
                {
                    Some(selection) => selection.warning,
                    None => self.targets.ensure_compatible(app),
                };
                // The history slot belongs to the app, not to the previous one
                self.targets
                    .set_previous(saved.previous_device.as_deref().and_then(Device::parse));
                warning
            }
            None => None,
        };
        self.catalog.refresh(app, self.targets.selected());
        warning
    }

    fn after_target_change(&mut self) {
        let app = app_at(&self.registry, self.selected_app);
        self.catalog.refresh(app, self.targets.selected());
        if let Some(app) = app {
            let target = self.targets.selected().to_string();
            let previous = self.targets.previous().map(|d| d.to_string());
            let settings = self.config.app_settings_mut(&app.folder_name);
            settings.selected_device = Some(target);
            settings.previous_device = previous;
        }
    }
}
