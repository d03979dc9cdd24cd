use std::path::Path;

use crate::command::{CONTAINER_APP_DIR, PlatformShell};
use crate::config::{AppSettings, Config};
use crate::types::{App, DEFAULT_BUILD_USE_CASE, Device, DeviceProfile};

/// Everything a command builder may interpolate
pub struct BuildContext<'a> {
    pub app: &'a App,
    pub device: Device,
    pub shell: &'a dyn PlatformShell,
    pub config: &'a Config,
    pub selections: &'a AppSettings,
}

impl BuildContext<'_> {
    pub fn profile(&self) -> &'static DeviceProfile {
        self.device.profile()
    }

    /// `export BOLOS_SDK=$<DEVICE>_SDK`
    pub fn sdk_export(&self) -> String {
        format!("export BOLOS_SDK={}", self.profile().sdk_var)
    }

    /// Run `inner` through bash in the app container
    pub fn in_container(&self, inner: &str) -> String {
        self.shell
            .exec_in_container(&self.app.container_name, inner, false)
    }

    /// Run `inner` in the container, from the app build directory
    pub fn in_build_dir(&self, inner: &str) -> String {
        if self.app.builds_in_root() {
            self.in_container(inner)
        } else {
            self.in_container(&format!(
                "cd {} && {inner}",
                container_path(&self.app.build_dir)
            ))
        }
    }

    pub fn build_use_case(&self) -> &str {
        self.selections
            .build_use_case
            .as_deref()
            .unwrap_or(DEFAULT_BUILD_USE_CASE)
    }

    /// Extra make arguments: use case flags then the selected variant,
    /// each preceded by a space
    pub fn make_flags(&self) -> String {
        let mut flags = String::new();
        if let Some(use_case) = self.app.build_use_case(self.build_use_case()) {
            if !use_case.flags.trim().is_empty() {
                flags.push(' ');
                flags.push_str(use_case.flags.trim());
            }
        }
        if let (Some(info), Some(value)) = (&self.app.variants, &self.selections.variant) {
            flags.push_str(&format!(" {}={}", info.param, value));
        }
        flags
    }

    pub fn fuzz_harness(&self) -> Option<&str> {
        let fuzzing = self.app.fuzzing.as_ref()?;
        self.selections
            .fuzz_harness
            .as_deref()
            .or_else(|| fuzzing.harnesses.first().map(String::as_str))
    }

    pub fn fuzz_crash(&self) -> Option<&str> {
        let fuzzing = self.app.fuzzing.as_ref()?;
        self.selections
            .fuzz_crash
            .as_deref()
            .or_else(|| fuzzing.crashes.first().map(String::as_str))
    }

    /// Fuzzing directory as seen from inside the container
    pub fn fuzzing_dir(&self) -> Option<String> {
        self.app
            .fuzzing
            .as_ref()
            .map(|f| container_path(&f.directory))
    }

    /// `-k "a or b"` pytest selection, with a leading space, or nothing
    pub fn pytest_selection(&self) -> String {
        if self.selections.selected_tests.is_empty() {
            String::new()
        } else {
            format!(" -k \"{}\"", self.selections.selected_tests.join(" or "))
        }
    }
}

/// Absolute path inside the container for a path relative to the app folder
pub fn container_path(relative: &Path) -> String {
    let rel = relative.to_string_lossy().replace('\\', "/");
    let rel = rel.trim_start_matches("./").trim_matches('/');
    if rel.is_empty() || rel == "." {
        CONTAINER_APP_DIR.to_string()
    } else {
        format!("{CONTAINER_APP_DIR}/{rel}")
    }
}
