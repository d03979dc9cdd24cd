//! Selected build target and the values derived from it

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{App, Device, DeviceProfile, Target};

/// Device selected when nothing else is known
pub const DEFAULT_DEVICE: Device = Device::NanoX;

/// Outcome of a selection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Target actually selected, after compatibility fallback
    pub target: Target,
    /// Message for the user when the requested device was replaced
    pub warning: Option<String>,
}

/// Holds the selected target and recomputes its derived values.
///
/// Switching to [`Target::All`] remembers the concrete device that was
/// selected before, in a single slot, so toggling back restores it.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    selected: Target,
    previous: Option<Device>,
    derived: Option<&'static DeviceProfile>,
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

impl TargetRegistry {
    pub fn new(initial: Device) -> Self {
        Self {
            selected: Target::Device(initial),
            previous: None,
            derived: Some(initial.profile()),
        }
    }

    pub fn selected(&self) -> Target {
        self.selected
    }

    pub fn selected_device(&self) -> Option<Device> {
        self.selected.device()
    }

    /// SDK variable, emulator model, build directory model and hardware id
    /// of the selected device; `None` while every target is selected.
    pub fn derived(&self) -> Option<&'static DeviceProfile> {
        self.derived
    }

    pub fn previous(&self) -> Option<Device> {
        self.previous
    }

    /// Restore the history slot saved by an earlier run
    pub fn set_previous(&mut self, device: Option<Device>) {
        self.previous = device;
    }

    /// Select a target by name.
    ///
    /// Fails with [`Error::InvalidDevice`] when `name` is neither a device
    /// nor the `All` pseudo-target.
    pub fn set_selected_target(&mut self, name: &str, app: Option<&App>) -> Result<Selection> {
        let target = Target::parse(name).ok_or_else(|| Error::InvalidDevice(name.to_string()))?;
        Ok(self.select(target, app))
    }

    pub fn select(&mut self, target: Target, app: Option<&App>) -> Selection {
        match target {
            Target::All => {
                if let Target::Device(current) = self.selected {
                    self.previous = Some(current);
                }
                self.apply(Target::All);
                Selection {
                    target: Target::All,
                    warning: None,
                }
            }
            Target::Device(device) => {
                let (device, warning) = match app {
                    Some(app) if !app.is_compatible(device) => {
                        let fallback = app.default_device();
                        let message = format!(
                            "{} is not supported by {}, selecting {} instead",
                            device, app.name, fallback
                        );
                        warn!("{}", message);
                        (fallback, Some(message))
                    }
                    _ => (device, None),
                };
                self.apply(Target::Device(device));
                Selection {
                    target: self.selected,
                    warning,
                }
            }
        }
    }

    /// Swap between `All` and the last concrete selection
    pub fn toggle_all(&mut self, app: Option<&App>) -> Selection {
        match self.selected {
            Target::All => {
                let restore = self
                    .previous
                    .or_else(|| app.map(App::default_device))
                    .unwrap_or(DEFAULT_DEVICE);
                self.select(Target::Device(restore), app)
            }
            Target::Device(_) => self.select(Target::All, app),
        }
    }

    /// Re-check the selection against a newly selected app, falling back to
    /// its first compatible device when needed.
    pub fn ensure_compatible(&mut self, app: &App) -> Option<String> {
        match self.selected {
            Target::Device(device) if !app.is_compatible(device) => {
                self.select(Target::Device(device), Some(app)).warning
            }
            _ => None,
        }
    }

    /// Targets offered to the user for `app`: its devices, then `All`
    pub fn available_targets(app: Option<&App>) -> Vec<Target> {
        let devices = app
            .map(|a| a.compatible_devices.clone())
            .unwrap_or_else(|| Device::ALL.to_vec());
        devices
            .into_iter()
            .map(Target::Device)
            .chain(std::iter::once(Target::All))
            .collect()
    }

    fn apply(&mut self, target: Target) {
        self.selected = target;
        self.derived = target.device().map(Device::profile);
        debug!("Selected target: {}", target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;
    use std::path::Path;

    fn app_with(devices: Vec<Device>) -> App {
        let mut app = App::new("Boilerplate", Path::new("/ws/app-boilerplate"), Language::C);
        app.compatible_devices = devices;
        app
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let mut registry = TargetRegistry::default();
        for name in ["Nano Y", "blue", "", "All devices"] {
            let err = registry.set_selected_target(name, None).unwrap_err();
            assert!(matches!(err, Error::InvalidDevice(ref n) if n == name));
        }
        assert_eq!(registry.selected(), Target::Device(DEFAULT_DEVICE));
    }

    #[test]
    fn test_selection_recomputes_derived_fields() {
        let mut registry = TargetRegistry::default();
        registry.set_selected_target("Nano S Plus", None).unwrap();
        let derived = registry.derived().unwrap();
        assert_eq!(derived.sdk_var, "$NANOSP_SDK");
        assert_eq!(derived.emulator_model, "nanosp");
        assert_eq!(derived.build_dir_model, "nanos2");
        assert_eq!(derived.target_id, 0x3310_0004);

        registry.set_selected_target("All", None).unwrap();
        assert!(registry.derived().is_none());
    }

    #[test]
    fn test_incompatible_device_falls_back() {
        let app = app_with(vec![Device::Stax, Device::Flex]);
        let mut registry = TargetRegistry::default();

        let selection = registry.set_selected_target("Nano S", Some(&app)).unwrap();
        assert_eq!(selection.target, Target::Device(Device::Stax));
        assert!(selection.warning.unwrap().contains("Nano S is not supported"));
        assert_eq!(registry.selected_device(), Some(Device::Stax));

        let selection = registry.set_selected_target("Flex", Some(&app)).unwrap();
        assert_eq!(selection.target, Target::Device(Device::Flex));
        assert!(selection.warning.is_none());
    }

    #[test]
    fn test_toggle_all_twice_restores_device() {
        let mut registry = TargetRegistry::default();
        registry.set_selected_target("Stax", None).unwrap();

        assert_eq!(registry.toggle_all(None).target, Target::All);
        assert_eq!(registry.previous(), Some(Device::Stax));
        assert_eq!(registry.toggle_all(None).target, Target::Device(Device::Stax));
    }

    #[test]
    fn test_restored_history_is_used_by_toggle() {
        let app = app_with(vec![Device::Stax, Device::Flex]);
        let mut registry = TargetRegistry::default();
        registry.set_selected_target("All", Some(&app)).unwrap();
        assert_eq!(registry.previous(), Some(DEFAULT_DEVICE));

        registry.set_previous(Some(Device::Flex));
        let selection = registry.toggle_all(Some(&app));
        assert_eq!(selection.target, Target::Device(Device::Flex));
        assert!(selection.warning.is_none());
    }

    #[test]
    fn test_history_keeps_one_slot() {
        let mut registry = TargetRegistry::default();
        registry.set_selected_target("Stax", None).unwrap();
        registry.toggle_all(None);
        registry.set_selected_target("Flex", None).unwrap();
        registry.toggle_all(None);
        // Only the latest concrete selection is remembered
        assert_eq!(registry.toggle_all(None).target, Target::Device(Device::Flex));
    }

    #[test]
    fn test_ensure_compatible_after_app_change() {
        let mut registry = TargetRegistry::new(Device::NanoS);
        let app = app_with(vec![Device::NanoX]);
        assert!(registry.ensure_compatible(&app).is_some());
        assert_eq!(registry.selected_device(), Some(Device::NanoX));
        assert!(registry.ensure_compatible(&app).is_none());
    }

    #[test]
    fn test_available_targets_end_with_all() {
        let app = app_with(vec![Device::NanoX, Device::Flex]);
        assert_eq!(
            TargetRegistry::available_targets(Some(&app)),
            vec![
                Target::Device(Device::NanoX),
                Target::Device(Device::Flex),
                Target::All
            ]
        );
        assert_eq!(TargetRegistry::available_targets(None).len(), 6);
    }
}
