use serde::Serialize;
use std::fmt;

use super::context::BuildContext;
use crate::types::{App, Device, Language, Target};

/// Builds one shell line for one app and one concrete device
pub type CommandBuilder = fn(&BuildContext<'_>) -> String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskState {
    Enabled,
    Disabled,
    Unavailable,
}

/// What a task does while the `All` pseudo-target is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AllTargetsPolicy {
    /// Device independent: run once
    Enable,
    Disable,
    /// Run once per compatible device, one after the other
    ExecuteForEveryTarget,
}

/// App metadata a task needs beyond a matching language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    None,
    FuzzHarness,
    FuzzCrash,
}

impl Requirement {
    pub fn is_met(self, app: &App) -> bool {
        match self {
            Requirement::None => true,
            Requirement::FuzzHarness => app.fuzzing.is_some(),
            Requirement::FuzzCrash => app.fuzzing.as_ref().is_some_and(|f| !f.crashes.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TaskGroup {
    Container,
    Build,
    FunctionalTests,
    DeviceOperations,
    Fuzzing,
}

impl TaskGroup {
    pub const ALL: [TaskGroup; 5] = [
        TaskGroup::Container,
        TaskGroup::Build,
        TaskGroup::FunctionalTests,
        TaskGroup::DeviceOperations,
        TaskGroup::Fuzzing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskGroup::Container => "Docker container",
            TaskGroup::Build => "Build",
            TaskGroup::FunctionalTests => "Functional tests",
            TaskGroup::DeviceOperations => "Device operations",
            TaskGroup::Fuzzing => "Fuzzing",
        }
    }
}

impl fmt::Display for TaskGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Command builders keyed by app language; `both` serves either language
/// unless a language-specific builder is set.
#[derive(Clone, Copy, Default)]
pub struct BuilderSet {
    pub c: Option<CommandBuilder>,
    pub rust: Option<CommandBuilder>,
    pub both: Option<CommandBuilder>,
}

impl BuilderSet {
    pub fn both(builder: CommandBuilder) -> Self {
        Self {
            both: Some(builder),
            ..Self::default()
        }
    }

    pub fn c_only(builder: CommandBuilder) -> Self {
        Self {
            c: Some(builder),
            ..Self::default()
        }
    }

    pub fn per_language(c: CommandBuilder, rust: CommandBuilder) -> Self {
        Self {
            c: Some(c),
            rust: Some(rust),
            both: None,
        }
    }

    pub fn for_language(&self, language: Language) -> Option<CommandBuilder> {
        match language {
            Language::C => self.c.or(self.both),
            Language::Rust => self.rust.or(self.both),
        }
    }
}

impl fmt::Debug for BuilderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderSet")
            .field("c", &self.c.is_some())
            .field("rust", &self.rust.is_some())
            .field("both", &self.both.is_some())
            .finish()
    }
}

/// Declarative description of one task
#[derive(Clone)]
pub struct TaskSpec {
    pub name: &'static str,
    pub group: TaskGroup,
    pub tooltip: &'static str,
    pub builders: BuilderSet,
    /// Prerequisite command run before the main one
    pub dependencies: Option<CommandBuilder>,
    pub all_targets: AllTargetsPolicy,
    pub requirement: Requirement,
    pub unsupported_devices: &'static [Device],
    /// Label carries the selected build use case, e.g. `Build [debug]`
    pub shows_build_use_case: bool,
    pub state: TaskState,
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("builders", &self.builders)
            .field("has_dependencies", &self.dependencies.is_some())
            .field("all_targets", &self.all_targets)
            .field("requirement", &self.requirement)
            .field("state", &self.state)
            .finish()
    }
}

impl TaskSpec {
    pub fn new(
        name: &'static str,
        group: TaskGroup,
        tooltip: &'static str,
        builders: BuilderSet,
    ) -> Self {
        Self {
            name,
            group,
            tooltip,
            builders,
            dependencies: None,
            all_targets: AllTargetsPolicy::Enable,
            requirement: Requirement::None,
            unsupported_devices: &[],
            shows_build_use_case: false,
            state: TaskState::Unavailable,
        }
    }

    pub fn with_dependencies(mut self, builder: CommandBuilder) -> Self {
        self.dependencies = Some(builder);
        self
    }

    pub fn with_all_targets(mut self, policy: AllTargetsPolicy) -> Self {
        self.all_targets = policy;
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn unsupported_on(mut self, devices: &'static [Device]) -> Self {
        self.unsupported_devices = devices;
        self
    }

    pub fn showing_build_use_case(mut self) -> Self {
        self.shows_build_use_case = true;
        self
    }

    pub fn label(&self, build_use_case: &str) -> String {
        if self.shows_build_use_case {
            format!("{} [{}]", self.name, build_use_case)
        } else {
            self.name.to_string()
        }
    }

    pub fn supports(&self, device: Device) -> bool {
        !self.unsupported_devices.contains(&device)
    }

    /// Compute the state of this task for the given app and target
    pub fn state_for(&self, app: Option<&App>, target: Target) -> TaskState {
        let Some(app) = app else {
            return TaskState::Unavailable;
        };
        if self.builders.for_language(app.language).is_none() || !self.requirement.is_met(app) {
            return TaskState::Unavailable;
        }
        match target {
            Target::All if self.all_targets == AllTargetsPolicy::Disable => TaskState::Disabled,
            Target::Device(device) if !self.supports(device) => TaskState::Disabled,
            _ => TaskState::Enabled,
        }
    }

    /// Devices the main command is built for
    pub fn devices_for(&self, app: &App, target: Target) -> Vec<Device> {
        match (target, self.all_targets) {
            (Target::Device(device), _) => vec![device],
            (Target::All, AllTargetsPolicy::ExecuteForEveryTarget) => app
                .compatible_devices
                .iter()
                .copied()
                .filter(|d| self.supports(*d))
                .collect(),
            (Target::All, AllTargetsPolicy::Enable) => vec![app.default_device()],
            (Target::All, AllTargetsPolicy::Disable) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FuzzingInfo;
    use std::path::{Path, PathBuf};

    fn noop(_: &BuildContext<'_>) -> String {
        "true".to_string()
    }

    fn app(language: Language) -> App {
        App::new("Foo", Path::new("/ws/app-foo"), language)
    }

    #[test]
    fn test_builder_lookup_by_language() {
        let both = BuilderSet::both(noop);
        assert!(both.for_language(Language::C).is_some());
        assert!(both.for_language(Language::Rust).is_some());

        let c_only = BuilderSet::c_only(noop);
        assert!(c_only.for_language(Language::C).is_some());
        assert!(c_only.for_language(Language::Rust).is_none());
    }

    #[test]
    fn test_language_mismatch_is_unavailable() {
        let task = TaskSpec::new("Run scan-build", TaskGroup::Build, "", BuilderSet::c_only(noop));
        let target = Target::Device(Device::NanoX);
        assert_eq!(task.state_for(Some(&app(Language::Rust)), target), TaskState::Unavailable);
        assert_eq!(task.state_for(Some(&app(Language::C)), target), TaskState::Enabled);
        assert_eq!(task.state_for(None, target), TaskState::Unavailable);
    }

    #[test]
    fn test_all_policy_and_unsupported_devices() {
        let task = TaskSpec::new("Load app on device", TaskGroup::DeviceOperations, "", BuilderSet::both(noop))
            .with_all_targets(AllTargetsPolicy::Disable)
            .unsupported_on(&[Device::NanoX]);
        let c_app = app(Language::C);
        assert_eq!(task.state_for(Some(&c_app), Target::All), TaskState::Disabled);
        assert_eq!(task.state_for(Some(&c_app), Target::Device(Device::NanoX)), TaskState::Disabled);
        assert_eq!(task.state_for(Some(&c_app), Target::Device(Device::Stax)), TaskState::Enabled);
        assert!(task.devices_for(&c_app, Target::All).is_empty());
    }

    #[test]
    fn test_requirement_needs_fuzzing_info() {
        let task = TaskSpec::new("Run crash", TaskGroup::Fuzzing, "", BuilderSet::c_only(noop))
            .with_requirement(Requirement::FuzzCrash);
        let mut c_app = app(Language::C);
        let target = Target::Device(Device::Flex);
        assert_eq!(task.state_for(Some(&c_app), target), TaskState::Unavailable);

        c_app.fuzzing = Some(FuzzingInfo {
            directory: PathBuf::from("fuzzing"),
            harnesses: vec!["fuzz_apdu".to_string()],
            crashes: Vec::new(),
        });
        assert_eq!(task.state_for(Some(&c_app), target), TaskState::Unavailable);

        c_app.fuzzing.as_mut().unwrap().crashes.push("crashes/crash-1".to_string());
        assert_eq!(task.state_for(Some(&c_app), target), TaskState::Enabled);
    }

    #[test]
    fn test_every_target_skips_unsupported() {
        let task = TaskSpec::new("Build", TaskGroup::Build, "", BuilderSet::both(noop))
            .with_all_targets(AllTargetsPolicy::ExecuteForEveryTarget)
            .unsupported_on(&[Device::NanoS]);
        let c_app = app(Language::C);
        assert_eq!(
            task.devices_for(&c_app, Target::All),
            vec![Device::NanoSPlus, Device::NanoX, Device::Stax, Device::Flex]
        );
        assert_eq!(task.label("debug"), "Build");
        assert_eq!(task.clone().showing_build_use_case().label("debug"), "Build [debug]");
    }
}
