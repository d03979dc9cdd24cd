use tracing::debug;

use super::builders as b;
use super::context::BuildContext;
use super::spec::{AllTargetsPolicy, BuilderSet, Requirement, TaskGroup, TaskSpec, TaskState};
use crate::command::PlatformShell;
use crate::config::{AppSettings, Config};
use crate::error::{Error, Result};
use crate::types::{App, Device, Target};

pub const UPDATE_CONTAINER: &str = "Update container";

/// Separator between the dependency command and the main command, and
/// between per-device commands
pub const COMMAND_SEPARATOR: &str = " ; ";

/// Inputs for turning a task into a shell line
pub struct CommandEnv<'a> {
    pub app: Option<&'a App>,
    pub target: Target,
    pub shell: &'a dyn PlatformShell,
    pub config: &'a Config,
    pub selections: &'a AppSettings,
}

impl<'a> CommandEnv<'a> {
    fn context(&self, app: &'a App, device: Device) -> BuildContext<'a> {
        BuildContext {
            app,
            device,
            shell: self.shell,
            config: self.config,
            selections: self.selections,
        }
    }
}

/// Ordered list of the tasks offered for the selected app
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<TaskSpec>,
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::with_tasks(default_tasks())
    }

    pub fn with_tasks(tasks: Vec<TaskSpec>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Look a task up by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        let name = name.trim();
        self.tasks.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn in_group(&self, group: TaskGroup) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.iter().filter(move |t| t.group == group)
    }

    /// Recompute every task state after the app or target changed
    pub fn refresh(&mut self, app: Option<&App>, target: Target) {
        for task in &mut self.tasks {
            task.state = task.state_for(app, target);
        }
        debug!(
            "Refreshed {} tasks: {} enabled",
            self.tasks.len(),
            self.tasks
                .iter()
                .filter(|t| t.state == TaskState::Enabled)
                .count()
        );
    }

    /// Shell line for `task`; empty without an app, or when the app language
    /// has no builder.
    pub fn build(task: &TaskSpec, env: &CommandEnv<'_>) -> String {
        let Some(app) = env.app else {
            return String::new();
        };
        let Some(builder) = task.builders.for_language(app.language) else {
            return String::new();
        };
        let devices = task.devices_for(app, env.target);
        let Some(first) = devices.first().copied() else {
            return String::new();
        };

        let mut parts = Vec::new();
        if let Some(dependencies) = task.dependencies {
            let deps = dependencies(&env.context(app, first));
            if !deps.is_empty() {
                parts.push(deps);
            }
        }
        parts.extend(
            devices
                .into_iter()
                .map(|device| builder(&env.context(app, device)))
                .filter(|cmd| !cmd.is_empty()),
        );
        parts.join(COMMAND_SEPARATOR)
    }

    /// Shell line for the task named `name`, refusing disabled or
    /// unavailable tasks. Returns an empty line when no app is selected.
    pub fn command_for(&self, name: &str, env: &CommandEnv<'_>) -> Result<String> {
        let task = self
            .get(name)
            .ok_or_else(|| Error::UnknownTask(name.to_string()))?;
        if env.app.is_none() {
            return Ok(String::new());
        }
        match task.state_for(env.app, env.target) {
            TaskState::Enabled => Ok(Self::build(task, env)),
            TaskState::Disabled => Err(Error::TaskDisabled(task.name.to_string())),
            TaskState::Unavailable => Err(Error::TaskUnavailable(task.name.to_string())),
        }
    }
}

/// Nano X does not accept sideloaded apps
const NO_SIDELOAD: &[Device] = &[Device::NanoX];

pub fn default_tasks() -> Vec<TaskSpec> {
    use AllTargetsPolicy::{Disable, ExecuteForEveryTarget};
    use TaskGroup::*;

    vec![
        TaskSpec::new(
            UPDATE_CONTAINER,
            Container,
            "Remove the app container, pull the latest image and start a new one",
            BuilderSet::both(b::create_container),
        )
        .with_dependencies(b::remove_container),
        TaskSpec::new(
            "Open container terminal",
            Container,
            "Open a bash terminal inside the app container",
            BuilderSet::both(b::open_terminal),
        ),
        TaskSpec::new(
            "Build",
            Build,
            "Build the app for the selected device",
            BuilderSet::per_language(b::build_c, b::build_rust),
        )
        .with_all_targets(ExecuteForEveryTarget)
        .showing_build_use_case(),
        TaskSpec::new(
            "Clean build files",
            Build,
            "Remove build artifacts",
            BuilderSet::per_language(b::clean_c, b::clean_rust),
        ),
        TaskSpec::new(
            "Run scan-build",
            Build,
            "Run the clang static analyzer on the app sources",
            BuilderSet::c_only(b::scan_build),
        )
        .with_all_targets(ExecuteForEveryTarget)
        .showing_build_use_case(),
        TaskSpec::new(
            "Run with emulator",
            FunctionalTests,
            "Start the built app in the emulator",
            BuilderSet::both(b::run_emulator),
        )
        .with_all_targets(Disable),
        TaskSpec::new(
            "Kill emulator",
            FunctionalTests,
            "Stop every running emulator in the container",
            BuilderSet::both(b::kill_emulator),
        ),
        TaskSpec::new(
            "Run tests",
            FunctionalTests,
            "Run the functional tests against the emulator",
            BuilderSet::both(b::run_tests),
        )
        .with_dependencies(b::test_dependencies)
        .with_all_targets(ExecuteForEveryTarget),
        TaskSpec::new(
            "Run tests with display",
            FunctionalTests,
            "Run the functional tests with the emulator display shown",
            BuilderSet::both(b::run_tests_with_display),
        )
        .with_dependencies(b::test_dependencies)
        .with_all_targets(Disable),
        TaskSpec::new(
            "Update test snapshots",
            FunctionalTests,
            "Run the functional tests and regenerate the golden snapshots",
            BuilderSet::both(b::update_snapshots),
        )
        .with_dependencies(b::test_dependencies)
        .with_all_targets(ExecuteForEveryTarget),
        TaskSpec::new(
            "Load app on device",
            DeviceOperations,
            "Sideload the built app on a connected device",
            BuilderSet::per_language(b::load_app_c, b::load_app_rust),
        )
        .with_all_targets(Disable)
        .unsupported_on(NO_SIDELOAD),
        TaskSpec::new(
            "Delete app from device",
            DeviceOperations,
            "Remove the app from a connected device",
            BuilderSet::both(b::delete_app),
        )
        .with_all_targets(Disable)
        .unsupported_on(NO_SIDELOAD),
        TaskSpec::new(
            "Quick device onboarding",
            DeviceOperations,
            "Onboard a connected device with the configured PIN and seed",
            BuilderSet::both(b::onboard_device),
        )
        .with_all_targets(Disable)
        .unsupported_on(NO_SIDELOAD),
        TaskSpec::new(
            "Run fuzzer",
            Fuzzing,
            "Build and run the selected fuzzing harness",
            BuilderSet::c_only(b::run_fuzzer),
        )
        .with_requirement(Requirement::FuzzHarness),
        TaskSpec::new(
            "Run crash",
            Fuzzing,
            "Replay the selected crash input on the selected harness",
            BuilderSet::c_only(b::run_crash),
        )
        .with_requirement(Requirement::FuzzCrash),
        TaskSpec::new(
            "Inspect coverage",
            Fuzzing,
            "Compute the coverage report of the selected harness",
            BuilderSet::c_only(b::inspect_coverage),
        )
        .with_requirement(Requirement::FuzzHarness),
    ]
}
