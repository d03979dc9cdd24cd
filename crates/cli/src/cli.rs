use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    add_test_deps_command, apps_command, bridge_command, coverage_command, run_command,
    select_app_command, select_crash_command, select_fuzz_harness_command,
    select_target_command, select_tests_command, select_use_case_command,
    select_variant_command, status_command, targets_command, tasks_command, toggle_all_command,
    tree_command, watch_command,
};

/// Build, test and flash Ledger device apps through Docker
#[derive(Parser, Debug)]
#[command(name = "ledgerdev")]
#[command(version, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug               Enable debug logging\n    LEDGERDEV_DOCKER_IMAGE=...   Override the dockerImage setting")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Workspace folder to scan for apps (repeatable, defaults to the
    /// configured folders or the current directory)
    #[arg(short, long = "workspace", global = true, value_name = "DIR")]
    pub workspaces: Vec<PathBuf>,

    /// Host platform the shell lines are generated for
    #[arg(long, global = true, value_parser = ["linux", "macos", "windows"])]
    pub platform: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the apps found in the workspace folders
    Apps,
    /// Select the current app by folder name or app name
    SelectApp { name: String },
    /// List the targets of the current app
    Targets,
    /// Select the target device, or `All`
    SelectTarget { name: String },
    /// Swap between `All` and the last selected device
    ToggleAll,
    /// List the tasks and whether they can run
    Tasks,
    /// Run a task by name
    #[command(visible_alias = "r")]
    Run {
        /// Task name, e.g. "Build" or "Run tests"
        task: String,

        /// Print the command without executing it
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Show the state of the app container
    Status {
        /// Recreate the container when it is missing or stopped
        #[arg(long)]
        recreate: bool,

        /// Keep polling every SECS seconds
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Print the task tree
    Tree,
    /// Set the shell fragment run before the test requirements are installed
    AddTestDeps {
        /// Empty to remove
        dependencies: String,
    },
    /// Select the Makefile variant value
    SelectVariant { value: String },
    /// Select the build use case
    SelectUseCase { name: String },
    /// Select the fuzzing harness
    SelectFuzzHarness { name: String },
    /// Select the crash input replayed by "Run crash"
    SelectCrash { name: String },
    /// Restrict functional tests to the given names (none to run all)
    SelectTests { names: Vec<String> },
    /// Compute the coverage report of the selected fuzzing harness
    Coverage {
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Exchange webview messages as JSON lines over stdin/stdout
    Bridge,
    /// Rescan apps whenever a build descriptor changes
    Watch,
}

impl Cli {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        let global = self.global;
        match self.command {
            Commands::Apps => apps_command(&global),
            Commands::SelectApp { name } => select_app_command(&global, &name),
            Commands::Targets => targets_command(&global),
            Commands::SelectTarget { name } => select_target_command(&global, &name),
            Commands::ToggleAll => toggle_all_command(&global),
            Commands::Tasks => tasks_command(&global),
            Commands::Run { task, dry_run } => run_command(&global, &task, dry_run),
            Commands::Status { recreate, watch } => status_command(&global, recreate, watch),
            Commands::Tree => tree_command(&global),
            Commands::AddTestDeps { dependencies } => add_test_deps_command(&global, &dependencies),
            Commands::SelectVariant { value } => select_variant_command(&global, &value),
            Commands::SelectUseCase { name } => select_use_case_command(&global, &name),
            Commands::SelectFuzzHarness { name } => select_fuzz_harness_command(&global, &name),
            Commands::SelectCrash { name } => select_crash_command(&global, &name),
            Commands::SelectTests { names } => select_tests_command(&global, names),
            Commands::Coverage { dry_run } => coverage_command(&global, dry_run),
            Commands::Bridge => bridge_command(&global),
            Commands::Watch => watch_command(&global),
        }
    }
}
