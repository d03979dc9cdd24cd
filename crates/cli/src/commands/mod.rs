pub mod apps;
pub mod bridge;
pub mod selections;
pub mod status;
pub mod targets;
pub mod tasks;
pub mod watch;

pub use apps::{apps_command, select_app_command};
pub use bridge::bridge_command;
pub use selections::{
    add_test_deps_command, select_crash_command, select_fuzz_harness_command,
    select_tests_command, select_use_case_command, select_variant_command,
};
pub use status::status_command;
pub use targets::{select_target_command, targets_command, toggle_all_command};
pub use tasks::{coverage_command, run_command, tasks_command, tree_command};
pub use watch::watch_command;

use anyhow::{Context, Result};
use ledgerdev_core::{HostPlatform, Session};
use std::env;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::display::print_warning;

/// Load the session and report on stderr any saved selection that had to
/// be replaced.
pub fn open_session(global: &GlobalArgs) -> Result<Session> {
    let mut session = load_session(global)?;
    for warning in session.take_warnings() {
        print_warning(&warning);
    }
    Ok(session)
}

/// Load the configuration from the current directory and scan the
/// workspace folders. Pending warnings stay on the session.
pub fn load_session(global: &GlobalArgs) -> Result<Session> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let platform = global
        .platform
        .as_deref()
        .and_then(HostPlatform::parse)
        .unwrap_or_else(HostPlatform::current);
    debug!("Host platform: {}", platform);

    let folders = global.workspaces.iter().map(|w| cwd.join(w)).collect();
    Session::open(&cwd, platform, folders).context("Failed to load configuration")
}

/// Persist the selections stored in the session configuration
pub fn save_session(session: &Session) -> Result<()> {
    session.save().context("Failed to save configuration")
}
