use anyhow::{Context, Result};
use ledgerdev_core::container::{ContainerMonitor, DockerCli};
use ledgerdev_core::presentation::{build_tree, render_tree};
use ledgerdev_core::{Session, ShellCommand};
use tracing::info;

use super::open_session;
use crate::cli::GlobalArgs;
use crate::display::format_tasks;

const COVERAGE_TASK: &str = "Inspect coverage";

pub fn tasks_command(global: &GlobalArgs) -> Result<()> {
    let session = open_session(global)?;
    print!("{}", format_tasks(&session));
    Ok(())
}

pub fn tree_command(global: &GlobalArgs) -> Result<()> {
    let session = open_session(global)?;
    print!("{}", render_tree(&build_tree(&session)));
    Ok(())
}

pub fn run_command(global: &GlobalArgs, task: &str, dry_run: bool) -> Result<()> {
    let session = open_session(global)?;
    run_task(&session, task, dry_run)
}

pub fn coverage_command(global: &GlobalArgs, dry_run: bool) -> Result<()> {
    let session = open_session(global)?;
    run_task(&session, COVERAGE_TASK, dry_run)
}

/// Build the shell line of `task` and run it, then poll the container again
pub fn run_task(session: &Session, task: &str, dry_run: bool) -> Result<()> {
    let line = session.command_for(task)?;
    if line.is_empty() {
        println!("No app selected");
        return Ok(());
    }

    if dry_run {
        println!("{line}");
        return Ok(());
    }

    info!("Running: {}", line);
    let mut command = ShellCommand::for_line(session.platform(), &line);
    if let Some(app) = session.current_app() {
        command = command.with_working_dir(app.folder_path.clone());
    }
    let status = command
        .execute()
        .with_context(|| format!("Failed to execute: {line}"))?;

    if let Some(app) = session.current_app() {
        let poll = ContainerMonitor::new(DockerCli).poll(&app.container_name);
        println!("Container {}: {}", app.container_name, poll.status);
    }

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}
