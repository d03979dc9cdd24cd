use anyhow::{Context, Result};
use ledgerdev_core::container::{ContainerMonitor, ContainerStatus, DockerCli};
use ledgerdev_core::presentation::{build_status_bar, render_status_bar};
use ledgerdev_core::{Session, ShellCommand};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::open_session;
use crate::cli::GlobalArgs;

pub fn status_command(global: &GlobalArgs, recreate: bool, watch: Option<u64>) -> Result<()> {
    let session = open_session(global)?;
    if session.current_app().is_none() {
        println!("No app selected");
        return Ok(());
    }

    let monitor = ContainerMonitor::new(DockerCli);
    let mut last: Option<ContainerStatus> = None;
    loop {
        let status = poll_once(&session, &monitor, recreate)?;
        if last != Some(status) {
            println!("{}", render_status_bar(&build_status_bar(&session, Some(status))));
            last = Some(status);
        }
        match watch {
            Some(secs) => thread::sleep(Duration::from_secs(secs.max(1))),
            None => return Ok(()),
        }
    }
}

fn poll_once(session: &Session, monitor: &ContainerMonitor, recreate: bool) -> Result<ContainerStatus> {
    let Some(app) = session.current_app() else {
        return Ok(ContainerStatus::Stopped);
    };
    let poll = monitor.poll(&app.container_name);
    if !poll.needs_recreate {
        return Ok(poll.status);
    }
    if !recreate {
        warn!(
            "Container {} is missing or stopped, run with --recreate to start a new one",
            app.container_name
        );
        return Ok(poll.status);
    }

    let line = session.recreate_command()?;
    info!("Recreating container: {}", line);
    let status = ShellCommand::for_line(session.platform(), &line)
        .with_working_dir(app.folder_path.clone())
        .execute()
        .with_context(|| format!("Failed to execute: {line}"))?;
    if !status.success() {
        warn!("Container recreation exited with {}", status);
    }
    Ok(monitor.poll(&app.container_name).status)
}
