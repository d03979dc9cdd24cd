use anyhow::{Context, Result};
use ledgerdev_core::scan::MANIFEST_FILE;
use notify::{Event, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, warn};

use super::open_session;
use crate::cli::GlobalArgs;
use crate::display::{format_apps, print_warning};

/// Files whose changes can add, remove or rename an app
const DESCRIPTOR_FILES: [&str; 3] = ["Makefile", MANIFEST_FILE, "Cargo.toml"];

pub fn watch_command(global: &GlobalArgs) -> Result<()> {
    let mut session = open_session(global)?;
    print!("{}", format_apps(&session));

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    let folders: Vec<PathBuf> = watched_folders(&session);
    for folder in &folders {
        watcher
            .watch(folder, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", folder.display()))?;
    }
    println!("👀 Watching {} folder(s), press Ctrl-C to stop", folders.len());

    for result in rx {
        match result {
            Ok(event) if is_descriptor_change(&event) => {
                debug!("Build descriptor changed: {:?}", event.paths);
                session.rescan();
                println!("🔄 Apps rescanned");
                for warning in session.take_warnings() {
                    print_warning(&warning);
                }
                print!("{}", format_apps(&session));
            }
            Ok(_) => {}
            Err(e) => warn!("Watch error: {}", e),
        }
    }
    Ok(())
}

fn watched_folders(session: &ledgerdev_core::Session) -> Vec<PathBuf> {
    session
        .workspace_folders()
        .iter()
        .filter(|folder| folder.is_dir())
        .cloned()
        .collect()
}

fn is_descriptor_change(event: &Event) -> bool {
    !event.kind.is_access() && event.paths.iter().any(|p| is_descriptor(p))
}

fn is_descriptor(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| DESCRIPTOR_FILES.contains(&name))
}
