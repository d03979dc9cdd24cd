use anyhow::{Context, Result};
use ledgerdev_core::container::{ContainerMonitor, DockerCli};
use ledgerdev_core::presentation::{HostMessage, ViewMessage, WebviewBridge};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

use super::load_session;
use crate::cli::GlobalArgs;

/// Read view messages, one JSON object per line, from stdin and answer each
/// with host messages on stdout until stdin is closed.
pub fn bridge_command(global: &GlobalArgs) -> Result<()> {
    let session = load_session(global)?;
    let mut bridge = WebviewBridge::new(session, ContainerMonitor::new(DockerCli));
    info!("Webview bridge started");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let replies = match serde_json::from_str::<ViewMessage>(&line) {
            Ok(message) => bridge.handle(message),
            Err(e) => {
                debug!("Rejected message {}: {}", line, e);
                vec![HostMessage::Warning {
                    message: format!("Invalid message: {e}"),
                }]
            }
        };
        for reply in replies {
            serde_json::to_writer(&mut out, &reply)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
    }

    info!("Webview bridge stopped");
    Ok(())
}
