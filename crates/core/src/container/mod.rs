//! Polling of the per-app container through the Docker CLI

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use tracing::{debug, warn};

use crate::command::ShellCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Running,
    Syncing,
    Stopped,
}

impl ContainerStatus {
    /// Map a runtime state string (`docker inspect .State.Status`)
    pub fn from_state(state: &str) -> Self {
        match state.trim().trim_matches('"').to_lowercase().as_str() {
            "running" => ContainerStatus::Running,
            "starting" | "restarting" => ContainerStatus::Syncing,
            _ => ContainerStatus::Stopped,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContainerStatus::Running => "running",
            ContainerStatus::Syncing => "syncing",
            ContainerStatus::Stopped => "stopped",
        }
    }

    /// Codicon shown next to the status
    pub fn icon(self) -> &'static str {
        match self {
            ContainerStatus::Running => "vm-running",
            ContainerStatus::Syncing => "sync~spin",
            ContainerStatus::Stopped => "vm-outline",
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollResult {
    pub status: ContainerStatus,
    /// The container is missing or dead and the recreation task should run
    pub needs_recreate: bool,
}

/// Access to the container runtime
pub trait ContainerRuntime {
    /// Names of the containers whose name matches `name`
    fn list_containers(&self, name: &str) -> io::Result<Vec<String>>;

    /// Runtime state string of the container, e.g. `running` or `exited`
    fn inspect_state(&self, name: &str) -> io::Result<String>;
}

/// [`ContainerRuntime`] backed by the `docker` binary
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerCli;

impl DockerCli {
    fn query(args: &[&str]) -> io::Result<String> {
        let output =
            ShellCommand::new("docker", args.iter().map(|a| a.to_string()).collect()).output()?;
        if !output.status.success() {
            return Err(io::Error::other(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ContainerRuntime for DockerCli {
    fn list_containers(&self, name: &str) -> io::Result<Vec<String>> {
        let filter = format!("name={name}");
        let stdout = Self::query(&["ps", "-a", "--filter", &filter, "--format", "{{.Names}}"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn inspect_state(&self, name: &str) -> io::Result<String> {
        Self::query(&["inspect", "--format", "{{.State.Status}}", name])
            .map(|s| s.trim().to_string())
    }
}

/// Maps container runtime answers to a [`ContainerStatus`].
///
/// Runtime failures are never propagated: a runtime that cannot be queried
/// reports the container as stopped.
#[derive(Debug, Clone, Default)]
pub struct ContainerMonitor<R: ContainerRuntime = DockerCli> {
    runtime: R,
}

impl<R: ContainerRuntime> ContainerMonitor<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn poll(&self, container: &str) -> PollResult {
        let names = match self.runtime.list_containers(container) {
            Ok(names) => names,
            Err(e) => {
                warn!("Failed to list containers: {}", e);
                return PollResult {
                    status: ContainerStatus::Stopped,
                    needs_recreate: false,
                };
            }
        };

        // The name filter matches substrings, so look for an exact match
        if !names.iter().any(|n| n == container) {
            debug!("Container {} does not exist", container);
            return PollResult {
                status: ContainerStatus::Stopped,
                needs_recreate: true,
            };
        }

        match self.runtime.inspect_state(container) {
            Ok(state) => {
                let status = ContainerStatus::from_state(&state);
                debug!("Container {} state '{}' -> {}", container, state, status);
                PollResult {
                    status,
                    needs_recreate: status == ContainerStatus::Stopped,
                }
            }
            Err(e) => {
                warn!("Failed to inspect container {}: {}", container, e);
                PollResult {
                    status: ContainerStatus::Stopped,
                    needs_recreate: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned runtime answers
    struct FakeRuntime {
        names: io::Result<Vec<String>>,
        state: Option<&'static str>,
    }

    impl FakeRuntime {
        fn with_state(state: &'static str) -> Self {
            Self {
                names: Ok(vec!["app-container".to_string()]),
                state: Some(state),
            }
        }
    }

    impl ContainerRuntime for FakeRuntime {
        fn list_containers(&self, _name: &str) -> io::Result<Vec<String>> {
            match &self.names {
                Ok(names) => Ok(names.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }

        fn inspect_state(&self, _name: &str) -> io::Result<String> {
            self.state
                .map(str::to_string)
                .ok_or_else(|| io::Error::other("inspect failed"))
        }
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(ContainerStatus::from_state("running"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::from_state("\"running\"\n"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::from_state("restarting"), ContainerStatus::Syncing);
        assert_eq!(ContainerStatus::from_state("starting"), ContainerStatus::Syncing);
        for other in ["exited", "paused", "dead", "created", ""] {
            assert_eq!(ContainerStatus::from_state(other), ContainerStatus::Stopped);
        }
    }

    #[test]
    fn test_poll_running_and_syncing() {
        let monitor = ContainerMonitor::new(FakeRuntime::with_state("running"));
        assert_eq!(
            monitor.poll("app-container"),
            PollResult {
                status: ContainerStatus::Running,
                needs_recreate: false
            }
        );

        let monitor = ContainerMonitor::new(FakeRuntime::with_state("restarting"));
        assert_eq!(monitor.poll("app-container").status, ContainerStatus::Syncing);
    }

    #[test]
    fn test_poll_exited_requests_recreate() {
        let monitor = ContainerMonitor::new(FakeRuntime::with_state("exited"));
        let result = monitor.poll("app-container");
        assert_eq!(result.status, ContainerStatus::Stopped);
        assert!(result.needs_recreate);
    }

    #[test]
    fn test_poll_missing_container_requests_recreate() {
        let monitor = ContainerMonitor::new(FakeRuntime {
            names: Ok(vec!["app-container-old".to_string()]),
            state: Some("running"),
        });
        let result = monitor.poll("app-container");
        assert_eq!(result.status, ContainerStatus::Stopped);
        assert!(result.needs_recreate);
    }

    #[test]
    fn test_poll_failures_map_to_stopped() {
        let monitor = ContainerMonitor::new(FakeRuntime {
            names: Err(io::Error::new(io::ErrorKind::NotFound, "docker: not found")),
            state: None,
        });
        assert_eq!(monitor.poll("app-container").status, ContainerStatus::Stopped);

        let monitor = ContainerMonitor::new(FakeRuntime {
            names: Ok(vec!["app-container".to_string()]),
            state: None,
        });
        let result = monitor.poll("app-container");
        assert_eq!(result.status, ContainerStatus::Stopped);
        assert!(!result.needs_recreate);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ContainerStatus::Syncing).unwrap(),
            "\"syncing\""
        );
    }
}
