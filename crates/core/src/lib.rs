//! ledgerdev-core - Build, test and flash helpers for Ledger device apps
//!
//! This crate provides functionality to:
//! - Discover C and Rust device apps in workspace folders
//! - Track the selected app and target device
//! - Turn declarative tasks into Docker / vendor tool shell commands
//! - Poll the per-app container and project everything into UI models
pub mod command;
pub mod config;
pub mod container;
pub mod error;
pub mod presentation;
pub mod scan;
pub mod session;
pub mod target;
pub mod tasks;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

pub use command::{HostPlatform, PlatformShell, ShellCommand};
pub use config::Config;
pub use container::{ContainerMonitor, ContainerRuntime, ContainerStatus, DockerCli, PollResult};
pub use scan::AppRegistry;
pub use session::Session;
pub use target::{Selection, TargetRegistry};
pub use tasks::{TaskCatalog, TaskGroup, TaskSpec, TaskState};
