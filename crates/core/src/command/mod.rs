//! Shell command generation and execution

pub mod platform;
pub mod shell_command;

// Re-export commonly used types
pub use platform::{CONTAINER_APP_DIR, HostPlatform, PlatformShell};
pub use shell_command::ShellCommand;
