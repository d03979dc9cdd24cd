//! Host platform strategies for the generated shell lines
//!
//! Container creation, `docker exec` wrapping and quoting differ between a
//! POSIX shell on Linux, the same shell on macOS (no uid mapping, X server on
//! the host), and PowerShell on Windows.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Mount point of the app folder inside the container
pub const CONTAINER_APP_DIR: &str = "/app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Linux,
    MacOs,
    Windows,
}

impl HostPlatform {
    /// Platform of the running process; anything that is neither Linux nor
    /// macOS is treated as Windows.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => HostPlatform::Linux,
            "macos" => HostPlatform::MacOs,
            _ => HostPlatform::Windows,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "linux" => Some(HostPlatform::Linux),
            "macos" | "darwin" | "mac" => Some(HostPlatform::MacOs),
            "windows" | "win32" => Some(HostPlatform::Windows),
            _ => None,
        }
    }

    pub fn shell(self) -> &'static dyn PlatformShell {
        match self {
            HostPlatform::Linux => &LinuxShell,
            HostPlatform::MacOs => &MacShell,
            HostPlatform::Windows => &WindowsShell,
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shell().name())
    }
}

/// Builds the host-side shell lines for one platform
pub trait PlatformShell: Send + Sync {
    fn name(&self) -> &'static str;

    /// Program and flags that run a single shell line
    fn interpreter(&self) -> (&'static str, &'static [&'static str]);

    /// Quote one value for this shell
    fn quote(&self, value: &str) -> String;

    /// Separator running the right-hand side only after the left succeeded
    fn and_then(&self) -> &'static str {
        " && "
    }

    /// Pull `image` and start a detached container named `container` with
    /// `workspace` mounted on [`CONTAINER_APP_DIR`].
    fn create_container(&self, image: &str, workspace: &Path, container: &str) -> String;

    fn remove_container(&self, container: &str) -> String {
        format!("docker rm -f {container}")
    }

    /// Wrap `inner` so it runs through bash inside `container`
    fn exec_in_container(&self, container: &str, inner: &str, as_root: bool) -> String {
        format!(
            "docker exec -it {}{} bash -c {}",
            user_flag(as_root),
            container,
            self.quote(inner)
        )
    }

    fn open_terminal(&self, container: &str, as_root: bool) -> String {
        format!("docker exec -it {}{} bash", user_flag(as_root), container)
    }
}

fn user_flag(as_root: bool) -> &'static str {
    if as_root { "-u 0 " } else { "" }
}

fn posix_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn mount(shell: &dyn PlatformShell, workspace: &Path) -> String {
    shell.quote(&format!("{}:{}", workspace.display(), CONTAINER_APP_DIR))
}

pub struct LinuxShell;

impl PlatformShell for LinuxShell {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn interpreter(&self) -> (&'static str, &'static [&'static str]) {
        ("sh", &["-c"])
    }

    fn quote(&self, value: &str) -> String {
        posix_quote(value)
    }

    fn create_container(&self, image: &str, workspace: &Path, container: &str) -> String {
        format!(
            "docker pull {image}{}docker run --user $(id -u):$(id -g) --privileged \
             -e DISPLAY=$DISPLAY -v '/tmp/.X11-unix:/tmp/.X11-unix' -v {} -t -d --name {container} {image}",
            self.and_then(),
            mount(self, workspace)
        )
    }
}

pub struct MacShell;

impl PlatformShell for MacShell {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn interpreter(&self) -> (&'static str, &'static [&'static str]) {
        ("sh", &["-c"])
    }

    fn quote(&self, value: &str) -> String {
        posix_quote(value)
    }

    fn create_container(&self, image: &str, workspace: &Path, container: &str) -> String {
        format!(
            "docker pull {image}{}docker run --privileged -e DISPLAY='host.docker.internal:0' \
             -v {} -t -d --name {container} {image}",
            self.and_then(),
            mount(self, workspace)
        )
    }
}

pub struct WindowsShell;

impl PlatformShell for WindowsShell {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn interpreter(&self) -> (&'static str, &'static [&'static str]) {
        ("powershell", &["-NoProfile", "-Command"])
    }

    // Single quotes keep `$VAR` for bash inside the container
    fn quote(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn and_then(&self) -> &'static str {
        "; "
    }

    fn create_container(&self, image: &str, workspace: &Path, container: &str) -> String {
        format!(
            "docker pull {image}{}docker run --privileged -e DISPLAY='host.docker.internal:0' \
             -v {} -t -d --name {container} {image}",
            self.and_then(),
            mount(self, workspace)
        )
    }
}
