use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

use super::HostPlatform;

/// A program invocation, either a direct one (`docker ps ...`) or a shell
/// line handed to the host platform's interpreter.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Run `line` through the interpreter of `platform` (`sh -c` or PowerShell)
    pub fn for_line(platform: HostPlatform, line: &str) -> Self {
        let (program, flags) = platform.shell().interpreter();
        let mut args: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
        args.push(line.to_string());
        Self::new(program, args)
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = self.program.clone();
        for arg in &self.args {
            cmd.push(' ');
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(arg);
            }
        }
        cmd
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run with inherited stdio, blocking until the process exits
    pub fn execute(&self) -> io::Result<ExitStatus> {
        tracing::debug!("Executing: {}", self.to_shell_command());
        self.command().status()
    }

    /// Run and capture stdout/stderr, blocking until the process exits
    pub fn output(&self) -> io::Result<Output> {
        tracing::debug!("Querying: {}", self.to_shell_command());
        self.command().output()
    }
}
