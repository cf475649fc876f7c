//! Start/stop command execution.
//!
//! Commands are opaque deployment strings handed to a shell. Output is
//! captured so it never interleaves with the result document on stdout; the
//! controller only looks at the exit status.

use std::env;
use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

use super::error::LifecycleError;

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs lifecycle commands to completion.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutcome, LifecycleError>;
}

/// Production runner that executes commands through `sh -c`.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    shell: OsString,
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ShellCommandRunner {
    /// Uses the shell override if provided, otherwise falls back to the
    /// `SVCCTL_SHELL` environment variable or `/bin/sh`.
    pub fn new(shell_override: Option<&OsStr>) -> Self {
        Self {
            shell: resolve_shell(shell_override),
        }
    }
}

impl CommandRunner for ShellCommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutcome, LifecycleError> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LifecycleError::LaunchCommand {
                command: command.to_owned(),
                source,
            })?;
        Ok(CommandOutcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn resolve_shell(shell_override: Option<&OsStr>) -> OsString {
    shell_override
        .map(OsString::from)
        .or_else(|| env::var_os("SVCCTL_SHELL"))
        .unwrap_or_else(|| OsString::from("/bin/sh"))
}
