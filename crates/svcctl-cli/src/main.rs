//! CLI entrypoint for the `svcctl` service lifecycle tool.
//!
//! The binary delegates to [`svcctl_cli::run`], which loads configuration,
//! parses the lifecycle arguments, drives the service to the requested state
//! and prints the result document.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    svcctl_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
