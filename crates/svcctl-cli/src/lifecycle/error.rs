//! Error types for service lifecycle operations.

use std::fmt;
use std::io;

use thiserror::Error;

/// Blocking phase that can exhaust its time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    PortOpen,
    PortClosed,
    Readiness,
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortOpen => formatter.write_str("port to open"),
            Self::PortClosed => formatter.write_str("port to close"),
            Self::Readiness => formatter.write_str("readiness pattern to match"),
        }
    }
}

/// Problems with the request itself, detected before anything is probed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("state=started requires a non-empty '{parameter}'")]
    MissingReadinessParameter { parameter: &'static str },
    #[error("readiness pattern '{pattern}' is not a valid regular expression: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while driving the service to its desired state.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to launch command '{command}': {source}")]
    LaunchCommand {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("command '{command}' failed ({})", describe_exit(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
    },
    #[error("timed out after {timeout_secs} s waiting for {phase} on {endpoint}")]
    Timeout {
        phase: WaitPhase,
        endpoint: String,
        timeout_secs: u64,
    },
    #[error("readiness request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("cannot build readiness URL from '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match *exit_code {
        Some(code) => format!("exit status {code}"),
        None => String::from("terminated by signal"),
    }
}
