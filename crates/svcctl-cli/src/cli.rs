//! CLI argument definitions for `svcctl`.

use clap::{Parser, ValueEnum};

use crate::lifecycle::{DEFAULT_TIMEOUT_SECS, DesiredState};
use crate::report::OutputFormat;

/// Desired service state as spelled on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum StateArg {
    /// Ensure the service is running and ready.
    Started,
    /// Ensure the service is not listening.
    Stopped,
}

impl From<StateArg> for DesiredState {
    fn from(value: StateArg) -> Self {
        match value {
            StateArg::Started => Self::Started,
            StateArg::Stopped => Self::Stopped,
        }
    }
}

/// Starts or stops an application service and waits until it settles.
#[derive(Parser, Debug)]
#[command(name = "svcctl", version)]
pub(crate) struct Cli {
    /// Desired service state.
    #[arg(value_enum, value_name = "STATE")]
    pub(crate) state: StateArg,
    /// Host the service listens on.
    #[arg(long)]
    pub(crate) host: String,
    /// TCP port probed to decide whether the service runs.
    #[arg(long)]
    pub(crate) port: u16,
    /// Path of the readiness page (required for `started`).
    #[arg(long)]
    pub(crate) uri: Option<String>,
    /// Regular expression the readiness page must match (required for `started`).
    #[arg(long)]
    pub(crate) pattern: Option<String>,
    /// Overrides the configured start or stop command.
    #[arg(long = "cmd", value_name = "COMMAND")]
    pub(crate) command: Option<String>,
    /// Basic-Auth user for the readiness request.
    #[arg(long)]
    pub(crate) admin_user: Option<String>,
    /// Basic-Auth password for the readiness request.
    #[arg(long, env = "SVCCTL_ADMIN_PASSWORD", hide_env_values = true)]
    pub(crate) admin_password: Option<String>,
    /// Seconds allowed for each blocking wait phase.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub(crate) timeout: u64,
    /// Records intermediate observations in the result message.
    #[arg(long)]
    pub(crate) verbose: bool,
    /// Reports the change that would be made without running commands.
    #[arg(long)]
    pub(crate) check: bool,
    /// Controls how the result document is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) output: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn minimal_stop_invocation_uses_defaults() {
        let cli = Cli::try_parse_from(["svcctl", "stopped", "--host", "app", "--port", "7001"])
            .expect("parse arguments");
        assert_eq!(DesiredState::from(cli.state), DesiredState::Stopped);
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(!cli.check && !cli.verbose);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn missing_port_is_a_usage_error() {
        let error = Cli::try_parse_from(["svcctl", "started", "--host", "app"])
            .expect_err("port is required");
        assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn unknown_state_is_rejected() {
        let error = Cli::try_parse_from(["svcctl", "restarted", "--host", "app", "--port", "1"])
            .expect_err("invalid state");
        assert_eq!(error.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
