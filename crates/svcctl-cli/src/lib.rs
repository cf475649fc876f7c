//! Command-line runtime for `svcctl`.
//!
//! The runtime owns argument parsing, configuration bootstrapping, logging
//! setup and result rendering, then hands a [`lifecycle::LifecycleRequest`]
//! to the lifecycle controller. It can be driven from the binary entrypoint
//! or from tests where configuration loading, IO streams and the
//! controller's collaborators are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use svcctl_config::Config;
use tracing::{error, info};

mod cli;
mod config;
mod errors;
pub mod lifecycle;
pub mod report;
mod telemetry;

use cli::Cli;
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use lifecycle::{
    Collaborators, Credentials, HttpReadiness, LifecycleRequest, ServiceEndpoint,
    ServiceLifecycleController, ShellCommandRunner, SystemClock, TcpPortProbe, Timings,
};
use report::{Failure, OutputFormat, Report};

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `svcctl_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--start-command",
    "--stop-command",
    "--poll-interval-secs",
    "--grace-period-secs",
    "--connect-timeout-secs",
    "--request-timeout-secs",
];

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    deps: Collaborators<'a>,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L, deps: Collaborators<'a>) -> Self {
        Self { io, loader, deps }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let cli = match Cli::try_parse_from(cli_arguments) {
            Ok(cli) => cli,
            Err(usage)
                if matches!(
                    usage.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                let _ = write!(self.io.stdout, "{usage}");
                return ExitCode::SUCCESS;
            }
            Err(usage) => return self.fail(OutputFormat::default(), &AppError::CliUsage(usage)),
        };

        let format = cli.output;
        match self.execute(cli, &split) {
            Ok(report) => match report.write_to(format, &mut *self.io.stdout) {
                Ok(()) => ExitCode::SUCCESS,
                Err(render) => {
                    let _ = writeln!(self.io.stderr, "{}", AppError::EmitReport(render));
                    ExitCode::FAILURE
                }
            },
            Err(failure) => self.fail(format, &failure),
        }
    }

    fn execute(&mut self, cli: Cli, split: &ConfigArgumentSplit) -> Result<Report, AppError> {
        let config = self.loader.load(&split.config_arguments)?;
        telemetry::initialise(&config)?;
        let request = build_request(cli, &config);
        info!(
            state = %request.state,
            endpoint = %request.endpoint,
            timeout_secs = request.timeout.as_secs(),
            "lifecycle request accepted"
        );
        let controller =
            ServiceLifecycleController::new(&request, Timings::from_config(&config), self.deps);
        Ok(controller.execute()?)
    }

    /// Emits the failure document on stdout and the error on stderr.
    fn fail(&mut self, format: OutputFormat, failure: &AppError) -> ExitCode {
        error!(%failure, "svcctl failed");
        let document = Failure::new(failure.to_string());
        if let Err(render) = document.write_to(format, &mut *self.io.stdout) {
            let _ = writeln!(self.io.stderr, "{}", AppError::EmitReport(render));
        }
        let _ = writeln!(self.io.stderr, "{failure}");
        ExitCode::FAILURE
    }
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    if let Some(rest) = args.get(split.command_start..) {
        cli_arguments.extend(rest.iter().cloned());
    }
    cli_arguments
}

fn build_request(cli: Cli, config: &Config) -> LifecycleRequest {
    let state = cli.state.into();
    LifecycleRequest {
        state,
        endpoint: ServiceEndpoint::new(cli.host, cli.port),
        uri: cli.uri,
        pattern: cli.pattern,
        command: LifecycleRequest::resolve_command(state, cli.command, config),
        credentials: Credentials::from_parts(cli.admin_user, cli.admin_password),
        timeout: Duration::from_secs(cli.timeout),
        verbose: cli.verbose,
        check_mode: cli.check,
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let probe = TcpPortProbe;
    let readiness = HttpReadiness::default();
    let runner = ShellCommandRunner::default();
    let clock = SystemClock;
    let deps = Collaborators {
        probe: &probe,
        readiness: &readiness,
        runner: &runner,
        clock: &clock,
    };
    let mut io = IoStreams::new(stdout, stderr);
    run_with_collaborators(args, &mut io, &OrthoConfigLoader, deps)
}

/// Runs the CLI with a custom configuration loader and collaborators.
pub(crate) fn run_with_collaborators<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    deps: Collaborators<'a>,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader, deps).run(args)
}

#[cfg(test)]
mod tests;
