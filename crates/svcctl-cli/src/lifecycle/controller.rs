//! Drives one service towards its desired state.
//!
//! The controller owns the per-invocation `changed` flag and message log and
//! talks to the outside world only through [`Collaborators`], so the whole
//! state machine runs against fakes in tests.

#![deny(missing_docs)]

use tracing::{debug, info};

use super::clock::{Clock, PhaseTimer, call_timeout};
use super::command::CommandRunner;
use super::error::{LifecycleError, WaitPhase};
use super::readiness::{ReadinessCheck, ReadinessRequest, ReadinessSource};
use super::socket::PortProbe;
use super::types::{DesiredState, LifecycleRequest, Timings};
use crate::report::Report;

/// External effects the controller depends on.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Checks whether the service port accepts connections.
    pub probe: &'a dyn PortProbe,
    /// Fetches the readiness page body.
    pub readiness: &'a dyn ReadinessSource,
    /// Executes start and stop commands.
    pub runner: &'a dyn CommandRunner,
    /// Time source for phase deadlines and poll sleeps.
    pub clock: &'a dyn Clock,
}

/// State machine for a single start/stop invocation.
pub struct ServiceLifecycleController<'a> {
    request: &'a LifecycleRequest,
    timings: Timings,
    deps: Collaborators<'a>,
    changed: bool,
    messages: Vec<String>,
}

impl<'a> ServiceLifecycleController<'a> {
    /// Creates a controller with nothing changed and no messages yet.
    pub fn new(request: &'a LifecycleRequest, timings: Timings, deps: Collaborators<'a>) -> Self {
        Self {
            request,
            timings,
            deps,
            changed: false,
            messages: Vec::new(),
        }
    }

    /// Runs the flow for the requested state and returns the final report.
    pub fn execute(mut self) -> Result<Report, LifecycleError> {
        info!(
            state = %self.request.state,
            endpoint = %self.request.endpoint,
            check_mode = self.request.check_mode,
            "ensuring service state"
        );
        match self.request.state {
            DesiredState::Started => self.ensure_started()?,
            DesiredState::Stopped => self.ensure_stopped()?,
        }
        Ok(self.report())
    }

    /// Single bounded connect attempt against the service port.
    pub fn probe_running(&mut self) -> bool {
        self.probe_with_budget(self.timings.connect_timeout)
    }

    /// Starts the service unless its port is already open, then waits for
    /// the readiness page to match.
    pub fn ensure_started(&mut self) -> Result<(), LifecycleError> {
        let check = ReadinessCheck::from_parameters(
            self.request.uri.as_deref(),
            self.request.pattern.as_deref(),
        )?;
        if self.probe_running() {
            info!(endpoint = %self.request.endpoint, "service already running");
            return self.wait_for_ready(&check);
        }
        if !self.request.check_mode {
            self.run_command(&self.request.command)?;
            self.wait_for_port(true)?;
            self.wait_for_ready(&check)?;
        }
        self.record_change("service started");
        Ok(())
    }

    /// Stops the service if its port is open, waits for the port to close
    /// and then sleeps out the grace period.
    pub fn ensure_stopped(&mut self) -> Result<(), LifecycleError> {
        if !self.probe_running() {
            info!(endpoint = %self.request.endpoint, "service already stopped");
            return Ok(());
        }
        if !self.request.check_mode {
            self.run_command(&self.request.command)?;
            self.wait_for_port(false)?;
            debug!(
                grace_secs = self.timings.grace_period.as_secs(),
                "port closed; waiting out grace period"
            );
            self.deps.clock.sleep(self.timings.grace_period);
        }
        self.record_change("service stopped");
        Ok(())
    }

    /// Polls the readiness page until its body matches.
    pub fn wait_for_ready(&mut self, check: &ReadinessCheck) -> Result<(), LifecycleError> {
        let url = check.url(&self.request.endpoint)?;
        let authorization = self
            .request
            .credentials
            .as_ref()
            .map(|credentials| credentials.basic_auth_header());
        let timer = PhaseTimer::start(self.deps.clock, self.request.timeout);
        info!(%url, "waiting for readiness");
        loop {
            let body = self.deps.readiness.fetch(&ReadinessRequest {
                url: &url,
                authorization: authorization.as_deref(),
                timeout: call_timeout(
                    self.timings.request_timeout,
                    timer.remaining(self.deps.clock),
                ),
            })?;
            if check.matches(&body) {
                info!(%url, "readiness pattern matched");
                self.note("instance is active");
                return Ok(());
            }
            debug!(%url, body_len = body.len(), "readiness pattern not matched yet");
            if timer.expired(self.deps.clock) {
                return Err(self.timeout(WaitPhase::Readiness));
            }
            self.deps.clock.sleep(self.timings.poll_interval);
        }
    }

    /// Runs a start or stop command; anything but exit status zero fails.
    pub fn run_command(&self, command: &str) -> Result<(), LifecycleError> {
        info!(command, "running lifecycle command");
        let outcome = self.deps.runner.run(command)?;
        debug!(
            command,
            exit_code = ?outcome.exit_code,
            stdout = %outcome.stdout.trim_end(),
            stderr = %outcome.stderr.trim_end(),
            "lifecycle command finished"
        );
        match outcome.exit_code {
            Some(0) => Ok(()),
            exit_code => Err(LifecycleError::CommandFailed {
                command: command.to_owned(),
                exit_code,
            }),
        }
    }

    /// Snapshot of the change flag and the comma-joined messages.
    pub fn report(&self) -> Report {
        Report {
            changed: self.changed,
            msg: self.messages.join(", "),
        }
    }

    fn wait_for_port(&mut self, want_open: bool) -> Result<(), LifecycleError> {
        let phase = if want_open {
            WaitPhase::PortOpen
        } else {
            WaitPhase::PortClosed
        };
        let timer = PhaseTimer::start(self.deps.clock, self.request.timeout);
        info!(endpoint = %self.request.endpoint, %phase, "waiting for port");
        loop {
            let remaining = timer.remaining(self.deps.clock);
            if self.probe_with_budget(remaining) == want_open {
                return Ok(());
            }
            if timer.expired(self.deps.clock) {
                return Err(self.timeout(phase));
            }
            self.deps.clock.sleep(self.timings.poll_interval);
        }
    }

    fn probe_with_budget(&mut self, remaining: std::time::Duration) -> bool {
        let timeout = call_timeout(self.timings.connect_timeout, remaining);
        let open = self.deps.probe.is_open(&self.request.endpoint, timeout);
        debug!(endpoint = %self.request.endpoint, open, "probed service port");
        self.note(if open { "port is open" } else { "port is closed" });
        open
    }

    fn timeout(&self, phase: WaitPhase) -> LifecycleError {
        LifecycleError::Timeout {
            phase,
            endpoint: self.request.endpoint.to_string(),
            timeout_secs: self.request.timeout.as_secs(),
        }
    }

    /// Verbose-only observation.
    fn note(&mut self, message: &str) {
        if self.request.verbose {
            self.messages.push(message.to_owned());
        }
    }

    fn record_change(&mut self, message: &str) {
        self.changed = true;
        self.messages.push(message.to_owned());
    }
}
