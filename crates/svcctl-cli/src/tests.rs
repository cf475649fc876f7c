use super::*;

use std::cell::{Cell, RefCell};
use std::time::Instant;

use rstest::{fixture, rstest};
use svcctl_config::ConfigError;

use crate::lifecycle::{
    Clock, CommandOutcome, CommandRunner, LifecycleError, PortProbe, ReadinessRequest,
    ReadinessSource,
};

struct StaticConfigLoader {
    config: Config,
    seen: RefCell<Vec<OsString>>,
}

impl StaticConfigLoader {
    fn new(config: Config) -> Self {
        Self {
            config,
            seen: RefCell::default(),
        }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.borrow_mut().extend(args.iter().cloned());
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Port that flips state whenever a command runs.
struct TogglingService {
    open: Cell<bool>,
    commands: RefCell<Vec<String>>,
    urls: RefCell<Vec<String>>,
    body: &'static str,
}

impl PortProbe for TogglingService {
    fn is_open(&self, _endpoint: &ServiceEndpoint, _timeout: Duration) -> bool {
        self.open.get()
    }
}

impl CommandRunner for TogglingService {
    fn run(&self, command: &str) -> Result<CommandOutcome, LifecycleError> {
        self.commands.borrow_mut().push(command.to_owned());
        self.open.set(!self.open.get());
        Ok(CommandOutcome {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

impl ReadinessSource for TogglingService {
    fn fetch(&self, request: &ReadinessRequest<'_>) -> Result<String, LifecycleError> {
        self.urls.borrow_mut().push(request.url.to_string());
        Ok(self.body.to_owned())
    }
}

struct InstantClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl Clock for InstantClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
    }
}

struct TestWorld {
    loader: StaticConfigLoader,
    service: TogglingService,
    clock: InstantClock,
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

impl TestWorld {
    fn with_port_open(self, open: bool) -> Self {
        self.service.open.set(open);
        self
    }

    fn run(&self, args: &[&str]) -> Outcome {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let deps = Collaborators {
            probe: &self.service,
            readiness: &self.service,
            runner: &self.service,
            clock: &self.clock,
        };
        let exit = {
            let mut io = IoStreams::new(&mut stdout, &mut stderr);
            run_with_collaborators(
                std::iter::once("svcctl")
                    .chain(args.iter().copied())
                    .map(OsString::from),
                &mut io,
                &self.loader,
                deps,
            )
        };
        Outcome {
            exit,
            stdout: String::from_utf8(stdout).expect("stdout utf8"),
            stderr: String::from_utf8(stderr).expect("stderr utf8"),
        }
    }

    fn commands(&self) -> Vec<String> {
        self.service.commands.borrow().clone()
    }
}

#[fixture]
fn world() -> TestWorld {
    TestWorld {
        loader: StaticConfigLoader::new(Config {
            start_command: String::from("start-default"),
            stop_command: String::from("stop-default"),
            ..Config::default()
        }),
        service: TogglingService {
            open: Cell::new(false),
            commands: RefCell::default(),
            urls: RefCell::default(),
            body: "<p>Server state: RUNNING</p>",
        },
        clock: InstantClock {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        },
    }
}

const STOP: &[&str] = &["stopped", "--host", "app", "--port", "7001"];
const START: &[&str] = &[
    "started",
    "--host",
    "app",
    "--port",
    "7001",
    "--uri",
    "/console",
    "--pattern",
    "state: RUNNING",
];

#[rstest]
fn stopping_a_stopped_service_reports_no_change(world: TestWorld) {
    let outcome = world.run(STOP);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout, "{\"changed\":false,\"msg\":\"\"}\n");
    assert!(world.commands().is_empty());
}

#[rstest]
fn stopping_a_running_service_uses_configured_command(world: TestWorld) {
    let world = world.with_port_open(true);
    let outcome = world.run(STOP);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(
        outcome.stdout,
        "{\"changed\":true,\"msg\":\"service stopped\"}\n"
    );
    assert_eq!(world.commands(), vec![String::from("stop-default")]);
}

#[rstest]
fn starting_honours_command_override_and_uri(world: TestWorld) {
    let mut args = START.to_vec();
    args.extend(["--cmd", "custom start", "--verbose"]);
    let outcome = world.run(&args);
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert_eq!(
        outcome.stdout,
        "{\"changed\":true,\"msg\":\"port is closed, port is open, instance is active, service started\"}\n"
    );
    assert_eq!(world.commands(), vec![String::from("custom start")]);
    assert_eq!(
        world.service.urls.borrow().as_slice(),
        &[String::from("http://app:7001/console")]
    );
}

#[rstest]
fn check_mode_with_human_output(world: TestWorld) {
    let mut args = START.to_vec();
    args.extend(["--check", "--output", "human"]);
    let outcome = world.run(&args);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout, "changed: service started\n");
    assert!(world.commands().is_empty());
}

#[rstest]
fn starting_without_uri_fails_with_validation_error(world: TestWorld) {
    let outcome = world.run(&["started", "--host", "app", "--port", "7001", "--pattern", "x"]);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert_eq!(
        outcome.stdout,
        "{\"failed\":true,\"msg\":\"state=started requires a non-empty 'uri'\"}\n"
    );
    assert_eq!(
        outcome.stderr,
        "state=started requires a non-empty 'uri'\n"
    );
}

#[rstest]
fn usage_errors_emit_failure_document(world: TestWorld) {
    let outcome = world.run(&["stopped", "--host", "app"]);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    let document: serde_json::Value =
        serde_json::from_str(&outcome.stdout).expect("failure document is json");
    assert_eq!(document["failed"], serde_json::Value::Bool(true));
    assert!(outcome.stderr.contains("--port"), "stderr: {}", outcome.stderr);
}

#[rstest]
fn help_is_written_to_stdout(world: TestWorld) {
    let outcome = world.run(&["--help"]);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("Usage:"), "stdout: {}", outcome.stdout);
    assert!(outcome.stderr.is_empty());
}

#[rstest]
fn leading_config_flags_reach_the_loader(world: TestWorld) {
    let mut args = vec!["--grace-period-secs", "2"];
    args.extend_from_slice(STOP);
    let outcome = world.run(&args);
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert_eq!(
        world.loader.seen.borrow().as_slice(),
        &[
            OsString::from("svcctl"),
            OsString::from("--grace-period-secs"),
            OsString::from("2"),
        ]
    );
}

#[rstest]
fn invalid_configuration_is_reported(mut world: TestWorld) {
    world.loader = StaticConfigLoader::new(Config {
        poll_interval_secs: 0,
        ..Config::default()
    });
    let outcome = world.run(STOP);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    let expected = AppError::InvalidConfiguration(ConfigError::ZeroDuration {
        setting: "poll_interval_secs",
    })
    .to_string();
    assert_eq!(outcome.stderr, format!("{expected}\n"));
}

#[test]
fn credentials_are_built_from_cli_arguments() {
    let cli = Cli::try_parse_from([
        "svcctl",
        "started",
        "--host",
        "app",
        "--port",
        "1",
        "--admin-user",
        "weblogic",
        "--admin-password",
        "secret",
        "--timeout",
        "30",
    ])
    .expect("parse arguments");
    let request = build_request(cli, &Config::default());
    let credentials = request.credentials.expect("credentials");
    assert_eq!(credentials.user, "weblogic");
    assert_eq!(credentials.password, "secret");
    assert_eq!(request.timeout, Duration::from_secs(30));
    assert_eq!(request.command, svcctl_config::DEFAULT_START_COMMAND);
}
