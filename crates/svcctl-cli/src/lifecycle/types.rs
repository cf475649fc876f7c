//! Request models shared across the lifecycle flows.
//!
//! A [`LifecycleRequest`] is built once per invocation from the parsed command
//! line and the merged configuration, then handed to the controller by
//! reference.

#![deny(missing_docs)]

use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use svcctl_config::Config;
use url::Url;

/// Default budget, in seconds, for each blocking wait phase.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// State the caller wants the service to end up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    /// Port open and readiness page matching.
    Started,
    /// Port closed.
    Stopped,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => formatter.write_str("started"),
            Self::Stopped => formatter.write_str("stopped"),
        }
    }
}

/// TCP address of the managed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Host name or IP literal.
    pub host: String,
    /// TCP port of the service listener.
    pub port: u16,
}

impl ServiceEndpoint {
    /// Endpoint for `host` and `port`; the host is not validated.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Root URL of the service's HTTP interface.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{self}/"))
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(formatter, "[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "{}:{}", self.host, self.port)
        }
    }
}

/// Basic-Auth credentials for the readiness request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Admin user name.
    pub user: String,
    /// Admin password; empty when none was given.
    pub password: String,
}

impl Credentials {
    /// Builds credentials when a user is present; a missing password is
    /// treated as empty.
    pub fn from_parts(user: Option<String>, password: Option<String>) -> Option<Self> {
        user.map(|user| Self {
            user,
            password: password.unwrap_or_default(),
        })
    }

    /// Value for the `Authorization` header.
    pub fn basic_auth_header(&self) -> String {
        let token = BASE64_STANDARD.encode(format!("{}:{}", self.user, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the controller needs to drive one invocation.
#[derive(Debug, Clone)]
pub struct LifecycleRequest {
    /// Target state.
    pub state: DesiredState,
    /// Where the service listens.
    pub endpoint: ServiceEndpoint,
    /// Readiness page path, required when starting.
    pub uri: Option<String>,
    /// Regular expression the readiness body must match.
    pub pattern: Option<String>,
    /// Start or stop command, already resolved against the configured
    /// defaults.
    pub command: String,
    /// Basic-Auth credentials sent with readiness requests.
    pub credentials: Option<Credentials>,
    /// Budget for each blocking wait phase.
    pub timeout: Duration,
    /// Adds per-observation messages to the report.
    pub verbose: bool,
    /// Dry-run: report the intended change without running commands.
    pub check_mode: bool,
}

impl LifecycleRequest {
    /// Picks the command override when given, else the configured default
    /// for the desired state.
    pub fn resolve_command(state: DesiredState, command: Option<String>, config: &Config) -> String {
        command.unwrap_or_else(|| match state {
            DesiredState::Started => config.start_command().to_owned(),
            DesiredState::Stopped => config.stop_command().to_owned(),
        })
    }
}

/// Poll cadence and per-call caps taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Sleep between failed observations.
    pub poll_interval: Duration,
    /// Pause after the port closes on stop.
    pub grace_period: Duration,
    /// Cap on a single connect attempt.
    pub connect_timeout: Duration,
    /// Cap on a single readiness request.
    pub request_timeout: Duration,
}

impl Timings {
    /// Copies the poll interval, grace period and call caps out of `config`.
    pub const fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            grace_period: config.grace_period(),
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::hostname("app.internal", "app.internal:8080")]
    #[case::ipv4("10.0.0.4", "10.0.0.4:8080")]
    #[case::ipv6("::1", "[::1]:8080")]
    fn endpoint_display_brackets_ipv6(#[case] host: &str, #[case] expected: &str) {
        assert_eq!(ServiceEndpoint::new(host, 8080).to_string(), expected);
    }

    #[test]
    fn base_url_targets_http_root() {
        let url = ServiceEndpoint::new("localhost", 7001)
            .base_url()
            .expect("valid url");
        assert_eq!(url.as_str(), "http://localhost:7001/");
    }

    #[test]
    fn basic_auth_header_encodes_user_and_password() {
        let credentials = Credentials {
            user: String::from("admin"),
            password: String::from("secret"),
        };
        assert_eq!(credentials.basic_auth_header(), "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn credentials_require_a_user() {
        assert_eq!(Credentials::from_parts(None, Some(String::from("pw"))), None);
        let credentials =
            Credentials::from_parts(Some(String::from("admin")), None).expect("credentials");
        assert_eq!(credentials.password, "");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials {
            user: String::from("admin"),
            password: String::from("hunter2"),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
    }

    #[rstest]
    #[case::start_default(DesiredState::Started, None, "start-default")]
    #[case::stop_default(DesiredState::Stopped, None, "stop-default")]
    #[case::override_wins(DesiredState::Started, Some("custom"), "custom")]
    fn command_resolution_prefers_override(
        #[case] state: DesiredState,
        #[case] command: Option<&str>,
        #[case] expected: &str,
    ) {
        let config = Config {
            start_command: String::from("start-default"),
            stop_command: String::from("stop-default"),
            ..Config::default()
        };
        let resolved = LifecycleRequest::resolve_command(state, command.map(String::from), &config);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn timings_copy_configured_durations() {
        let config = Config {
            poll_interval_secs: 2,
            grace_period_secs: 7,
            connect_timeout_secs: 3,
            request_timeout_secs: 11,
            ..Config::default()
        };
        assert_eq!(
            Timings::from_config(&config),
            Timings {
                poll_interval: Duration::from_secs(2),
                grace_period: Duration::from_secs(7),
                connect_timeout: Duration::from_secs(3),
                request_timeout: Duration::from_secs(11),
            }
        );
    }
}
