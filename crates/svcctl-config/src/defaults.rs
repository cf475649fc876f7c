//! Built-in defaults applied before any configuration layer is merged.

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Service manager invocation used to start the service when no override is
/// supplied.
pub const DEFAULT_START_COMMAND: &str = "systemctl start application.service";

/// Service manager invocation used to stop the service when no override is
/// supplied.
pub const DEFAULT_STOP_COMMAND: &str = "systemctl stop application.service";

/// Seconds slept between consecutive port or readiness polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Seconds waited after the port closes before a stop is declared complete.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 10;

/// Upper bound, in seconds, for a single TCP connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Upper bound, in seconds, for a single readiness HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    String::from(DEFAULT_LOG_FILTER)
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Owned default start command.
#[must_use]
pub fn default_start_command() -> String {
    String::from(DEFAULT_START_COMMAND)
}

/// Owned default stop command.
#[must_use]
pub fn default_stop_command() -> String {
    String::from(DEFAULT_STOP_COMMAND)
}

/// Default poll interval in seconds.
#[must_use]
pub const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Default grace period in seconds.
#[must_use]
pub const fn default_grace_period_secs() -> u64 {
    DEFAULT_GRACE_PERIOD_SECS
}

/// Default TCP connect timeout in seconds.
#[must_use]
pub const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Default HTTP request timeout in seconds.
#[must_use]
pub const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
