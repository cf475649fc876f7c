//! Layered configuration for the `svcctl` service lifecycle tool.
//!
//! Settings are merged from built-in defaults, an optional TOML file named by
//! `--config-path` (or `SVCCTL_CONFIG_PATH`), `SVCCTL_*` environment variables,
//! and finally configuration flags on the command line. The values here are
//! the ambient knobs of the tool; per-invocation parameters such as the target
//! host and desired state are parsed by the CLI itself.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GRACE_PERIOD_SECS, DEFAULT_LOG_FILTER,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_START_COMMAND,
    DEFAULT_STOP_COMMAND, default_connect_timeout_secs, default_grace_period_secs,
    default_log_filter, default_log_filter_string, default_log_format,
    default_poll_interval_secs, default_request_timeout_secs, default_start_command,
    default_stop_command,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Ambient configuration shared by every `svcctl` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SVCCTL")]
pub struct Config {
    /// `tracing` filter expression applied to diagnostic output.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for diagnostic logs.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Command executed to start the service when no override is given.
    #[serde(default = "default_start_command")]
    #[ortho_config(default = default_start_command())]
    pub start_command: String,
    /// Command executed to stop the service when no override is given.
    #[serde(default = "default_stop_command")]
    #[ortho_config(default = default_stop_command())]
    pub stop_command: String,
    /// Seconds slept between polls.
    #[serde(default = "default_poll_interval_secs")]
    #[ortho_config(default = default_poll_interval_secs())]
    pub poll_interval_secs: u64,
    /// Seconds waited after the port closes during a stop.
    #[serde(default = "default_grace_period_secs")]
    #[ortho_config(default = default_grace_period_secs())]
    pub grace_period_secs: u64,
    /// Upper bound for a single TCP connect attempt, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    #[ortho_config(default = default_connect_timeout_secs())]
    pub connect_timeout_secs: u64,
    /// Upper bound for a single readiness HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    #[ortho_config(default = default_request_timeout_secs())]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            start_command: default_start_command(),
            stop_command: default_stop_command(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the default start command.
    #[must_use]
    pub fn start_command(&self) -> &str {
        self.start_command.as_str()
    }

    /// Returns the default stop command.
    #[must_use]
    pub fn stop_command(&self) -> &str {
        self.stop_command.as_str()
    }

    /// Interval slept between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Delay applied after the port closes during a stop.
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// Cap for a single TCP connect attempt.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Cap for a single readiness HTTP request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rejects settings that would make the polling loops misbehave.
    ///
    /// A zero poll interval turns every wait into a busy loop, and a zero
    /// network timeout is refused by the socket layer, so both are errors.
    /// The grace period may legitimately be zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] naming the first offending
    /// setting, or [`ConfigError::EmptyCommand`] when a default command is
    /// blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("poll_interval_secs", self.poll_interval_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ];
        if let Some((setting, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroDuration { setting: *setting });
        }
        let commands = [
            ("start_command", self.start_command.as_str()),
            ("stop_command", self.stop_command.as_str()),
        ];
        if let Some((setting, _)) = commands.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::EmptyCommand { setting: *setting });
        }
        Ok(())
    }
}

/// Errors raised when a merged configuration is internally inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A duration setting that must be positive was zero.
    #[error("configuration setting '{setting}' must be greater than zero")]
    ZeroDuration {
        /// Name of the offending setting.
        setting: &'static str,
    },
    /// A default command was empty or whitespace.
    #[error("configuration setting '{setting}' must not be empty")]
    EmptyCommand {
        /// Name of the offending setting.
        setting: &'static str,
    },
}
