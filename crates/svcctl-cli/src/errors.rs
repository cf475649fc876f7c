//! Error types for the CLI runtime.

use std::sync::Arc;

use svcctl_config::ConfigError;
use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::report::RenderError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("failed to emit result: {0}")]
    EmitReport(#[from] RenderError),
}
