//! Service lifecycle management.
//!
//! The module is split into focused submodules so each concern remains small
//! and testable:
//! - [`types`] defines the request model and timing settings.
//! - [`error`] captures the error surface exposed to the CLI.
//! - [`socket`] probes the service's TCP port.
//! - [`readiness`] validates and fetches the HTTP readiness page.
//! - [`command`] runs start and stop commands through the shell.
//! - [`clock`] abstracts time so wait loops run deterministically in tests.
//! - [`controller`] implements the start/stop state machine.

mod clock;
mod command;
mod controller;
mod error;
mod readiness;
mod socket;
mod types;

pub use clock::{Clock, SystemClock};
pub use command::{CommandOutcome, CommandRunner, ShellCommandRunner};
pub use controller::{Collaborators, ServiceLifecycleController};
pub use error::{LifecycleError, ValidationError, WaitPhase};
pub use readiness::{BodyMatcher, HttpReadiness, ReadinessCheck, ReadinessRequest, ReadinessSource};
pub use socket::{PortProbe, TcpPortProbe};
pub use types::{
    Credentials, DEFAULT_TIMEOUT_SECS, DesiredState, LifecycleRequest, ServiceEndpoint, Timings,
};
