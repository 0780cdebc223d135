//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the lifecycle orchestration expects from
//! infrastructure. They contain no implementation details and use only domain
//! types.
//!
//! # Design Rules
//!
//! - No `tokio::process` or `reqwest` types in any signature
//! - The registry is the only component that touches persisted state
//! - Time is injected through [`Clock`] so polling can be simulated

pub mod clock;
pub mod process;
pub mod readiness;
pub mod registry;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::PlanError;
use crate::paths::PathError;

pub use clock::{Clock, ManualClock};
pub use process::{ProcessHandle, ProcessLauncher};
pub use readiness::ReadinessProbe;
pub use registry::ProcessRegistry;

/// Errors from starting or stopping OS processes.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The OS refused to start the process, or the executable was not found.
    #[error("Failed to start `{command}`: {reason}")]
    StartFailed { command: String, reason: String },

    /// The process could not be terminated.
    #[error("Failed to stop process {pid}: {reason}")]
    StopFailed { pid: u32, reason: String },

    /// The plan is not launchable.
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),
}

/// Errors from waiting on readiness endpoints.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The plan is not probeable (missing base URL, bad endpoint).
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),

    /// No endpoint answered with a 2xx status before the budget ran out.
    #[error("Server was not ready after {elapsed:?} ({attempts} sweeps, last error: {last_error})")]
    Timeout {
        elapsed: Duration,
        attempts: u32,
        last_error: String,
    },

    /// The wait was cancelled by the caller.
    #[error("Readiness probe cancelled after {elapsed:?}")]
    Cancelled { elapsed: Duration },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Errors from the persisted server registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The state directory could not be resolved or created.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Reading or writing an entry failed.
    #[error("Registry I/O failed for {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// An entry could not be encoded.
    #[error("Registry entry {path} could not be serialized: {reason}")]
    Serialization { path: PathBuf, reason: String },
}
