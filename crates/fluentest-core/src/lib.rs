//! Core domain for fluentest's server-under-test lifecycle.
//!
//! This crate holds the pure parts of the hosting subsystem:
//! - [`LaunchPlan`], [`ServerStatus`] and [`ConfigHash`] domain types
//! - Port traits for the process launcher, registry, readiness probe and clock
//! - The [`ServerManager`] that decides between reuse, relaunch and fresh launch
//!
//! OS-facing adapters live in `fluentest-runtime`.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{ConfigHash, LaunchPlan, PlanError, ServerStatus};
pub use ports::{
    Clock, ManualClock, ProbeError, ProcessError, ProcessHandle, ProcessLauncher,
    ProcessRegistry, ReadinessProbe, RegistryError,
};
pub use services::{ManagerState, ServerManager, ServerManagerError};
pub use settings::{
    DEFAULT_ASPIRE_STARTUP_TIMEOUT, DEFAULT_INITIAL_DELAY, DEFAULT_POLL_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_STARTUP_TIMEOUT, ManagerOptions,
};

// Re-export path utilities
pub use paths::{PathError, STATE_DIR_ENV, ensure_servers_dir, servers_dir, state_root};
