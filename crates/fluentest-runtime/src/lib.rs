//! OS-facing adapters for fluentest.
//!
//! - [`registry`]: JSON files per configuration hash, with orphan sweeping
//! - [`process`]: launching plans as process groups, streaming their output,
//!   and SIGTERM → SIGKILL shutdown
//! - [`probe`]: HTTP readiness polling with `reqwest`
//! - [`hosting`]: dotnet / node / aspire / external hosting strategies
//!
//! [`bootstrap`] wires them into a [`fluentest_core::ServerManager`].

mod bootstrap;
pub mod clock;
pub mod hosting;
pub mod probe;
pub mod process;
pub mod registry;

pub use bootstrap::{HostingContext, RuntimeConfig, bootstrap};
pub use clock::TokioClock;
pub use hosting::{HostingConfig, HostingError, HostingResult, HostingStrategy};
pub use probe::HttpReadinessProbe;
pub use process::TokioProcessLauncher;
pub use registry::FileProcessRegistry;
