//! Hosting strategies: a uniform start/stop/status contract over the ways a
//! server under test can be run.
//!
//! - [`ManagedHosting`] drives a [`ServerManager`](fluentest_core::ServerManager)
//!   for any launch plan; the flavor options ([`DotnetHostingOptions`],
//!   [`NodeHostingOptions`], [`AspireHostingOptions`]) only build plans.
//! - [`ExternalHosting`] never spawns anything and only verifies readiness.

mod aspire;
mod config;
mod dotnet;
mod external;
mod managed;
mod node;

use async_trait::async_trait;
use fluentest_core::{
    ConfigHash, PlanError, ProbeError, ServerManagerError, ServerStatus,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use aspire::AspireHostingOptions;
pub use config::HostingConfig;
pub use dotnet::DotnetHostingOptions;
pub use external::{ExternalHosting, ExternalHostingOptions};
pub use managed::ManagedHosting;
pub use node::{NodeHostingOptions, PackageManager};

/// Outcome of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingResult {
    /// URL tests should target.
    pub base_url: Url,
    /// Whether an already-running server was adopted instead of launched.
    pub was_reused: bool,
}

/// Errors from hosting strategies.
#[derive(Debug, Error)]
pub enum HostingError {
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),

    #[error(transparent)]
    Manager(#[from] ServerManagerError),

    #[error("External server is not reachable: {0}")]
    Probe(#[from] ProbeError),

    #[error("Invalid hosting configuration: {0}")]
    Config(String),

    #[error("Hosting strategy has been disposed")]
    Disposed,
}

/// Start/stop/status contract shared by every way of hosting the app under test.
#[async_trait]
pub trait HostingStrategy: Send + Sync {
    /// Fingerprint of the configuration this strategy hosts.
    fn configuration_hash(&self) -> &ConfigHash;

    /// URL the server answers on.
    fn base_url(&self) -> &Url;

    /// Make the server available, reusing a running one when possible.
    async fn start(&self, cancel: &CancellationToken) -> Result<HostingResult, HostingError>;

    /// Stop the server if this strategy owns its lifecycle.
    async fn stop(&self) -> Result<(), HostingError>;

    /// Last known status, or `None` before a successful start.
    async fn status(&self) -> Result<Option<ServerStatus>, HostingError>;

    /// Release resources without stopping the server. Later calls fail.
    async fn dispose(&self);
}
