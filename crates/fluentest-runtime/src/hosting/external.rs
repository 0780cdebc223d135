//! Probe-only hosting for servers someone else runs.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fluentest_core::domain::duration_ms;
use fluentest_core::{
    ConfigHash, DEFAULT_POLL_INTERVAL, DEFAULT_STARTUP_TIMEOUT, LaunchPlan, ReadinessProbe,
    ServerStatus,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use super::{HostingError, HostingResult, HostingStrategy};

/// Where the pre-started server lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalHostingOptions {
    pub base_url: Url,
    #[serde(default)]
    pub health_check_endpoints: Vec<String>,
    #[serde(with = "duration_ms", default = "default_startup_timeout")]
    pub startup_timeout: Duration,
    #[serde(with = "duration_ms", default = "default_poll_interval")]
    pub poll_interval: Duration,
}

const fn default_startup_timeout() -> Duration {
    DEFAULT_STARTUP_TIMEOUT
}

const fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

impl ExternalHostingOptions {
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            health_check_endpoints: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_health_check_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.health_check_endpoints.push(endpoint.into());
        self
    }

    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Probe-only plan: no executable.
    pub fn to_launch_plan(&self) -> LaunchPlan {
        LaunchPlan::external(self.base_url.clone())
            .with_health_check_endpoints(self.health_check_endpoints.clone())
            .with_startup_timeout(self.startup_timeout)
            .with_poll_interval(self.poll_interval)
    }
}

/// Verifies that a pre-existing server answers; never spawns or kills anything.
pub struct ExternalHosting {
    plan: LaunchPlan,
    hash: ConfigHash,
    base_url: Url,
    probe: Arc<dyn ReadinessProbe>,
    status: Mutex<Option<ServerStatus>>,
    disposed: AtomicBool,
}

impl ExternalHosting {
    pub fn new(
        options: &ExternalHostingOptions,
        probe: Arc<dyn ReadinessProbe>,
    ) -> Result<Self, HostingError> {
        let plan = options.to_launch_plan();
        plan.validate_for_probe()?;
        Ok(Self {
            hash: plan.config_hash(),
            base_url: options.base_url.clone(),
            plan,
            probe,
            status: Mutex::new(None),
            disposed: AtomicBool::new(false),
        })
    }

    fn ensure_not_disposed(&self) -> Result<(), HostingError> {
        if self.disposed.load(Ordering::SeqCst) {
            Err(HostingError::Disposed)
        } else {
            Ok(())
        }
    }

    fn set_status(&self, status: Option<ServerStatus>) {
        *self
            .status
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = status;
    }
}

#[async_trait]
impl HostingStrategy for ExternalHosting {
    fn configuration_hash(&self) -> &ConfigHash {
        &self.hash
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn start(&self, cancel: &CancellationToken) -> Result<HostingResult, HostingError> {
        self.ensure_not_disposed()?;

        self.probe.wait_until_ready(&self.plan, cancel).await?;
        info!(url = %self.base_url, "External server is reachable");

        self.set_status(Some(ServerStatus::external(
            self.base_url.clone(),
            self.hash.clone(),
        )));
        Ok(HostingResult {
            base_url: self.base_url.clone(),
            was_reused: true,
        })
    }

    async fn stop(&self) -> Result<(), HostingError> {
        self.ensure_not_disposed()?;
        self.set_status(None);
        Ok(())
    }

    async fn status(&self) -> Result<Option<ServerStatus>, HostingError> {
        self.ensure_not_disposed()?;
        Ok(self
            .status
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}
