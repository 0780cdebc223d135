//! Hosting backed by a [`ServerManager`].

use async_trait::async_trait;
use fluentest_core::{ConfigHash, LaunchPlan, ManagerState, ServerManager, ServerStatus};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{HostingError, HostingResult, HostingStrategy};

/// Launches (or reuses) a server from a plan through a [`ServerManager`].
///
/// Calls are serialized on the manager, so a strategy can be shared across
/// concurrently running tests.
pub struct ManagedHosting {
    plan: LaunchPlan,
    hash: ConfigHash,
    base_url: Url,
    manager: Mutex<ServerManager>,
}

impl ManagedHosting {
    pub fn new(plan: LaunchPlan, manager: ServerManager) -> Result<Self, HostingError> {
        plan.validate_for_launch()?;
        let base_url = plan.require_base_url()?.clone();
        Ok(Self {
            hash: plan.config_hash(),
            base_url,
            plan,
            manager: Mutex::new(manager),
        })
    }

    pub const fn plan(&self) -> &LaunchPlan {
        &self.plan
    }

    /// Stop and relaunch from the last started plan.
    pub async fn restart(&self, cancel: &CancellationToken) -> Result<HostingResult, HostingError> {
        let mut manager = self.manager.lock().await;
        let status = manager.restart(cancel).await?;
        Ok(HostingResult {
            base_url: status.base_url,
            was_reused: false,
        })
    }

    pub async fn state(&self) -> ManagerState {
        self.manager.lock().await.state()
    }
}

#[async_trait]
impl HostingStrategy for ManagedHosting {
    fn configuration_hash(&self) -> &ConfigHash {
        &self.hash
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn start(&self, cancel: &CancellationToken) -> Result<HostingResult, HostingError> {
        let mut manager = self.manager.lock().await;
        let status = manager.ensure_started(self.plan.clone(), cancel).await?;
        Ok(HostingResult {
            base_url: status.base_url,
            was_reused: manager.state() == ManagerState::Reused,
        })
    }

    async fn stop(&self) -> Result<(), HostingError> {
        self.manager.lock().await.stop().await?;
        Ok(())
    }

    async fn status(&self) -> Result<Option<ServerStatus>, HostingError> {
        Ok(self.manager.lock().await.status()?)
    }

    async fn dispose(&self) {
        self.manager.lock().await.dispose();
    }
}
