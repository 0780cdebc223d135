//! Server manager - decides between reusing, relaunching and launching a server.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{ConfigHash, LaunchPlan, PlanError, ServerStatus};
use crate::ports::{
    ProbeError, ProcessError, ProcessHandle, ProcessLauncher, ProcessRegistry, ReadinessProbe,
    RegistryError,
};
use crate::settings::ManagerOptions;

/// Where a manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerState {
    /// Nothing started or reused yet.
    #[default]
    Unknown,
    /// A process was spawned and is being probed.
    Launching,
    /// A server from a previous run was adopted.
    Reused,
    /// A server launched by this manager passed its probe.
    Healthy,
    /// The managed server was stopped.
    Stopped,
}

/// Errors from [`ServerManager`] operations.
#[derive(Debug, Error)]
pub enum ServerManagerError {
    #[error("Invalid launch plan: {0}")]
    InvalidPlan(#[from] PlanError),

    #[error("Launch failed: {0}")]
    Launch(#[from] ProcessError),

    #[error("Server did not become ready: {0}")]
    Probe(#[from] ProbeError),

    #[error("Server process {pid} exited before becoming ready (exit code {exit_code:?})")]
    ProcessExited { pid: u32, exit_code: Option<i32> },

    #[error("Registry update failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Cannot restart: no previous configuration, call ensure_started first")]
    NoPreviousConfiguration,

    #[error("Server manager has been disposed")]
    Disposed,
}

/// Owns at most one server per instance.
///
/// Every operation takes `&mut self`, so callers sharing a manager across
/// tasks must serialize access themselves (typically with a
/// `tokio::sync::Mutex`).
pub struct ServerManager {
    registry: Arc<dyn ProcessRegistry>,
    launcher: Arc<dyn ProcessLauncher>,
    probe: Arc<dyn ReadinessProbe>,
    options: ManagerOptions,
    current: Option<ServerStatus>,
    process: Option<Box<dyn ProcessHandle>>,
    last_plan: Option<LaunchPlan>,
    state: ManagerState,
    disposed: bool,
}

impl ServerManager {
    /// Create a manager with default options.
    pub fn new(
        registry: Arc<dyn ProcessRegistry>,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn ReadinessProbe>,
    ) -> Self {
        Self::with_options(registry, launcher, probe, ManagerOptions::default())
    }

    pub fn with_options(
        registry: Arc<dyn ProcessRegistry>,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn ReadinessProbe>,
        options: ManagerOptions,
    ) -> Self {
        Self {
            registry,
            launcher,
            probe,
            options,
            current: None,
            process: None,
            last_plan: None,
            state: ManagerState::Unknown,
            disposed: false,
        }
    }

    /// Make sure a healthy server for `plan` is running and return its status.
    ///
    /// A healthy registry entry with the same configuration hash is reused
    /// without launching anything. A stale or drifted entry (same base URL,
    /// different hash) is killed and replaced.
    pub async fn ensure_started(
        &mut self,
        plan: LaunchPlan,
        cancel: &CancellationToken,
    ) -> Result<ServerStatus, ServerManagerError> {
        self.ensure_not_disposed()?;
        plan.validate_for_launch()?;
        let base_url = plan.require_base_url()?.clone();
        let hash = plan.config_hash();

        if let Some(current) = self.current.clone() {
            if !current.is_reusable_for(&hash) {
                debug!(old = %current.config_hash.short(), new = %hash.short(), "Plan changed, retiring current server");
                self.retire(&current).await;
            }
        }

        let existing = match self.registry.try_load(&hash).await {
            Some(status) => Some(status),
            None => self.registry.find_by_base_url(&base_url).await,
        };

        if let Some(existing) = existing {
            if existing.is_reusable_for(&hash) {
                info!(
                    pid = ?existing.pid,
                    url = %existing.base_url,
                    hash = %hash.short(),
                    "Reusing running server"
                );
                if self
                    .process
                    .as_ref()
                    .is_some_and(|process| Some(process.id()) != existing.pid)
                {
                    self.process = None;
                }
                self.current = Some(existing.clone());
                self.last_plan = Some(plan);
                self.state = ManagerState::Reused;
                return Ok(existing);
            }

            info!(
                pid = ?existing.pid,
                url = %existing.base_url,
                healthy = existing.is_healthy,
                "Replacing stale server"
            );
            self.retire(&existing).await;
        }

        if self.options.kill_orphans {
            let removed = self.registry.kill_orphans().await;
            if removed > 0 {
                info!(removed, "Removed orphaned registry entries");
            }
        }

        self.launch(plan, hash, base_url, cancel).await
    }

    /// Stop the current server and start it again from the last plan.
    pub async fn restart(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<ServerStatus, ServerManagerError> {
        self.ensure_not_disposed()?;
        let plan = self
            .last_plan
            .clone()
            .ok_or(ServerManagerError::NoPreviousConfiguration)?;

        self.stop().await?;
        self.ensure_started(plan, cancel).await
    }

    /// Kill the managed server and forget it. Succeeds when nothing is running.
    pub async fn stop(&mut self) -> Result<(), ServerManagerError> {
        self.ensure_not_disposed()?;

        let Some(status) = self.current.take() else {
            self.process = None;
            self.state = ManagerState::Stopped;
            return Ok(());
        };

        if let Some(pid) = status.pid {
            if self.registry.try_kill(pid).await {
                info!(pid, "Stopped server");
            } else {
                debug!(pid, "Server process was already gone");
            }
        }
        self.release_process();
        self.state = ManagerState::Stopped;
        self.registry.delete(&status.config_hash).await?;
        Ok(())
    }

    /// The server this manager currently owns, if any.
    pub fn status(&self) -> Result<Option<ServerStatus>, ServerManagerError> {
        self.ensure_not_disposed()?;
        Ok(self.current.clone())
    }

    pub const fn state(&self) -> ManagerState {
        self.state
    }

    /// Plan from the last successful [`ensure_started`](Self::ensure_started).
    pub const fn last_plan(&self) -> Option<&LaunchPlan> {
        self.last_plan.as_ref()
    }

    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the process handle without killing the server.
    ///
    /// The registry entry stays so the next run can reuse the server. Every
    /// later call fails with [`ServerManagerError::Disposed`]. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(process) = self.process.take() {
            debug!(pid = process.id(), "Releasing server process handle");
        }
        self.disposed = true;
    }

    async fn launch(
        &mut self,
        plan: LaunchPlan,
        hash: ConfigHash,
        base_url: Url,
        cancel: &CancellationToken,
    ) -> Result<ServerStatus, ServerManagerError> {
        self.state = ManagerState::Launching;
        info!(command = %plan.command_line(), hash = %hash.short(), "Launching server");

        let mut process = match self.launcher.start(&plan).await {
            Ok(process) => process,
            Err(e) => {
                self.state = ManagerState::Unknown;
                return Err(e.into());
            }
        };
        let pid = process.id();

        let outcome = tokio::select! {
            ready = self.probe.wait_until_ready(&plan, cancel) => ready.map_err(ServerManagerError::from),
            exit_code = process.wait_for_exit() => Err(ServerManagerError::ProcessExited { pid, exit_code }),
        };

        let ready_url = match outcome {
            Ok(url) => url,
            Err(e) => {
                warn!(pid, error = %e, "Server failed to become ready");
                self.abandon(process).await;
                return Err(e);
            }
        };

        let status = match self.registry.update_with_ready(&hash, pid, &base_url).await {
            Ok(status) => status,
            Err(e) => {
                self.abandon(process).await;
                return Err(e.into());
            }
        };

        info!(pid, url = %ready_url, "Server ready");
        self.process = Some(process);
        self.current = Some(status.clone());
        self.last_plan = Some(plan);
        self.state = ManagerState::Healthy;
        Ok(status)
    }

    /// Kill a process that never made it into the registry.
    async fn abandon(&mut self, mut process: Box<dyn ProcessHandle>) {
        if !process.has_exited() {
            if let Err(e) = process.kill().await {
                warn!(pid = process.id(), error = %e, "Failed to kill server process");
            }
        }
        self.state = ManagerState::Unknown;
    }

    /// Kill a known server and drop its registry entry.
    async fn retire(&mut self, stale: &ServerStatus) {
        if let Some(pid) = stale.pid {
            if !self.registry.try_kill(pid).await {
                debug!(pid, "Stale server process was already gone");
            }
        }
        if let Err(e) = self.registry.delete(&stale.config_hash).await {
            warn!(hash = %stale.config_hash.short(), error = %e, "Failed to delete registry entry");
        }
        if self
            .process
            .as_ref()
            .is_some_and(|process| Some(process.id()) == stale.pid)
        {
            self.release_process();
        }
        if self.current.as_ref() == Some(stale) {
            self.current = None;
        }
    }

    /// Drop the owned handle; polling it first reaps a process that was just killed.
    fn release_process(&mut self) {
        if let Some(mut process) = self.process.take() {
            if !process.has_exited() {
                debug!(pid = process.id(), "Released handle of a process that is still running");
            }
        }
    }

    const fn ensure_not_disposed(&self) -> Result<(), ServerManagerError> {
        if self.disposed {
            Err(ServerManagerError::Disposed)
        } else {
            Ok(())
        }
    }
}
