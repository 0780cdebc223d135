//! Composition root for the runtime adapters.
//!
//! This is the one place where the file registry, process launcher and HTTP
//! probe are wired into a [`ServerManager`] and hosting strategies.

use std::path::PathBuf;
use std::sync::Arc;

use fluentest_core::paths::servers_dir;
use fluentest_core::{LaunchPlan, ManagerOptions, ProbeError, ServerManager};

use crate::hosting::{ExternalHosting, HostingConfig, HostingError, HostingStrategy, ManagedHosting};
use crate::probe::HttpReadinessProbe;
use crate::process::TokioProcessLauncher;
use crate::registry::FileProcessRegistry;

/// Bootstrap configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Directory holding registry entries.
    pub registry_dir: PathBuf,
    pub options: ManagerOptions,
}

impl RuntimeConfig {
    /// Registry in the per-user state directory, orphan sweep enabled.
    pub fn with_defaults() -> Self {
        Self {
            registry_dir: servers_dir(),
            options: ManagerOptions::default(),
        }
    }
}

/// Fully composed adapters.
#[derive(Debug, Clone)]
pub struct HostingContext {
    pub registry: Arc<FileProcessRegistry>,
    pub launcher: Arc<TokioProcessLauncher>,
    pub probe: Arc<HttpReadinessProbe>,
    pub options: ManagerOptions,
}

impl HostingContext {
    /// A fresh manager over the shared adapters.
    pub fn manager(&self) -> ServerManager {
        ServerManager::with_options(
            self.registry.clone(),
            self.launcher.clone(),
            self.probe.clone(),
            self.options,
        )
    }

    /// Managed hosting for an arbitrary plan.
    pub fn managed(&self, plan: LaunchPlan) -> Result<ManagedHosting, HostingError> {
        ManagedHosting::new(plan, self.manager())
    }

    /// Strategy for a hosting file.
    pub fn strategy(&self, config: &HostingConfig) -> Result<Box<dyn HostingStrategy>, HostingError> {
        let strategy: Box<dyn HostingStrategy> = match config {
            HostingConfig::External(options) => {
                Box::new(ExternalHosting::new(options, self.probe.clone())?)
            }
            managed => Box::new(self.managed(managed.launch_plan())?),
        };
        Ok(strategy)
    }
}

/// Wire the default adapters together.
pub fn bootstrap(config: RuntimeConfig) -> Result<HostingContext, ProbeError> {
    Ok(HostingContext {
        registry: Arc::new(FileProcessRegistry::new(config.registry_dir)),
        launcher: Arc::new(TokioProcessLauncher::new()),
        probe: Arc::new(HttpReadinessProbe::new()?),
        options: config.options,
    })
}
