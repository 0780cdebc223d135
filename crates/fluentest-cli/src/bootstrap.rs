//! CLI bootstrap - the composition root.
//!
//! Turns global CLI options into a [`RuntimeConfig`] and wires the runtime
//! adapters. Handlers receive the resulting [`CliContext`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use fluentest_core::{ManagerOptions, servers_dir};
use fluentest_runtime::{HostingContext, RuntimeConfig};

use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// State root override; the registry lives in its `servers/` directory.
    pub state_dir: Option<PathBuf>,
    pub skip_orphan_sweep: bool,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            state_dir: cli.state_dir.clone(),
            skip_orphan_sweep: cli.no_orphan_sweep,
        }
    }

    /// Directory holding registry entries.
    pub fn registry_dir(&self) -> PathBuf {
        self.state_dir
            .as_ref()
            .map_or_else(servers_dir, |root| root.join("servers"))
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let options = if self.skip_orphan_sweep {
            ManagerOptions::without_orphan_sweep()
        } else {
            ManagerOptions::default()
        };
        RuntimeConfig {
            registry_dir: self.registry_dir(),
            options,
        }
    }
}

/// Composed adapters for command handlers.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub hosting: HostingContext,
}

/// Wire the runtime for this invocation.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext> {
    let hosting = fluentest_runtime::bootstrap(config.runtime_config())
        .context("Failed to initialize the HTTP client")?;
    Ok(CliContext { hosting })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_dir_override_moves_the_registry() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CliConfig {
            state_dir: Some(dir.path().to_path_buf()),
            skip_orphan_sweep: true,
        };

        let ctx = bootstrap(&config).unwrap();

        assert_eq!(ctx.hosting.registry.dir(), dir.path().join("servers"));
        assert!(!ctx.hosting.options.kill_orphans);
    }

    #[test]
    fn orphan_sweep_stays_on_by_default() {
        let config = CliConfig {
            state_dir: Some(PathBuf::from("/tmp/fluentest-cli-test")),
            ..CliConfig::default()
        };
        assert!(config.runtime_config().options.kill_orphans);
    }
}
