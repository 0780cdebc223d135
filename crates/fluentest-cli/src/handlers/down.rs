//! Down command handler.

use std::path::Path;

use anyhow::Result;
use fluentest_core::{ConfigHash, ProcessRegistry};
use fluentest_runtime::HostingConfig;
use tracing::debug;

use crate::CliContext;

/// What `down` found for a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownOutcome {
    /// A live server was terminated.
    Stopped(u32),
    /// The entry existed but its process could not be killed or was gone.
    Forgotten,
    NotRunning,
}

/// Execute the down command.
pub async fn execute(ctx: &CliContext, file: &Path) -> Result<()> {
    let config = HostingConfig::load(file)?;
    if !config.is_managed() {
        println!("External servers are not managed by fluentest; nothing to stop");
        return Ok(());
    }

    let hash = config.config_hash();
    let message = match stop_hash(&*ctx.hosting.registry, &hash).await? {
        DownOutcome::Stopped(pid) => format!("Stopped server {} (pid {pid})", hash.short()),
        DownOutcome::Forgotten => format!("Removed stale entry {}", hash.short()),
        DownOutcome::NotRunning => format!("No server recorded for {}", hash.short()),
    };
    println!("{message}");
    Ok(())
}

/// Kill the server recorded for `hash` and delete its entry.
pub async fn stop_hash(
    registry: &dyn ProcessRegistry,
    hash: &ConfigHash,
) -> Result<DownOutcome> {
    let Some(status) = registry.try_load(hash).await else {
        debug!(hash = %hash, "No registry entry");
        return Ok(DownOutcome::NotRunning);
    };

    let killed = match status.pid {
        Some(pid) if registry.try_kill(pid).await => Some(pid),
        _ => None,
    };
    registry.delete(hash).await?;

    Ok(killed.map_or(DownOutcome::Forgotten, DownOutcome::Stopped))
}
