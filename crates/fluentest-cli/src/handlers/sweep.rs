//! Sweep command handler.

use anyhow::Result;
use fluentest_core::ProcessRegistry;

use crate::CliContext;

/// Remove registry entries whose process died, plus unreadable files.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let removed = ctx.hosting.registry.kill_orphans().await;
    let noun = if removed == 1 { "entry" } else { "entries" };
    println!("Removed {removed} orphaned {noun}");
    Ok(())
}
