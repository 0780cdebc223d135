//! Status command handler.
//!
//! Lists every registry entry with its liveness. A PID reused by another
//! process counts as dead. Entries are shown as stored; use `sweep` to drop
//! the dead ones.

use anyhow::Result;
use fluentest_core::{ProcessRegistry, ServerStatus};
use fluentest_runtime::process::is_recorded_process;

use crate::CliContext;

/// Execute the status command.
pub async fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    let entries = ctx.hosting.registry.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No servers recorded in {}", ctx.hosting.registry.dir().display());
        return Ok(());
    }

    println!("{:<12}  {:>8}  {:<5}  {:>10}  URL", "CONFIG", "PID", "ALIVE", "UPTIME");
    for entry in &entries {
        let alive = entry
            .pid
            .is_some_and(|pid| is_recorded_process(pid, entry.started_at.timestamp()));
        println!("{}", render_row(entry, alive));
    }
    Ok(())
}

fn render_row(entry: &ServerStatus, alive: bool) -> String {
    let pid = entry
        .pid
        .map_or_else(|| "-".to_string(), |pid| pid.to_string());
    let alive = if alive { "yes" } else { "no" };
    format!(
        "{:<12}  {:>8}  {:<5}  {:>10}  {}",
        entry.config_hash.short(),
        pid,
        alive,
        format_uptime(entry.uptime().num_seconds()),
        entry.base_url
    )
}

/// Compact `1h02m03s` style duration.
fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    let (minutes, secs) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{hours}h{minutes:02}m{secs:02}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs:02}s")
    } else {
        format!("{secs}s")
    }
}
