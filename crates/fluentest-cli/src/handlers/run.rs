//! Run command handler.
//!
//! Foreground mode: the server's output is forwarded to the log and the
//! server is stopped when the invocation is interrupted.

use std::path::Path;

use anyhow::Result;
use fluentest_runtime::HostingConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::up::describe;
use crate::CliContext;

/// Execute the run command.
///
/// `cancel` fires on Ctrl-C. Before the server is ready it aborts startup
/// (the half-started process is killed); afterwards it stops the server.
pub async fn execute(ctx: &CliContext, file: &Path, cancel: &CancellationToken) -> Result<()> {
    let mut config = HostingConfig::load(file)?;
    config.set_streamed_output(true);

    let strategy = ctx.hosting.strategy(&config)?;
    let result = strategy.start(cancel).await?;
    println!("{}", describe(&result, strategy.configuration_hash().short()));

    info!("Press Ctrl-C to stop the server");
    cancel.cancelled().await;

    info!(url = %result.base_url, "Stopping server");
    strategy.stop().await?;
    Ok(())
}
