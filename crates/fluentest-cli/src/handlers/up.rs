//! Up command handler.
//!
//! Starts (or adopts) the server for a hosting file and returns, leaving the
//! server running so later test runs reuse it.

use std::path::Path;

use anyhow::Result;
use fluentest_runtime::{HostingConfig, HostingResult};
use tokio_util::sync::CancellationToken;

use crate::CliContext;

/// Execute the up command.
///
/// Output streaming is forced off: nobody would be reading the pipes once
/// this process exits.
pub async fn execute(ctx: &CliContext, file: &Path, cancel: &CancellationToken) -> Result<()> {
    let mut config = HostingConfig::load(file)?;
    config.set_streamed_output(false);

    let strategy = ctx.hosting.strategy(&config)?;
    let started = strategy.start(cancel).await;
    strategy.dispose().await;

    let result = started?;
    println!("{}", describe(&result, strategy.configuration_hash().short()));
    Ok(())
}

pub(crate) fn describe(result: &HostingResult, hash: &str) -> String {
    let how = if result.was_reused { "reused" } else { "started" };
    format!("{} ({how}, config {hash})", result.base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn describe_says_whether_server_was_reused() {
        let result = HostingResult {
            base_url: Url::parse("http://127.0.0.1:5080").unwrap(),
            was_reused: true,
        };
        assert_eq!(
            describe(&result, "a1b2c3d4e5f6"),
            "http://127.0.0.1:5080/ (reused, config a1b2c3d4e5f6)"
        );

        let fresh = HostingResult {
            was_reused: false,
            ..result
        };
        assert!(describe(&fresh, "a1b2c3d4e5f6").contains("started"));
    }
}
