//! Paths command handler.
//!
//! Displays where the registry lives, for debugging reuse across runs.

use anyhow::Result;
use fluentest_core::STATE_DIR_ENV;

use crate::CliContext;

/// Print the resolved registry directory in `key = value` format.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let dir = ctx.hosting.registry.dir();
    println!("registry_dir = {}", dir.display());
    println!("registry_exists = {}", dir.is_dir());
    match std::env::var(STATE_DIR_ENV) {
        Ok(value) => println!("{STATE_DIR_ENV} = {value}"),
        Err(_) => println!("{STATE_DIR_ENV} = (unset)"),
    }
    Ok(())
}
