//! Root CLI parser and global options.

use std::path::PathBuf;

use clap::Parser;
use fluentest_core::STATE_DIR_ENV;

use crate::commands::Commands;

/// Start, reuse and stop the servers your UI tests run against.
#[derive(Debug, Parser)]
#[command(name = "fluentest")]
#[command(about = "Manage the lifecycle of servers under test")]
#[command(version)]
pub struct Cli {
    /// Override the state directory holding the server registry
    #[arg(long = "state-dir", env = STATE_DIR_ENV, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Do not sweep dead registry entries before launching
    #[arg(long = "no-orphan-sweep", global = true)]
    pub no_orphan_sweep: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
