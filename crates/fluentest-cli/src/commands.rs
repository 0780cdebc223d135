//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;
use url::Url;

/// Available commands.
///
/// Commands taking a `<FILE>` read a JSON hosting file, for example
/// `{ "kind": "node", "working_directory": "web", "base_url": "http://localhost:5173" }`.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the server described by a hosting file (or reuse a running one) and leave it running
    Up {
        /// Hosting file
        file: PathBuf,
    },

    /// Start the server with its output streamed, stop it on Ctrl-C
    Run {
        /// Hosting file
        file: PathBuf,
    },

    /// Stop the server for a hosting file and forget it
    Down {
        /// Hosting file
        file: PathBuf,
    },

    /// List servers recorded in the registry
    Status {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove registry entries whose process is gone
    Sweep,

    /// Print the configuration hash of a hosting file
    Hash {
        /// Hosting file
        file: PathBuf,
    },

    /// Wait until a URL answers with a 2xx status
    Probe {
        /// Base URL of the server
        url: Url,
        /// Health check endpoint, relative to the base URL or absolute (repeatable)
        #[arg(short, long = "endpoint")]
        endpoints: Vec<String>,
        /// Give up after this many milliseconds
        #[arg(long = "timeout-ms", default_value_t = 60_000)]
        timeout_ms: u64,
        /// Pause between polling sweeps in milliseconds
        #[arg(long = "poll-ms", default_value_t = 500)]
        poll_ms: u64,
    },

    /// Show the resolved registry location
    Paths,
}
