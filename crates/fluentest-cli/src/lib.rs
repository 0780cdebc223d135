//! Command-line adapter for fluentest.
//!
//! Drives the runtime from a JSON hosting file: start or reuse a server,
//! stop it, inspect the registry and run one-off readiness checks.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only.
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use parser::Cli;
