//! Command handlers.
//!
//! Each handler is a thin wrapper: load input, call the runtime through the
//! [`CliContext`](crate::CliContext), format the result for the terminal.
//! Human-facing results go to stdout; logs go to stderr.

pub mod down;
pub mod hash;
pub mod paths;
pub mod probe;
pub mod run;
pub mod status;
pub mod sweep;
pub mod up;
