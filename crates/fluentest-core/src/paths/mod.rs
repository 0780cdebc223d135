//! Path utilities for fluentest's per-user state.
//!
//! The registry of launched servers lives under a platform-specific runtime
//! directory so that separate test-run processes find the same entries.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - OS-specific resolution is kept private in `platform`

mod error;
mod platform;
mod servers;

pub use error::PathError;
pub use platform::{STATE_DIR_ENV, state_root};
pub use servers::{ensure_servers_dir, servers_dir};
