//! File-backed process registry.
//!
//! # Guarantees
//! - Atomic writes via temp file + rename
//! - Corrupt or unreadable entries read as absent
//! - Entries whose process has died are dropped on lookup and by the orphan sweep

mod file_registry;
mod io;
mod sweep;

pub use file_registry::FileProcessRegistry;
pub use io::{ENTRY_EXTENSION, entry_path};
