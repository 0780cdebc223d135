//! Atomic registry entry I/O.
//!
//! One JSON file per configuration hash:
//! ```text
//! <servers dir>/<hash>.json
//! ```
//! containing a serialized [`ServerStatus`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fluentest_core::paths::ensure_servers_dir;
use fluentest_core::{ConfigHash, RegistryError, ServerStatus};

/// File extension of registry entries.
pub const ENTRY_EXTENSION: &str = "json";

/// Result of reading a single entry file.
#[derive(Debug)]
pub(crate) enum EntryRead {
    Missing,
    Corrupt(String),
    Found(ServerStatus),
}

/// Path of the entry for `hash` inside `dir`.
pub fn entry_path(dir: &Path, hash: &ConfigHash) -> PathBuf {
    dir.join(format!("{hash}.{ENTRY_EXTENSION}"))
}

/// Write an entry atomically using temp file + rename.
///
/// The temp file name carries the writer's PID so two test runs writing the
/// same hash never share a temp file; the last rename wins.
pub(crate) fn write_entry(dir: &Path, status: &ServerStatus) -> Result<PathBuf, RegistryError> {
    ensure_servers_dir(dir)?;

    let final_path = entry_path(dir, &status.config_hash);
    let temp_path = final_path.with_extension(format!("{ENTRY_EXTENSION}.{}.tmp", std::process::id()));

    let content =
        serde_json::to_vec_pretty(status).map_err(|e| RegistryError::Serialization {
            path: final_path.clone(),
            reason: e.to_string(),
        })?;

    fs::write(&temp_path, content).map_err(|e| io_error(&temp_path, &e))?;

    if let Err(e) = fs::rename(&temp_path, &final_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error(&final_path, &e));
    }

    Ok(final_path)
}

/// Read one entry file. Never fails: problems are reported as [`EntryRead::Corrupt`].
pub(crate) fn read_entry(path: &Path) -> EntryRead {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return EntryRead::Missing,
        Err(e) => return EntryRead::Corrupt(e.to_string()),
    };

    match serde_json::from_slice::<ServerStatus>(&content) {
        Ok(status) => EntryRead::Found(status),
        Err(e) => EntryRead::Corrupt(e.to_string()),
    }
}

/// Remove an entry file (idempotent - no error if missing).
pub(crate) fn remove_entry_file(path: &Path) -> Result<(), RegistryError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, &e)),
    }
}

/// Paths of every `*.json` file in `dir`. A missing directory has no entries.
pub(crate) fn list_entry_files(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| io_error(dir, &e))?;
    let mut paths = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, &e))?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some(ENTRY_EXTENSION) {
            continue;
        }
        if path.is_file() {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

/// All readable entries in `dir`. Silently skips malformed files.
pub(crate) fn list_entries(dir: &Path) -> Result<Vec<ServerStatus>, RegistryError> {
    Ok(list_entry_files(dir)?
        .iter()
        .filter_map(|path| match read_entry(path) {
            EntryRead::Found(status) => Some(status),
            EntryRead::Missing | EntryRead::Corrupt(_) => None,
        })
        .collect())
}

fn io_error(path: &Path, e: &io::Error) -> RegistryError {
    RegistryError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
