//! Server registry directory resolution.

use std::fs;
use std::path::{Path, PathBuf};

use super::PathError;
use super::platform::state_root;

/// Returns the directory where server registry entries are stored.
///
/// Location: `<state root>/servers/`
pub fn servers_dir() -> PathBuf {
    state_root().join("servers")
}

/// Create `dir` if needed and confirm it is a directory.
pub fn ensure_servers_dir(dir: &Path) -> Result<PathBuf, PathError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(PathError::NotADirectory(dir.to_path_buf()));
        }
        return Ok(dir.to_path_buf());
    }

    fs::create_dir_all(dir).map_err(|e| PathError::CreateFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servers_dir_is_under_state_root() {
        let servers = servers_dir();
        assert!(servers.starts_with(state_root()));
        assert!(servers.ends_with("servers"));
    }

    #[test]
    fn ensure_rejects_regular_files() {
        let file = std::env::temp_dir().join(format!("fluentest-not-a-dir-{}", std::process::id()));
        fs::write(&file, b"x").unwrap();

        let result = ensure_servers_dir(&file);
        assert!(matches!(result, Err(PathError::NotADirectory(_))));

        fs::remove_file(&file).ok();
    }
}
