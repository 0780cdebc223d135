//! Platform-specific state root resolution.

use std::env;
use std::path::PathBuf;

/// Environment variable that overrides the state root.
pub const STATE_DIR_ENV: &str = "FLUENTEST_STATE_DIR";

const APP_DIR: &str = "fluentest";

/// Get the root directory for fluentest's per-user state.
///
/// Resolution order:
/// 1. `FLUENTEST_STATE_DIR` environment variable (used as-is)
/// 2. Runtime directory (`$XDG_RUNTIME_DIR` on Linux) + `fluentest`
/// 3. Local data directory (`%LOCALAPPDATA%` on Windows, `~/Library/Application Support` on macOS) + `fluentest`
/// 4. System temp directory + `fluentest`
pub fn state_root() -> PathBuf {
    resolve_state_root(
        env::var(STATE_DIR_ENV).ok(),
        dirs::runtime_dir(),
        dirs::data_local_dir(),
        env::temp_dir(),
    )
}

fn resolve_state_root(
    override_dir: Option<String>,
    runtime_dir: Option<PathBuf>,
    data_local_dir: Option<PathBuf>,
    temp_dir: PathBuf,
) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }

    runtime_dir
        .or(data_local_dir)
        .unwrap_or(temp_dir)
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_and_is_used_verbatim() {
        let root = resolve_state_root(
            Some("/custom/state".into()),
            Some(PathBuf::from("/run/user/1000")),
            None,
            PathBuf::from("/tmp"),
        );
        assert_eq!(root, PathBuf::from("/custom/state"));
    }

    #[test]
    fn blank_override_is_ignored() {
        let root = resolve_state_root(
            Some("  ".into()),
            Some(PathBuf::from("/run/user/1000")),
            None,
            PathBuf::from("/tmp"),
        );
        assert_eq!(root, PathBuf::from("/run/user/1000/fluentest"));
    }

    #[test]
    fn falls_back_to_data_dir_then_temp() {
        let data = resolve_state_root(
            None,
            None,
            Some(PathBuf::from("/home/u/.local/share")),
            PathBuf::from("/tmp"),
        );
        assert_eq!(data, PathBuf::from("/home/u/.local/share/fluentest"));

        let temp = resolve_state_root(None, None, None, PathBuf::from("/tmp"));
        assert_eq!(temp, PathBuf::from("/tmp/fluentest"));
    }
}
