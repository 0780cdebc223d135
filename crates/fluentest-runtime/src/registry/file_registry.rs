//! [`ProcessRegistry`] backed by one JSON file per configuration hash.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fluentest_core::paths::servers_dir;
use fluentest_core::{ConfigHash, ProcessRegistry, RegistryError, ServerStatus};
use tracing::{debug, warn};
use url::Url;

use super::io::{
    EntryRead, entry_path, list_entries, list_entry_files, read_entry, remove_entry_file,
    write_entry,
};
use super::sweep::sweep_orphans;
use crate::process::{is_alive, is_recorded_process, kill_process_tree};

/// Registry stored under a servers directory, shared by every test run on
/// the machine. Last writer wins.
#[derive(Debug, Clone)]
pub struct FileProcessRegistry {
    dir: PathBuf,
}

impl FileProcessRegistry {
    /// Registry rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Registry in the per-user state directory.
    pub fn default_location() -> Self {
        Self::new(servers_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read an entry, dropping it if its process has died or its PID was reused.
    fn load_live(&self, path: &Path) -> Option<ServerStatus> {
        match read_entry(path) {
            EntryRead::Missing => None,
            EntryRead::Corrupt(reason) => {
                debug!(path = %path.display(), %reason, "Ignoring unreadable registry entry");
                None
            }
            EntryRead::Found(status) => match status.pid {
                Some(_) if !owns_pid(&status) => {
                    debug!(
                        pid = ?status.pid,
                        hash = %status.config_hash.short(),
                        "Registry entry points at a dead or different process, removing"
                    );
                    if let Err(e) = remove_entry_file(path) {
                        warn!(path = %path.display(), error = %e, "Failed to remove stale registry entry");
                    }
                    None
                }
                _ => Some(status),
            },
        }
    }

    /// Entry recorded for `pid`, if any.
    fn entry_for_pid(&self, pid: u32) -> Option<ServerStatus> {
        list_entries(&self.dir)
            .ok()?
            .into_iter()
            .find(|status| status.pid == Some(pid))
    }
}

/// Whether the entry's PID still names the process that was recorded.
fn owns_pid(status: &ServerStatus) -> bool {
    status
        .pid
        .is_none_or(|pid| is_recorded_process(pid, status.started_at.timestamp()))
}

impl Default for FileProcessRegistry {
    fn default() -> Self {
        Self::default_location()
    }
}

#[async_trait]
impl ProcessRegistry for FileProcessRegistry {
    async fn try_load(&self, hash: &ConfigHash) -> Option<ServerStatus> {
        self.load_live(&entry_path(&self.dir, hash))
    }

    async fn find_by_base_url(&self, base_url: &Url) -> Option<ServerStatus> {
        let paths = match list_entry_files(&self.dir) {
            Ok(paths) => paths,
            Err(e) => {
                debug!(error = %e, "Could not list registry entries");
                return None;
            }
        };

        paths
            .iter()
            .filter_map(|path| self.load_live(path))
            .find(|status| &status.base_url == base_url)
    }

    async fn update_with_ready(
        &self,
        hash: &ConfigHash,
        pid: u32,
        base_url: &Url,
    ) -> Result<ServerStatus, RegistryError> {
        let status = ServerStatus::ready(pid, base_url.clone(), hash.clone());
        let path = write_entry(&self.dir, &status)?;
        debug!(pid, path = %path.display(), "Recorded ready server");
        Ok(status)
    }

    async fn try_kill(&self, pid: u32) -> bool {
        if !is_alive(pid) {
            debug!(pid, "Process already gone, nothing to kill");
            return false;
        }

        if let Some(entry) = self.entry_for_pid(pid) {
            if !owns_pid(&entry) {
                warn!(
                    pid,
                    hash = %entry.config_hash.short(),
                    "PID now belongs to a different process, not killing it"
                );
                return false;
            }
        }

        match kill_process_tree(pid).await {
            Ok(()) => {
                debug!(pid, "Killed server process");
                true
            }
            Err(e) => {
                warn!(pid, error = %e, "Failed to kill server process");
                false
            }
        }
    }

    async fn kill_orphans(&self) -> usize {
        match sweep_orphans(&self.dir, owns_pid) {
            Ok(report) => report.removed(),
            Err(e) => {
                warn!(error = %e, "Orphan sweep failed");
                0
            }
        }
    }

    async fn delete(&self, hash: &ConfigHash) -> Result<(), RegistryError> {
        remove_entry_file(&entry_path(&self.dir, hash))
    }

    async fn list(&self) -> Result<Vec<ServerStatus>, RegistryError> {
        list_entries(&self.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DEAD_PID: u32 = 999_999;

    fn url(port: u16) -> Url {
        Url::parse(&format!("http://127.0.0.1:{port}")).unwrap()
    }

    fn registry() -> (TempDir, FileProcessRegistry) {
        let dir = TempDir::new().unwrap();
        let registry = FileProcessRegistry::new(dir.path().join("servers"));
        (dir, registry)
    }

    #[tokio::test]
    async fn update_then_load_roundtrip() {
        let (_dir, registry) = registry();
        let hash = ConfigHash::from_hex("abc123");
        let pid = std::process::id();

        let written = registry
            .update_with_ready(&hash, pid, &url(5080))
            .await
            .unwrap();
        let loaded = registry.try_load(&hash).await.expect("entry missing");

        assert_eq!(loaded, written);
        assert!(loaded.is_healthy);
        assert_eq!(loaded.pid, Some(pid));
    }

    #[tokio::test]
    async fn missing_and_corrupt_entries_load_as_none() {
        let (_dir, registry) = registry();
        fs::create_dir_all(registry.dir()).unwrap();
        fs::write(registry.dir().join("bad000.json"), "][").unwrap();

        assert!(registry.try_load(&ConfigHash::from_hex("abc123")).await.is_none());
        assert!(registry.try_load(&ConfigHash::from_hex("bad000")).await.is_none());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn dead_process_entry_is_dropped_on_load() {
        let (_dir, registry) = registry();
        let hash = ConfigHash::from_hex("abc123");
        registry
            .update_with_ready(&hash, DEAD_PID, &url(5080))
            .await
            .unwrap();

        assert!(registry.try_load(&hash).await.is_none());
        assert!(!entry_path(registry.dir(), &hash).exists());
    }

    /// Entry for a live `pid` written long before that process started.
    fn backdated_entry(registry: &FileProcessRegistry, hash: &ConfigHash, pid: u32) {
        let mut status = ServerStatus::ready(pid, url(5080), hash.clone());
        status.started_at = status.started_at - chrono::Duration::days(1);
        write_entry(registry.dir(), &status).unwrap();
    }

    #[tokio::test]
    async fn reused_pid_entry_is_dropped_on_load() {
        let (_dir, registry) = registry();
        let hash = ConfigHash::from_hex("abc123");
        backdated_entry(&registry, &hash, std::process::id());

        assert!(registry.try_load(&hash).await.is_none());
        assert!(registry.find_by_base_url(&url(5080)).await.is_none());
        assert!(!entry_path(registry.dir(), &hash).exists());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn try_kill_spares_process_that_reused_a_recorded_pid() {
        let (_dir, registry) = registry();
        let mut child = tokio::process::Command::new("sleep")
            .arg("60")
            .process_group(0)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();
        backdated_entry(&registry, &ConfigHash::from_hex("0dd0dd"), pid);

        assert!(!registry.try_kill(pid).await);
        assert!(is_alive(pid));

        child.kill().await.unwrap();
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_orphans_removes_reused_pid_entries() {
        let (_dir, registry) = registry();
        backdated_entry(&registry, &ConfigHash::from_hex("0dd0dd"), std::process::id());

        assert_eq!(registry.kill_orphans().await, 1);
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_base_url_matches_any_hash() {
        let (_dir, registry) = registry();
        let pid = std::process::id();
        let old = ConfigHash::from_hex("01d01d");
        registry.update_with_ready(&old, pid, &url(5080)).await.unwrap();
        registry
            .update_with_ready(&ConfigHash::from_hex("07e455"), pid, &url(6000))
            .await
            .unwrap();

        let found = registry
            .find_by_base_url(&Url::parse("http://127.0.0.1:5080/").unwrap())
            .await
            .expect("no entry for url");

        assert_eq!(found.config_hash, old);
        assert!(registry.find_by_base_url(&url(7000)).await.is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, registry) = registry();
        let hash = ConfigHash::from_hex("abc123");
        registry
            .update_with_ready(&hash, std::process::id(), &url(5080))
            .await
            .unwrap();

        registry.delete(&hash).await.unwrap();
        registry.delete(&hash).await.unwrap();

        assert!(registry.try_load(&hash).await.is_none());
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_orphans_counts_removed_entries() {
        let (_dir, registry) = registry();
        let live = ConfigHash::from_hex("a11ce0");
        registry
            .update_with_ready(&live, std::process::id(), &url(5080))
            .await
            .unwrap();
        registry
            .update_with_ready(&ConfigHash::from_hex("dead00"), DEAD_PID, &url(5081))
            .await
            .unwrap();
        fs::write(registry.dir().join("c0ffee.json"), "nope").unwrap();

        assert_eq!(registry.kill_orphans().await, 2);
        assert_eq!(registry.kill_orphans().await, 0);

        let remaining = registry.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].config_hash, live);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn try_kill_reports_missing_process() {
        let (_dir, registry) = registry();

        assert!(!registry.try_kill(DEAD_PID).await);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn try_kill_terminates_live_process() {
        let (_dir, registry) = registry();
        let mut child = tokio::process::Command::new("sleep")
            .arg("60")
            .process_group(0)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();

        assert!(registry.try_kill(pid).await);

        let _ = child.wait().await;
        assert!(!is_alive(pid));
    }
}
