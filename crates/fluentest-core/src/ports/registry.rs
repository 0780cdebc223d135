//! Process registry port.
//!
//! The registry is the cross-process hand-off between test runs: one entry per
//! configuration hash. It is mutated only through these operations.

use async_trait::async_trait;
use url::Url;

use super::RegistryError;
use crate::domain::{ConfigHash, ServerStatus};

/// Persisted record of servers started by previous runs.
#[async_trait]
pub trait ProcessRegistry: Send + Sync {
    /// Entry for `hash`, or `None` when absent, unreadable or stale.
    ///
    /// Never fails: a corrupt entry is treated as absent.
    async fn try_load(&self, hash: &ConfigHash) -> Option<ServerStatus>;

    /// Entry (of any hash) that owns `base_url`, used for drift detection.
    async fn find_by_base_url(&self, base_url: &Url) -> Option<ServerStatus>;

    /// Record a healthy server for `hash` and return the stored status.
    async fn update_with_ready(
        &self,
        hash: &ConfigHash,
        pid: u32,
        base_url: &Url,
    ) -> Result<ServerStatus, RegistryError>;

    /// Terminate a process by id.
    ///
    /// Returns `false` (and logs) when the process does not exist or could not
    /// be killed; never fails for "already gone".
    async fn try_kill(&self, pid: u32) -> bool;

    /// Remove every entry whose process is no longer alive.
    ///
    /// Returns the number of entries removed.
    async fn kill_orphans(&self) -> usize;

    /// Remove the entry for `hash`. Succeeds when absent.
    async fn delete(&self, hash: &ConfigHash) -> Result<(), RegistryError>;

    /// All readable entries.
    async fn list(&self) -> Result<Vec<ServerStatus>, RegistryError>;
}
