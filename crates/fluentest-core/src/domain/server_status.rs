//! Snapshot of a known server, as persisted in the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigHash;

/// Immutable snapshot of a server the framework knows about.
///
/// "No server known" is expressed as `Option::<ServerStatus>::None` by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// OS process id (`None` for servers this framework did not start).
    pub pid: Option<u32>,
    /// When the server was recorded as started.
    pub started_at: DateTime<Utc>,
    /// URL the server answers on.
    pub base_url: Url,
    /// Fingerprint of the plan that started the server.
    pub config_hash: ConfigHash,
    /// Whether the server passed its readiness probe.
    pub is_healthy: bool,
}

impl ServerStatus {
    /// A freshly probed server started by this framework.
    pub fn ready(pid: u32, base_url: Url, config_hash: ConfigHash) -> Self {
        Self {
            pid: Some(pid),
            started_at: Utc::now(),
            base_url,
            config_hash,
            is_healthy: true,
        }
    }

    /// A healthy server whose lifecycle belongs to someone else.
    pub fn external(base_url: Url, config_hash: ConfigHash) -> Self {
        Self {
            pid: None,
            started_at: Utc::now(),
            base_url,
            config_hash,
            is_healthy: true,
        }
    }

    /// Copy with a different health flag.
    #[must_use]
    pub fn with_health(mut self, healthy: bool) -> Self {
        self.is_healthy = healthy;
        self
    }

    /// Healthy and started from the same configuration.
    pub fn is_reusable_for(&self, hash: &ConfigHash) -> bool {
        self.is_healthy && self.config_hash == *hash
    }

    /// Time since the server was recorded as started.
    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}
