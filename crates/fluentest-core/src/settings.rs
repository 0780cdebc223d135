//! Default timings and orchestration options.
//!
//! These are pure constants and value types with no infrastructure dependencies.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default overall budget for a server to become ready.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Aspire app hosts orchestrate several resources before the app answers.
pub const DEFAULT_ASPIRE_STARTUP_TIMEOUT: Duration = Duration::from_secs(180);

/// Default pause between full sweeps of the readiness endpoints.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default wait before the first readiness sweep.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::ZERO;

/// Default timeout for a single readiness request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Options controlling how a [`ServerManager`](crate::ServerManager) launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    /// Sweep registry entries whose process died before launching a new server.
    pub kill_orphans: bool,
}

impl ManagerOptions {
    /// Options with orphan cleanup disabled.
    #[must_use]
    pub const fn without_orphan_sweep() -> Self {
        Self {
            kill_orphans: false,
        }
    }
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self { kill_orphans: true }
    }
}
