//! Readiness probe port.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::ProbeError;
use crate::domain::LaunchPlan;

/// Waits until a server described by a plan accepts requests.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Poll the plan's readiness targets until one answers with a 2xx status.
    ///
    /// Returns the URL that answered. Fails with [`ProbeError::Timeout`] once
    /// the plan's startup timeout elapses, or [`ProbeError::Cancelled`] as soon
    /// as `cancel` fires.
    async fn wait_until_ready(
        &self,
        plan: &LaunchPlan,
        cancel: &CancellationToken,
    ) -> Result<Url, ProbeError>;
}
