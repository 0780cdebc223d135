//! Readiness probe that polls HTTP endpoints with `reqwest`.
//!
//! A sweep issues one GET per candidate URL (base URL first, then each
//! health endpoint). Any 2xx answer ends the wait; everything else is logged
//! and retried after the plan's poll interval until the startup timeout runs
//! out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fluentest_core::{Clock, DEFAULT_REQUEST_TIMEOUT, LaunchPlan, ProbeError, ReadinessProbe};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::clock::TokioClock;

/// Floor for a single request's timeout when the budget is nearly spent.
const MIN_REQUEST_TIMEOUT: Duration = Duration::from_millis(10);

/// Polls a plan's readiness targets until one answers with a 2xx status.
#[derive(Clone)]
pub struct HttpReadinessProbe {
    client: Client,
    clock: Arc<dyn Clock>,
    request_timeout: Duration,
}

impl HttpReadinessProbe {
    /// Probe using real time.
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_clock(Arc::new(TokioClock))
    }

    /// Probe whose delays and deadline are measured by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self {
            client,
            clock,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the per-request timeout (default 5 s).
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn elapsed(&self, start: Instant) -> Duration {
        self.clock.now().saturating_duration_since(start)
    }

    /// One GET; `Ok` on any 2xx status.
    async fn check(&self, url: &Url, timeout: Duration) -> Result<(), String> {
        match self.client.get(url.clone()).timeout(timeout).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(format!("HTTP {}", response.status())),
            Err(e) if e.is_timeout() => Err(format!("no response within {timeout:?}")),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Sleep unless cancelled first.
    async fn pause(
        &self,
        duration: Duration,
        start: Instant,
        cancel: &CancellationToken,
    ) -> Result<(), ProbeError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ProbeError::Cancelled { elapsed: self.elapsed(start) }),
            () = self.clock.sleep(duration) => Ok(()),
        }
    }
}

impl std::fmt::Debug for HttpReadinessProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReadinessProbe")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReadinessProbe for HttpReadinessProbe {
    async fn wait_until_ready(
        &self,
        plan: &LaunchPlan,
        cancel: &CancellationToken,
    ) -> Result<Url, ProbeError> {
        plan.validate_for_probe()?;
        let targets = plan.probe_targets()?;
        let budget = plan.startup_timeout;
        let start = self.clock.now();

        info!(
            url = %plan.require_base_url()?,
            targets = targets.len(),
            timeout = ?budget,
            "Waiting for server readiness"
        );

        if !plan.initial_delay.is_zero() {
            self.pause(plan.initial_delay, start, cancel).await?;
        }

        let mut attempts: u32 = 0;
        let mut last_error = String::from("no request completed");

        loop {
            attempts += 1;

            for url in &targets {
                let remaining = budget.saturating_sub(self.elapsed(start));
                let timeout = self.request_timeout.min(remaining).max(MIN_REQUEST_TIMEOUT);

                let outcome = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        return Err(ProbeError::Cancelled { elapsed: self.elapsed(start) });
                    }
                    outcome = self.check(url, timeout) => outcome,
                };

                match outcome {
                    Ok(()) => {
                        info!(url = %url, attempts, elapsed = ?self.elapsed(start), "Server is ready");
                        return Ok(url.clone());
                    }
                    Err(e) => {
                        debug!(url = %url, attempt = attempts, error = %e, "Readiness check failed");
                        last_error = format!("{url}: {e}");
                    }
                }
            }

            let elapsed = self.elapsed(start);
            if elapsed >= budget {
                warn!(elapsed = ?elapsed, attempts, last_error = %last_error, "Server did not become ready");
                return Err(ProbeError::Timeout {
                    elapsed,
                    attempts,
                    last_error,
                });
            }

            self.pause(plan.poll_interval.min(budget - elapsed), start, cancel)
                .await?;
        }
    }
}
