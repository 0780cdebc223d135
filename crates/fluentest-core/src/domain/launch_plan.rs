//! Launch plan: the immutable description of one launch attempt.
//!
//! A plan says how to start the server process and how to decide that it is
//! ready. It is an intent-based configuration; adapters decide how to execute it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::ConfigHash;
use super::duration_ms;
use crate::settings::{DEFAULT_INITIAL_DELAY, DEFAULT_POLL_INTERVAL, DEFAULT_STARTUP_TIMEOUT};

/// Validation failures for a [`LaunchPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// No executable was configured.
    #[error("launch plan has no executable")]
    EmptyExecutable,

    /// The plan has no base URL, so readiness cannot be probed.
    #[error("launch plan has no base URL")]
    MissingBaseUrl,

    /// The base URL is not http or https.
    #[error("base URL {url} must use http or https")]
    UnsupportedScheme { url: String },

    /// A health endpoint is neither `/`-relative nor an absolute http(s) URL.
    #[error("invalid health check endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A zero startup timeout would fail every launch.
    #[error("startup timeout must be greater than zero")]
    ZeroStartupTimeout,

    /// A zero poll interval would spin the readiness loop.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}

const fn default_startup_timeout() -> Duration {
    DEFAULT_STARTUP_TIMEOUT
}

const fn default_initial_delay() -> Duration {
    DEFAULT_INITIAL_DELAY
}

const fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

/// How to start a server process and verify its readiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
    /// Executable path or command name resolved through `PATH`.
    pub executable: String,
    /// Arguments passed to the executable, in order.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Working directory for the process (inherits the caller's when `None`).
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    /// Environment overrides applied on top of the inherited environment.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// URL the server answers on once ready.
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Extra readiness endpoints: `/`-relative to the base URL, or absolute.
    #[serde(default)]
    pub health_check_endpoints: Vec<String>,
    /// Overall budget for the server to become ready.
    #[serde(with = "duration_ms", default = "default_startup_timeout")]
    pub startup_timeout: Duration,
    /// Wait before the first readiness sweep.
    #[serde(with = "duration_ms", default = "default_initial_delay")]
    pub initial_delay: Duration,
    /// Pause between full sweeps of the readiness endpoints.
    #[serde(with = "duration_ms", default = "default_poll_interval")]
    pub poll_interval: Duration,
    /// Forward the process's stdout/stderr into the log.
    #[serde(default)]
    pub stream_process_output: bool,
}

impl LaunchPlan {
    /// Create a plan for an executable with default timings.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
            working_directory: None,
            environment: BTreeMap::new(),
            base_url: None,
            health_check_endpoints: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            initial_delay: DEFAULT_INITIAL_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            stream_process_output: false,
        }
    }

    /// Create a probe-only plan for a server this framework does not start.
    pub fn external(base_url: Url) -> Self {
        Self::new("").with_base_url(base_url)
    }

    /// Append a single argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Set one environment variable, replacing any earlier value.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Set several environment variables; later values win.
    #[must_use]
    pub fn with_envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Add a readiness endpoint.
    #[must_use]
    pub fn with_health_check_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.health_check_endpoints.push(endpoint.into());
        self
    }

    /// Add several readiness endpoints.
    #[must_use]
    pub fn with_health_check_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.health_check_endpoints
            .extend(endpoints.into_iter().map(Into::into));
        self
    }

    /// Set the overall readiness budget.
    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Set the wait before the first readiness sweep.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the pause between readiness sweeps.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enable or disable forwarding of process output.
    #[must_use]
    pub const fn with_streamed_output(mut self, stream: bool) -> Self {
        self.stream_process_output = stream;
        self
    }

    /// Fingerprint of this plan.
    pub fn config_hash(&self) -> ConfigHash {
        ConfigHash::compute(self)
    }

    /// The base URL, or [`PlanError::MissingBaseUrl`].
    pub fn require_base_url(&self) -> Result<&Url, PlanError> {
        let url = self.base_url.as_ref().ok_or(PlanError::MissingBaseUrl)?;
        if matches!(url.scheme(), "http" | "https") {
            Ok(url)
        } else {
            Err(PlanError::UnsupportedScheme {
                url: url.to_string(),
            })
        }
    }

    /// Human-readable command line, used in launch diagnostics.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{part}\"")
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check everything a readiness probe needs.
    pub fn validate_for_probe(&self) -> Result<(), PlanError> {
        self.probe_targets()?;
        if self.poll_interval.is_zero() {
            return Err(PlanError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Check everything a launch followed by a readiness probe needs.
    pub fn validate_for_launch(&self) -> Result<(), PlanError> {
        if self.executable.trim().is_empty() {
            return Err(PlanError::EmptyExecutable);
        }
        if self.startup_timeout.is_zero() {
            return Err(PlanError::ZeroStartupTimeout);
        }
        self.validate_for_probe()
    }

    /// Candidate readiness URLs: the base URL first, then each endpoint in
    /// declared order, without duplicates.
    ///
    /// Endpoints starting with `/` resolve against the base URL; anything else
    /// must be an absolute http(s) URL and overrides the base entirely.
    pub fn probe_targets(&self) -> Result<Vec<Url>, PlanError> {
        let base = self.require_base_url()?;
        let mut targets = vec![base.clone()];

        for endpoint in &self.health_check_endpoints {
            let url = resolve_endpoint(base, endpoint)?;
            if !targets.contains(&url) {
                targets.push(url);
            }
        }

        Ok(targets)
    }
}

fn resolve_endpoint(base: &Url, endpoint: &str) -> Result<Url, PlanError> {
    let trimmed = endpoint.trim();
    let invalid = |reason: String| PlanError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("endpoint is empty".to_string()));
    }

    if trimmed.starts_with('/') {
        return base.join(trimmed).map_err(|e| invalid(e.to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(invalid(format!("unsupported scheme '{}'", url.scheme())))
    }
}
