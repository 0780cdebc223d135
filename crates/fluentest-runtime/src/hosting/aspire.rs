//! .NET Aspire AppHost hosting options.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use fluentest_core::domain::duration_ms;
use fluentest_core::{DEFAULT_ASPIRE_STARTUP_TIMEOUT, LaunchPlan};
use serde::{Deserialize, Serialize};
use url::Url;

use super::dotnet::{DEFAULT_CONFIGURATION, DEFAULT_ENVIRONMENT_NAME, dotnet_run_args};

/// Runs an Aspire AppHost and waits for the app it orchestrates.
///
/// The AppHost keeps its launch profile (the dashboard depends on it), so
/// `base_url` is the URL of the frontend under test rather than a listen
/// address passed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspireHostingOptions {
    /// Path to the AppHost `.csproj`.
    pub app_host_project: PathBuf,
    pub base_url: Url,
    #[serde(default = "default_configuration")]
    pub configuration: String,
    #[serde(default = "default_environment_name")]
    pub environment_name: String,
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub health_check_endpoints: Vec<String>,
    #[serde(with = "duration_ms", default = "default_startup_timeout")]
    pub startup_timeout: Duration,
    #[serde(default = "default_stream")]
    pub stream_process_output: bool,
}

fn default_configuration() -> String {
    DEFAULT_CONFIGURATION.to_string()
}

fn default_environment_name() -> String {
    DEFAULT_ENVIRONMENT_NAME.to_string()
}

const fn default_startup_timeout() -> Duration {
    DEFAULT_ASPIRE_STARTUP_TIMEOUT
}

const fn default_stream() -> bool {
    true
}

impl AspireHostingOptions {
    pub fn new(app_host_project: impl Into<PathBuf>, base_url: Url) -> Self {
        Self {
            app_host_project: app_host_project.into(),
            base_url,
            configuration: default_configuration(),
            environment_name: default_environment_name(),
            working_directory: None,
            environment: BTreeMap::new(),
            health_check_endpoints: Vec::new(),
            startup_timeout: DEFAULT_ASPIRE_STARTUP_TIMEOUT,
            stream_process_output: true,
        }
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_health_check_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.health_check_endpoints.push(endpoint.into());
        self
    }

    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn to_launch_plan(&self) -> LaunchPlan {
        let mut plan = LaunchPlan::new("dotnet")
            .with_args(dotnet_run_args(
                &self.app_host_project,
                &self.configuration,
                None,
            ))
            .with_base_url(self.base_url.clone())
            .with_env("ASPNETCORE_ENVIRONMENT", &self.environment_name)
            .with_env("DOTNET_ENVIRONMENT", &self.environment_name)
            .with_env("ASPIRE_ALLOW_UNSECURED_TRANSPORT", "true")
            .with_envs(self.environment.clone())
            .with_health_check_endpoints(self.health_check_endpoints.clone())
            .with_startup_timeout(self.startup_timeout)
            .with_streamed_output(self.stream_process_output);

        if let Some(dir) = &self.working_directory {
            plan = plan.with_working_directory(dir);
        }
        plan
    }
}
