//! `dotnet run` hosting options.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use fluentest_core::domain::duration_ms;
use fluentest_core::{DEFAULT_STARTUP_TIMEOUT, LaunchPlan};
use serde::{Deserialize, Serialize};
use url::Url;

pub(crate) const DEFAULT_CONFIGURATION: &str = "Debug";
pub(crate) const DEFAULT_ENVIRONMENT_NAME: &str = "Development";

/// Runs an ASP.NET Core project with `dotnet run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotnetHostingOptions {
    /// Path to the `.csproj` (or its directory).
    pub project: PathBuf,
    pub base_url: Url,
    #[serde(default = "default_configuration")]
    pub configuration: String,
    /// Target framework moniker, e.g. `net8.0`.
    #[serde(default)]
    pub framework: Option<String>,
    /// Value for `ASPNETCORE_ENVIRONMENT` and `DOTNET_ENVIRONMENT`.
    #[serde(default = "default_environment_name")]
    pub environment_name: String,
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    /// Extra variables; these win over the defaults above.
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
    DEFAULT_STARTUP_TIMEOUT
}

const fn default_stream() -> bool {
    true
}

/// `run --project <p> --configuration <c> [--framework <f>]`.
pub(crate) fn dotnet_run_args(
    project: &std::path::Path,
    configuration: &str,
    framework: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--project".to_string(),
        project.display().to_string(),
        "--configuration".to_string(),
        configuration.to_string(),
    ];
    if let Some(framework) = framework {
        args.push("--framework".to_string());
        args.push(framework.to_string());
    }
    args
}

/// Base URL as ASP.NET expects it in `ASPNETCORE_URLS` (no trailing slash).
fn listen_url(base_url: &Url) -> String {
    base_url.as_str().trim_end_matches('/').to_string()
}

impl DotnetHostingOptions {
    pub fn new(project: impl Into<PathBuf>, base_url: Url) -> Self {
        Self {
            project: project.into(),
            base_url,
            configuration: default_configuration(),
            framework: None,
            environment_name: default_environment_name(),
            working_directory: None,
            environment: BTreeMap::new(),
            health_check_endpoints: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            stream_process_output: true,
        }
    }

    #[must_use]
    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = configuration.into();
        self
    }

    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    #[must_use]
    pub fn with_environment_name(mut self, name: impl Into<String>) -> Self {
        self.environment_name = name.into();
        self
    }

    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
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

    #[must_use]
    pub const fn with_streamed_output(mut self, stream: bool) -> Self {
        self.stream_process_output = stream;
        self
    }

    /// `dotnet run ... --no-launch-profile` with the ASP.NET environment set.
    pub fn to_launch_plan(&self) -> LaunchPlan {
        let mut args = dotnet_run_args(
            &self.project,
            &self.configuration,
            self.framework.as_deref(),
        );
        args.push("--no-launch-profile".to_string());

        let mut plan = LaunchPlan::new("dotnet")
            .with_args(args)
            .with_base_url(self.base_url.clone())
            .with_env("ASPNETCORE_URLS", listen_url(&self.base_url))
            .with_env("ASPNETCORE_ENVIRONMENT", &self.environment_name)
            .with_env("DOTNET_ENVIRONMENT", &self.environment_name)
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
