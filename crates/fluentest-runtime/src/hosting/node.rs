//! `npm`/`pnpm`/`yarn` script hosting options.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use fluentest_core::domain::duration_ms;
use fluentest_core::{DEFAULT_STARTUP_TIMEOUT, LaunchPlan};
use serde::{Deserialize, Serialize};
use url::Url;

/// Node package manager used to run the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    pub const fn executable(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

/// Runs a package.json script (typically a Vite/SvelteKit/Next dev server).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHostingOptions {
    /// Directory containing `package.json`.
    pub working_directory: PathBuf,
    pub base_url: Url,
    #[serde(default)]
    pub package_manager: PackageManager,
    #[serde(default = "default_script")]
    pub script: String,
    /// Passed to the script after `--`.
    #[serde(default)]
    pub script_args: Vec<String>,
    #[serde(default = "default_node_env")]
    pub node_env: String,
    /// Extra variables; these win over the defaults.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub health_check_endpoints: Vec<String>,
    #[serde(with = "duration_ms", default = "default_startup_timeout")]
    pub startup_timeout: Duration,
    #[serde(default = "default_stream")]
    pub stream_process_output: bool,
}

fn default_script() -> String {
    "dev".to_string()
}

fn default_node_env() -> String {
    "development".to_string()
}

const fn default_startup_timeout() -> Duration {
    DEFAULT_STARTUP_TIMEOUT
}

const fn default_stream() -> bool {
    true
}

impl NodeHostingOptions {
    pub fn new(working_directory: impl Into<PathBuf>, base_url: Url) -> Self {
        Self {
            working_directory: working_directory.into(),
            base_url,
            package_manager: PackageManager::default(),
            script: default_script(),
            script_args: Vec::new(),
            node_env: default_node_env(),
            environment: BTreeMap::new(),
            health_check_endpoints: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            stream_process_output: true,
        }
    }

    #[must_use]
    pub const fn with_package_manager(mut self, package_manager: PackageManager) -> Self {
        self.package_manager = package_manager;
        self
    }

    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    #[must_use]
    pub fn with_script_arg(mut self, arg: impl Into<String>) -> Self {
        self.script_args.push(arg.into());
        self
    }

    #[must_use]
    pub fn with_node_env(mut self, node_env: impl Into<String>) -> Self {
        self.node_env = node_env.into();
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

    /// `<pm> run <script> [-- args]` with `PORT`, `NODE_ENV` and `BROWSER=none`.
    pub fn to_launch_plan(&self) -> LaunchPlan {
        let mut args = vec!["run".to_string(), self.script.clone()];
        if !self.script_args.is_empty() {
            args.push("--".to_string());
            args.extend(self.script_args.iter().cloned());
        }

        let mut plan = LaunchPlan::new(self.package_manager.executable())
            .with_args(args)
            .with_working_directory(&self.working_directory)
            .with_base_url(self.base_url.clone());

        if let Some(port) = self.base_url.port_or_known_default() {
            plan = plan.with_env("PORT", port.to_string());
        }

        plan.with_env("NODE_ENV", &self.node_env)
            .with_env("BROWSER", "none")
            .with_envs(self.environment.clone())
            .with_health_check_endpoints(self.health_check_endpoints.clone())
            .with_startup_timeout(self.startup_timeout)
            .with_streamed_output(self.stream_process_output)
    }
}
