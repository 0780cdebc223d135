//! Hosting file format.
//!
//! ```json
//! { "kind": "node", "working_directory": "web", "base_url": "http://localhost:5173" }
//! ```
//! Durations are milliseconds.

use std::fs;
use std::path::Path;

use fluentest_core::{ConfigHash, LaunchPlan};
use serde::{Deserialize, Serialize};

use super::{
    AspireHostingOptions, DotnetHostingOptions, ExternalHostingOptions, HostingError,
    NodeHostingOptions,
};

/// One way of hosting the app under test, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HostingConfig {
    Dotnet(DotnetHostingOptions),
    Node(NodeHostingOptions),
    Aspire(AspireHostingOptions),
    External(ExternalHostingOptions),
    /// A raw launch plan.
    Custom(LaunchPlan),
}

impl HostingConfig {
    pub fn from_json(json: &str) -> Result<Self, HostingError> {
        serde_json::from_str(json).map_err(|e| HostingError::Config(e.to_string()))
    }

    /// Read a hosting file.
    pub fn load(path: &Path) -> Result<Self, HostingError> {
        let json = fs::read_to_string(path)
            .map_err(|e| HostingError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&json)
            .map_err(|e| HostingError::Config(format!("{}: {e}", path.display())))
    }

    /// Whether this configuration launches a process.
    pub const fn is_managed(&self) -> bool {
        !matches!(self, Self::External(_))
    }

    /// The plan this configuration runs (probe-only for `external`).
    pub fn launch_plan(&self) -> LaunchPlan {
        match self {
            Self::Dotnet(options) => options.to_launch_plan(),
            Self::Node(options) => options.to_launch_plan(),
            Self::Aspire(options) => options.to_launch_plan(),
            Self::External(options) => options.to_launch_plan(),
            Self::Custom(plan) => plan.clone(),
        }
    }

    pub fn config_hash(&self) -> ConfigHash {
        self.launch_plan().config_hash()
    }

    /// Force output streaming on or off.
    pub fn set_streamed_output(&mut self, stream: bool) {
        match self {
            Self::Dotnet(options) => options.stream_process_output = stream,
            Self::Node(options) => options.stream_process_output = stream,
            Self::Aspire(options) => options.stream_process_output = stream,
            Self::External(_) => {}
            Self::Custom(plan) => plan.stream_process_output = stream,
        }
    }
}
