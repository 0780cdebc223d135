//! Probe command handler.
//!
//! One-off readiness wait against a server fluentest did not start.

use std::time::Duration;

use anyhow::Result;
use fluentest_core::{LaunchPlan, ReadinessProbe};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::CliContext;

/// Arguments for the probe command.
#[derive(Debug, Clone)]
pub struct ProbeArgs {
    pub url: Url,
    pub endpoints: Vec<String>,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ProbeArgs {
    /// Probe-only plan for these arguments.
    pub fn to_plan(&self) -> LaunchPlan {
        LaunchPlan::external(self.url.clone())
            .with_health_check_endpoints(self.endpoints.clone())
            .with_startup_timeout(self.timeout)
            .with_poll_interval(self.poll_interval)
    }
}

/// Execute the probe command, printing the URL that answered.
pub async fn execute(ctx: &CliContext, args: &ProbeArgs, cancel: &CancellationToken) -> Result<()> {
    let plan = args.to_plan();
    plan.validate_for_probe()?;

    let ready = ctx.hosting.probe.wait_until_ready(&plan, cancel).await?;
    println!("{ready}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_keeps_endpoint_order() {
        let args = ProbeArgs {
            url: Url::parse("http://127.0.0.1:5080").unwrap(),
            endpoints: vec!["/health".into(), "/".into()],
            timeout: Duration::from_millis(250),
            poll_interval: Duration::from_millis(50),
        };

        let plan = args.to_plan();
        let targets = plan.probe_targets().unwrap();

        assert!(plan.executable.is_empty());
        assert_eq!(plan.startup_timeout, Duration::from_millis(250));
        assert_eq!(targets[0].as_str(), "http://127.0.0.1:5080/");
        assert_eq!(targets[1].as_str(), "http://127.0.0.1:5080/health");
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn malformed_endpoint_fails_validation() {
        let args = ProbeArgs {
            url: Url::parse("http://127.0.0.1:5080").unwrap(),
            endpoints: vec!["health".into()],
            timeout: Duration::from_millis(250),
            poll_interval: Duration::from_millis(50),
        };

        assert!(args.to_plan().validate_for_probe().is_err());
    }
}
