//! Deterministic fingerprints of launch plans.
//!
//! The hash is the registry key and the drift signal: a recorded server whose
//! hash differs from the requested plan's hash must be restarted.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::LaunchPlan;

/// Lowercase hex SHA-256 of a plan's launch-relevant fields.
///
/// Covered fields: executable, arguments, environment (sorted by key),
/// working directory, base URL, health endpoints (sorted) and startup timeout.
/// Poll interval, initial delay and output streaming do not change which
/// server runs, so they are excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ConfigHash(String);

impl ConfigHash {
    /// Compute the fingerprint of a plan.
    pub fn compute(plan: &LaunchPlan) -> Self {
        let mut hasher = Sha256::new();

        write_field(&mut hasher, "executable", plan.executable.as_bytes());

        write_len(&mut hasher, "arguments", plan.arguments.len());
        for arg in &plan.arguments {
            write_field(&mut hasher, "arg", arg.as_bytes());
        }

        let mut env: Vec<(&String, &String)> = plan.environment.iter().collect();
        env.sort_by(|a, b| a.0.cmp(b.0));
        write_len(&mut hasher, "environment", env.len());
        for (key, value) in env {
            write_field(&mut hasher, "env.key", key.as_bytes());
            write_field(&mut hasher, "env.value", value.as_bytes());
        }

        let working_dir = plan
            .working_directory
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        write_field(&mut hasher, "working_directory", working_dir.as_bytes());

        let base_url = plan.base_url.as_ref().map(url::Url::as_str).unwrap_or("");
        write_field(&mut hasher, "base_url", base_url.as_bytes());

        let mut endpoints: Vec<&str> = plan
            .health_check_endpoints
            .iter()
            .map(|e| e.trim())
            .collect();
        endpoints.sort_unstable();
        write_len(&mut hasher, "health_check_endpoints", endpoints.len());
        for endpoint in endpoints {
            write_field(&mut hasher, "endpoint", endpoint.as_bytes());
        }

        let timeout_ms = u64::try_from(plan.startup_timeout.as_millis()).unwrap_or(u64::MAX);
        write_field(&mut hasher, "startup_timeout", &timeout_ms.to_le_bytes());

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap an existing hex string, normalizing it to lowercase.
    pub fn from_hex(hex: impl AsRef<str>) -> Self {
        Self(hex.as_ref().trim().to_ascii_lowercase())
    }

    /// Case-insensitive comparison against a raw hex string.
    pub fn matches(&self, other: &str) -> bool {
        Self::equals(&self.0, other)
    }

    /// Case-insensitive equality of two hex hashes.
    pub fn equals(a: &str, b: &str) -> bool {
        a.trim().eq_ignore_ascii_case(b.trim())
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, enough to tell entries apart in logs.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

// Every field is tagged and length-prefixed so adjacent values cannot run together.
fn write_field(hasher: &mut Sha256, tag: &str, value: &[u8]) {
    hasher.update(tag.as_bytes());
    hasher.update([0u8]);
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value);
}

fn write_len(hasher: &mut Sha256, tag: &str, len: usize) {
    write_field(hasher, tag, &(len as u64).to_le_bytes());
}

impl From<String> for ConfigHash {
    fn from(value: String) -> Self {
        Self::from_hex(value)
    }
}

impl From<ConfigHash> for String {
    fn from(value: ConfigHash) -> Self {
        value.0
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConfigHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    fn base_plan() -> LaunchPlan {
        LaunchPlan::new("dotnet")
            .with_args(["run", "--project", "src/Web"])
            .with_working_directory("/repo")
            .with_base_url(Url::parse("http://localhost:5000").unwrap())
            .with_health_check_endpoint("/health")
    }

    #[test]
    fn env_insertion_order_does_not_matter() {
        let a = base_plan()
            .with_env("ASPNETCORE_ENVIRONMENT", "Development")
            .with_env("ASPNETCORE_URLS", "http://localhost:5000")
            .with_env("FEATURE_X", "on");
        let b = base_plan()
            .with_env("FEATURE_X", "on")
            .with_env("ASPNETCORE_URLS", "http://localhost:5000")
            .with_env("ASPNETCORE_ENVIRONMENT", "Development");

        assert_eq!(ConfigHash::compute(&a), ConfigHash::compute(&b));
    }

    #[test]
    fn endpoint_order_does_not_matter() {
        let a = base_plan().with_health_check_endpoint("/ready");
        let b = LaunchPlan {
            health_check_endpoints: vec!["/ready".into(), "/health".into()],
            ..base_plan()
        };

        assert_eq!(a.config_hash(), b.config_hash());
    }

    #[test]
    fn each_launch_field_changes_the_hash() {
        let base = base_plan().with_env("PORT", "5000");
        let original = base.config_hash();

        let variants = [
            LaunchPlan {
                executable: "dotnet.exe".into(),
                ..base.clone()
            },
            base.clone().with_arg("--no-build"),
            base.clone().with_env("PORT", "5001"),
            base.clone().with_env("EXTRA", "1"),
            base.clone()
                .with_base_url(Url::parse("http://localhost:5001").unwrap()),
            base.clone().with_working_directory("/other"),
            base.clone().with_health_check_endpoint("/ready"),
            base.clone().with_startup_timeout(Duration::from_secs(5)),
        ];

        for variant in variants {
            assert_ne!(variant.config_hash(), original, "{variant:?}");
        }
    }

    #[test]
    fn probe_timings_do_not_change_the_hash() {
        let base = base_plan();
        let tweaked = base
            .clone()
            .with_poll_interval(Duration::from_millis(50))
            .with_initial_delay(Duration::from_secs(1))
            .with_streamed_output(true);

        assert_eq!(base.config_hash(), tweaked.config_hash());
    }

    #[test]
    fn argument_boundaries_are_preserved() {
        let joined = LaunchPlan::new("npm").with_args(["run dev"]);
        let split = LaunchPlan::new("npm").with_args(["run", "dev"]);
        assert_ne!(joined.config_hash(), split.config_hash());
    }

    #[test]
    fn hash_is_lowercase_hex() {
        let hash = base_plan().config_hash();
        assert_eq!(hash.as_str().len(), 64);
        assert!(
            hash.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
        assert_eq!(hash.short().len(), 12);
    }

    #[test]
    fn equality_ignores_case() {
        assert!(ConfigHash::equals("ABC123", "abc123"));
        assert!(!ConfigHash::equals("abc123", "def456"));
        assert!(ConfigHash::from_hex("ABC123").matches("abc123"));
        assert_eq!(ConfigHash::from_hex("ABC123"), ConfigHash::from_hex("abc123"));
    }

    #[test]
    fn serde_normalizes_case() {
        let hash: ConfigHash = serde_json::from_str("\"ABCDEF\"").unwrap();
        assert_eq!(hash.as_str(), "abcdef");
        assert_eq!(serde_json::to_string(&hash).unwrap(), "\"abcdef\"");
    }
}
