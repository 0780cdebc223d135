//! Hash command handler.

use std::path::Path;

use anyhow::Result;
use fluentest_core::ConfigHash;
use fluentest_runtime::HostingConfig;

/// Print the configuration hash of a hosting file.
///
/// This is the key the registry files its entry under.
pub fn execute(file: &Path) -> Result<()> {
    println!("{}", hash_file(file)?);
    Ok(())
}

pub fn hash_file(file: &Path) -> Result<ConfigHash> {
    Ok(HostingConfig::load(file)?.config_hash())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn hash_ignores_output_streaming() {
        let dir = tempfile::TempDir::new().unwrap();
        let quiet = dir.path().join("quiet.json");
        let loud = dir.path().join("loud.json");
        fs::write(
            &quiet,
            r#"{ "kind": "node", "working_directory": "web", "base_url": "http://127.0.0.1:5173", "stream_process_output": false }"#,
        )
        .unwrap();
        fs::write(
            &loud,
            r#"{ "kind": "node", "working_directory": "web", "base_url": "http://127.0.0.1:5173", "stream_process_output": true }"#,
        )
        .unwrap();

        assert_eq!(hash_file(&quiet).unwrap(), hash_file(&loud).unwrap());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = hash_file(Path::new("/nonexistent/hosting.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hosting.json"));
    }
}
