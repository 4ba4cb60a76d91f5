#![deny(missing_docs)]

//! # Show Command
//!
//! Prints a generated document the way it would be served for a request path.

use crate::error::{CliError, CliResult};
use specgen_core::{Config, RequestEnv, SpecFiles};
use std::path::PathBuf;

/// Arguments for the show command.
#[derive(clap::Args, Debug, Clone)]
pub struct ShowArgs {
    /// Configuration file (JSON or YAML).
    #[clap(long, default_value = "specgen.yaml")]
    pub config: PathBuf,

    /// Request path, e.g. `/v1/openapi.json`.
    pub path: String,
}

/// Resolves and renders the requested document.
pub fn execute(args: &ShowArgs) -> CliResult<String> {
    let config = Config::from_file(&args.config)?;
    let served = SpecFiles::from_config(&config)
        .load(&RequestEnv::new(args.path.as_str()))?
        .ok_or_else(|| CliError::General(format!("No document at {}", args.path)))?;
    tracing::debug!(content_type = served.content_type, "resolved document");
    Ok(served.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_show_resolves_under_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs/v1")).unwrap();
        fs::write(dir.path().join("docs/v1/openapi.json"), r#"{"openapi":"3.0.1"}"#).unwrap();
        fs::write(
            dir.path().join("specgen.yaml"),
            "openapi_root: docs\nopenapi_specs:\n  v1/openapi.json: { openapi: 3.0.1, paths: {} }\n",
        )
        .unwrap();

        let mut args = ShowArgs {
            config: dir.path().join("specgen.yaml"),
            path: "/v1/openapi.json".into(),
        };
        assert!(execute(&args).unwrap().contains("\"openapi\": \"3.0.1\""));

        args.path = "/../specgen.yaml".into();
        assert!(execute(&args).is_err());
    }
}
