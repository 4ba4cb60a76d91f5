#![deny(missing_docs)]

//! # Generate Command
//!
//! Replays recorded examples into the configured documents and writes them.

use crate::error::CliResult;
use crate::examples::load_examples;
use specgen_core::{Config, ExampleRunResult, SpecContext};
use std::path::PathBuf;

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Configuration file (JSON or YAML).
    #[clap(long, default_value = "specgen.yaml")]
    pub config: PathBuf,

    /// Examples recorded by the test run (JSON or YAML).
    #[clap(long)]
    pub examples: PathBuf,

    /// Validate observed responses before recording them.
    #[clap(long)]
    pub validate: bool,

    /// Build the documents without writing them.
    #[clap(long)]
    pub dry_run: bool,
}

/// Executes the generation. Returns the paths written.
pub fn execute(args: &GenerateArgs) -> CliResult<Vec<PathBuf>> {
    let mut config = Config::from_file(&args.config)?;
    if args.dry_run {
        config = config.with_dry_run(true);
    }
    let mut ctx = SpecContext::new(config);

    let entries = load_examples(&args.examples)?;
    tracing::info!(count = entries.len(), "recording examples");
    for entry in entries {
        match entry.actual_response {
            Some(response) => {
                if args.validate {
                    ctx.validate_response(&entry.metadata, &response)?;
                }
                ctx.record_run(ExampleRunResult::new(entry.metadata, response))?;
            }
            None => ctx.record(&entry.metadata)?,
        }
    }

    let written = ctx.emit()?;
    for path in &written {
        println!("Generated {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
openapi_root: docs
openapi_specs:
  v1/openapi.yaml:
    openapi: 3.0.1
    info: { title: Blogs, version: v1 }
    paths: {}
openapi_format: yaml
"#;

    const EXAMPLES: &str = r#"[
      {
        "path_item": { "template": "/blogs" },
        "operation": { "verb": "get", "summary": "Lists blogs", "produces": ["application/json"] },
        "response": { "code": "200", "description": "ok", "schema": { "type": "array" } },
        "actual_response": { "status": 200, "body": "[]" }
      }
    ]"#;

    fn write_inputs(dir: &std::path::Path) -> GenerateArgs {
        fs::write(dir.join("specgen.yaml"), CONFIG).unwrap();
        fs::write(dir.join("examples.json"), EXAMPLES).unwrap();
        GenerateArgs {
            config: dir.join("specgen.yaml"),
            examples: dir.join("examples.json"),
            validate: true,
            dry_run: false,
        }
    }

    #[test]
    fn test_execute_writes_document() {
        let dir = tempdir().unwrap();
        let args = write_inputs(dir.path());

        let written = execute(&args).unwrap();
        assert_eq!(written, vec![dir.path().join("docs/v1/openapi.yaml")]);

        let doc: serde_json::Value = serde_yaml::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(
            doc["paths"]["/blogs"]["get"]["responses"]["200"]["content"]["application/json"]["example"],
            serde_json::json!([])
        );
    }

    #[test]
    fn test_execute_dry_run() {
        let dir = tempdir().unwrap();
        let args = GenerateArgs {
            dry_run: true,
            ..write_inputs(dir.path())
        };
        assert!(execute(&args).unwrap().is_empty());
        assert!(!dir.path().join("docs").exists());
    }
}
