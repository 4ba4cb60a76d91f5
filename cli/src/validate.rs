#![deny(missing_docs)]

//! # Validate Command
//!
//! Checks one recorded example: optionally builds and validates its request
//! from bound values, then validates a response against its declaration.

use crate::error::{CliError, CliResult};
use crate::examples::{load_examples, select};
use specgen_core::{ActualResponse, Config, RequestPayload, SpecContext};
use std::path::PathBuf;

/// Arguments for the validate command.
#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Configuration file (JSON or YAML).
    #[clap(long, default_value = "specgen.yaml")]
    pub config: PathBuf,

    /// Examples recorded by the test run (JSON or YAML).
    #[clap(long)]
    pub examples: PathBuf,

    /// Position of the example in the examples file.
    #[clap(long, default_value_t = 0)]
    pub index: usize,

    /// Parameter values as a JSON object; builds and validates the request.
    #[clap(long)]
    pub values: Option<String>,

    /// Response status; overrides the recorded response.
    #[clap(long)]
    pub status: Option<u16>,

    /// Response body.
    #[clap(long, default_value = "")]
    pub body: String,

    /// Response header as `"Name=value"`. Repeatable.
    #[clap(long, value_parser = parse_key_val)]
    pub header: Vec<(String, String)>,
}

/// Helper to parse "key=value" arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Executes the validation.
pub fn execute(args: &ValidateArgs) -> CliResult<()> {
    let ctx = SpecContext::new(Config::from_file(&args.config)?);
    let entry = select(load_examples(&args.examples)?, args.index)?;
    let metadata = &entry.metadata;

    if let Some(values) = &args.values {
        let values: serde_json::Value = serde_json::from_str(values)?;
        let request = ctx.build_request(metadata, &values)?;
        ctx.validate_request(metadata, &request)?;
        println!("{} {}", request.verb.method(), request.path);
        for (name, value) in &request.headers {
            println!("{}: {}", name, value);
        }
        match &request.body {
            Some(RequestPayload::Json(text)) | Some(RequestPayload::Raw(text)) => println!("\n{}", text),
            Some(RequestPayload::Form(fields)) => println!("\n{}", serde_json::to_string(fields)?),
            None => {}
        }
    }

    let response = match (args.status, entry.actual_response) {
        (Some(status), _) => Some(args.header.iter().fold(
            ActualResponse::new(status, args.body.clone()),
            |response, (name, value)| response.header(name, value),
        )),
        (None, recorded) => recorded,
    };
    let Some(response) = response else {
        if args.values.is_none() {
            return Err(CliError::General(
                "Nothing to validate: pass --values, --status, or record an actual_response".into(),
            ));
        }
        return Ok(());
    };

    ctx.validate_response(metadata, &response)?;
    println!(
        "{} {} -> {} ok",
        metadata.operation.verb.method(),
        metadata.path_item.template,
        response.status
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specgen_core::AppError;
    use std::fs;
    use tempfile::tempdir;

    const CONFIG: &str = r#"{
      "openapi_root": "docs",
      "openapi_specs": { "v1/openapi.json": {
        "openapi": "3.0.1",
        "info": { "title": "Blogs", "version": "v1" },
        "paths": {},
        "components": { "schemas": { "blog": {
          "type": "object",
          "properties": { "title": { "type": "string" } },
          "required": ["title"]
        } } }
      } }
    }"#;

    const EXAMPLES: &str = r##"[
      {
        "path_item": { "template": "/blogs" },
        "operation": {
          "verb": "post",
          "summary": "Creates a blog",
          "consumes": ["application/json"],
          "parameters": [{ "name": "blog", "in": "body", "required": true, "schema": { "$ref": "#/components/schemas/blog" } }]
        },
        "response": { "code": "201", "description": "created", "schema": { "$ref": "#/components/schemas/blog" } }
      }
    ]"##;

    fn args(dir: &std::path::Path) -> ValidateArgs {
        fs::write(dir.join("specgen.json"), CONFIG).unwrap();
        fs::write(dir.join("examples.json"), EXAMPLES).unwrap();
        ValidateArgs {
            config: dir.join("specgen.json"),
            examples: dir.join("examples.json"),
            index: 0,
            values: None,
            status: Some(201),
            body: r#"{"title":"a"}"#.into(),
            header: vec![],
        }
    }

    #[test]
    fn test_valid_response() {
        let dir = tempdir().unwrap();
        execute(&args(dir.path())).unwrap();
    }

    #[test]
    fn test_wrong_status_fails() {
        let dir = tempdir().unwrap();
        let args = ValidateArgs {
            status: Some(500),
            ..args(dir.path())
        };
        match execute(&args).unwrap_err() {
            CliError::Core(AppError::UnexpectedResponse(msg)) => {
                assert!(msg.starts_with("Expected response code '500' to match '201'"), "{}", msg)
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_request_values_validated() {
        let dir = tempdir().unwrap();
        let args = ValidateArgs {
            values: Some(r#"{"blog":{"title":7}}"#.into()),
            ..args(dir.path())
        };
        assert!(matches!(
            execute(&args).unwrap_err(),
            CliError::Core(AppError::UnexpectedRequest(_))
        ));
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(parse_key_val("X-Id=1=2").unwrap(), ("X-Id".into(), "1=2".into()));
        assert!(parse_key_val("X-Id").is_err());
    }
}
