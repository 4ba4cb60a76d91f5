#![deny(missing_docs)]

//! # Example Files
//!
//! Loads example metadata recorded by a test run. The file is a JSON or
//! YAML list; each entry is an example's metadata plus, optionally, the
//! response observed while running it under `actual_response`.

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use specgen_core::{ActualResponse, ExampleMetadata};
use std::fs;
use std::path::Path;

/// One entry of an examples file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExampleEntry {
    /// The declared metadata.
    #[serde(flatten)]
    pub metadata: ExampleMetadata,
    /// The response observed while running the example.
    #[serde(default)]
    pub actual_response: Option<ActualResponse>,
}

/// Reads and normalizes every entry of an examples file.
pub fn load_examples(path: &Path) -> CliResult<Vec<ExampleEntry>> {
    let raw = fs::read_to_string(path)?;
    let yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "yaml" | "yml"));
    let entries: Vec<ExampleEntry> = if yaml {
        serde_yaml::from_str(&raw)?
    } else {
        serde_json::from_str(&raw)?
    };

    entries
        .into_iter()
        .map(|entry| {
            Ok(ExampleEntry {
                metadata: entry.metadata.normalized()?,
                actual_response: entry.actual_response,
            })
        })
        .collect::<Result<_, specgen_core::AppError>>()
        .map_err(CliError::from)
}

/// Selects one entry by position.
pub fn select(entries: Vec<ExampleEntry>, index: usize) -> CliResult<ExampleEntry> {
    let count = entries.len();
    entries
        .into_iter()
        .nth(index)
        .ok_or_else(|| CliError::General(format!("Example {} out of range ({} loaded)", index, count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const EXAMPLES: &str = r#"
- path_item:
    template: /blogs/{id}
    parameters:
      - { name: id, in: path, type: integer }
  operation:
    verb: get
    summary: Retrieves a blog
    produces: [application/json]
  response:
    code: 200
    description: blog found
  actual_response:
    status: 200
    body: '{"id":1}'
"#;

    #[test]
    fn test_load_yaml_examples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("examples.yaml");
        fs::write(&path, EXAMPLES).unwrap();

        let entries = load_examples(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].metadata.response.code, "200");
        assert_eq!(entries[0].actual_response.as_ref().map(|r| r.status), Some(200));
        assert!(select(entries, 3).is_err());
    }

    #[test]
    fn test_invalid_extension_key_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("examples.json");
        fs::write(
            &path,
            r#"[{"path_item":{"template":"/a"},"operation":{"verb":"get","vendor":1},"response":{"code":"200"}}]"#,
        )
        .unwrap();
        assert!(load_examples(&path).is_err());
    }
}
