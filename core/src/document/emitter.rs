//! # Document Emitter
//!
//! Finalizes accumulated documents and writes them under the configured
//! root. Existing files are overwritten.

use crate::config::{Config, OutputFormat};
use crate::document::normalize::promote_request_body;
use crate::error::AppResult;
use crate::model::verb::Verb;
use crate::oas::SpecVersion;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Operation keys that are not valid OpenAPI 3 operation fields.
const OAS3_TRANSITIONAL_KEYS: [&str; 3] = ["consumes", "produces", "schemes"];

/// Rewrites a document into its publishable shape.
///
/// OpenAPI 3 operations get their body-like parameters promoted into
/// `requestBody`, lose the legacy `consumes`/`produces`/`schemes` keys, and
/// drop parameter `type` fields that sit next to a `schema`. Declared
/// request examples are removed from operations in both dialects.
pub fn finalize_document(doc: &mut Value) -> AppResult<()> {
    let version = SpecVersion::of(doc)?;
    let doc_consumes = doc.get("consumes").cloned();

    let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) else {
        return Ok(());
    };

    for path_item in paths.values_mut().filter_map(Value::as_object_mut) {
        if version == SpecVersion::OpenApi3 {
            strip_legacy_param_types(path_item);
        }
        for (key, operation) in path_item.iter_mut() {
            if !Verb::is_verb_key(key) {
                continue;
            }
            let Some(operation) = operation.as_object_mut() else {
                continue;
            };
            if version == SpecVersion::OpenApi3 {
                promote_request_body(operation, doc_consumes.as_ref());
                for legacy in OAS3_TRANSITIONAL_KEYS {
                    operation.remove(legacy);
                }
                strip_legacy_param_types(operation);
            }
            operation.remove("request_examples");
        }
    }
    Ok(())
}

fn strip_legacy_param_types(node: &mut Map<String, Value>) {
    let Some(params) = node.get_mut("parameters").and_then(Value::as_array_mut) else {
        return;
    };
    for param in params.iter_mut().filter_map(Value::as_object_mut) {
        if param.contains_key("schema") {
            param.remove("type");
        }
    }
}

/// Renders a document as pretty JSON or YAML.
///
/// YAML output is produced from a JSON round-trip of the document.
pub fn render(doc: &Value, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(doc)?),
        OutputFormat::Yaml => {
            let normalized: Value = serde_json::from_str(&serde_json::to_string(doc)?)?;
            Ok(serde_yaml::to_string(&normalized)?)
        }
    }
}

/// Writes `contents` to `root/name`, creating parent directories.
pub fn write_document(root: &Path, name: &str, contents: &str) -> AppResult<PathBuf> {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// Finalizes, renders and writes every document. In dry-run mode nothing is
/// written and the returned list is empty.
pub fn emit_documents(config: &Config, documents: &IndexMap<String, Value>) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, doc) in documents {
        let mut doc = doc.clone();
        finalize_document(&mut doc)?;
        let contents = render(&doc, config.format)?;

        if config.dry_run {
            tracing::info!(document = %name, "dry run, skipping write");
            continue;
        }
        let path = write_document(&config.root, name, &contents)?;
        tracing::info!(path = %path.display(), "document written");
        written.push(path);
    }
    Ok(written)
}
