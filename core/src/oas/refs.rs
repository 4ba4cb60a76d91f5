//! # Reference Resolution
//!
//! Resolves local `$ref` pointers (`#/...`) against a document. External
//! documents are never fetched; a non-local reference is reported as missing.

use crate::error::{AppError, AppResult};
use crate::model::parameter::{ParameterDef, RefOr};
use crate::oas::version::SpecVersion;
use percent_encoding::percent_decode_str;
use serde_json::Value;

const MAX_REF_DEPTH: usize = 32;

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent escapes).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Looks up a local reference such as `#/components/schemas/User`.
///
/// Returns `None` for external references and for pointers that do not resolve.
pub fn resolve_pointer<'a>(doc: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        return Some(doc);
    }
    let pointer = pointer.strip_prefix('/')?;

    pointer.split('/').try_fold(doc, |node, raw| {
        let segment = decode_pointer_segment(raw);
        match node {
            Value::Object(map) => map.get(&segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Follows a chain of `$ref` nodes until an inline schema is reached.
pub fn resolve_schema<'a>(doc: &'a Value, schema: &'a Value) -> AppResult<&'a Value> {
    let mut current = schema;
    for _ in 0..MAX_REF_DEPTH {
        let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
            return Ok(current);
        };
        current = resolve_pointer(doc, reference).ok_or_else(|| {
            AppError::MissingReference(format!("Referenced schema '{}' must be defined", reference))
        })?;
    }
    Err(AppError::MissingReference(format!(
        "Reference chain exceeds {} hops",
        MAX_REF_DEPTH
    )))
}

/// Resolves a parameter entry, following `$ref` into the document's
/// reusable parameters.
///
/// OpenAPI 3 documents still using `#/parameters/...` are resolved with a
/// deprecation warning.
pub fn resolve_parameter(
    entry: &RefOr<ParameterDef>,
    doc: &Value,
    version: SpecVersion,
) -> AppResult<ParameterDef> {
    let reference = match entry {
        RefOr::Item(param) => return Ok(param.clone()),
        RefOr::Ref { reference } => reference,
    };

    if version == SpecVersion::OpenApi3 && reference.starts_with("#/parameters/") {
        tracing::warn!(
            reference = %reference,
            "parameters is replaced in OpenAPI3! Rename to components/parameters"
        );
    }

    let target = resolve_pointer(doc, reference).ok_or_else(|| {
        AppError::MissingReference(format!("Referenced parameter '{}' must be defined", reference))
    })?;

    let param: ParameterDef = serde_json::from_value(target.clone()).map_err(|e| {
        AppError::MissingReference(format!(
            "Referenced parameter '{}' is not a valid parameter: {}",
            reference, e
        ))
    })?;
    Ok(param.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parameter::ParameterIn;
    use serde_json::json;

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        assert_eq!(decode_pointer_segment("User%20Profile~1details"), "User Profile/details");
    }

    #[test]
    fn test_resolve_pointer_nested() {
        let doc = json!({ "components": { "schemas": { "a/b": { "type": "string" } } } });
        assert_eq!(
            resolve_pointer(&doc, "#/components/schemas/a~1b"),
            Some(&json!({ "type": "string" }))
        );
        assert_eq!(resolve_pointer(&doc, "#/components/schemas/missing"), None);
        assert_eq!(resolve_pointer(&doc, "other.yaml#/components"), None);
    }

    #[test]
    fn test_resolve_schema_chain() {
        let doc = json!({
            "definitions": {
                "alias": { "$ref": "#/definitions/blog" },
                "blog": { "type": "object" }
            }
        });
        let schema = json!({ "$ref": "#/definitions/alias" });
        assert_eq!(resolve_schema(&doc, &schema).unwrap(), &json!({ "type": "object" }));
    }

    #[test]
    fn test_resolve_schema_cycle_is_error() {
        let doc = json!({ "definitions": { "a": { "$ref": "#/definitions/a" } } });
        let schema = json!({ "$ref": "#/definitions/a" });
        assert!(resolve_schema(&doc, &schema).is_err());
    }

    #[test]
    fn test_resolve_parameter_oas3() {
        let doc = json!({
            "openapi": "3.0.1",
            "components": { "parameters": {
                "id": { "name": "id", "in": "path", "schema": { "type": "string" } }
            } }
        });
        let param =
            resolve_parameter(&RefOr::reference("#/components/parameters/id"), &doc, SpecVersion::OpenApi3)
                .unwrap();
        assert_eq!(param.location, ParameterIn::Path);
        assert_eq!(param.required, Some(true));
    }

    #[test]
    fn test_resolve_parameter_missing() {
        let doc = json!({ "swagger": "2.0", "parameters": {} });
        let err = resolve_parameter(&RefOr::reference("#/parameters/limit"), &doc, SpecVersion::Swagger2)
            .unwrap_err();
        match err {
            AppError::MissingReference(msg) => {
                assert_eq!(msg, "Referenced parameter '#/parameters/limit' must be defined")
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
