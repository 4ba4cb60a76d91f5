//! # Request Body Normalization
//!
//! Folds legacy `in: body` / `in: formData` parameters of an operation node
//! into an OpenAPI 3 `requestBody`, one media type at a time.
//!
//! The `required` list of a synthesized form schema is append-only: running
//! the promotion twice over an operation that already carries a
//! `requestBody` repeats the names of required form fields.

use crate::request::query::scalar_text;
use serde_json::{json, Map, Value};

/// Unpacks a map-valued enum (`value -> description`) into its keys.
///
/// Returns the generated description, `"<desc>:\n * key text\n..."`, or
/// `None` when the enum is already a list.
pub(crate) fn describe_enum(enum_value: &mut Value, description: Option<&str>) -> Option<String> {
    let Value::Object(entries) = enum_value else {
        return None;
    };

    let mut text = match description {
        Some(desc) => format!("{}:\n", desc),
        None => String::new(),
    };
    for (key, label) in entries.iter() {
        text.push_str(&format!(" * {} {}\n", key, scalar_text(label)));
    }

    *enum_value = Value::Array(entries.keys().cloned().map(Value::String).collect());
    Some(text)
}

/// Promotes body-like parameters into `requestBody` and drops them from
/// `parameters`, then attaches declared request examples.
///
/// `doc_consumes` is the document-level `consumes` list, used when the
/// operation declares none.
pub fn promote_request_body(operation: &mut Map<String, Value>, doc_consumes: Option<&Value>) {
    let params = operation
        .get("parameters")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let (body_like, rest): (Vec<Value>, Vec<Value>) =
        params.into_iter().partition(|p| is_body_like(p));

    if !body_like.is_empty() {
        let mimes = media_types(operation.get("consumes").or(doc_consumes));
        if mimes.is_empty() {
            let operation_id = operation
                .get("operationId")
                .and_then(|id| id.as_str())
                .unwrap_or_default();
            tracing::warn!(
                operation = operation_id,
                "body parameters dropped: no consumes declared on the operation or document"
            );
        } else {
            fold_parameters(operation, &body_like, &mimes);
        }
    }

    if rest.is_empty() {
        operation.remove("parameters");
    } else {
        operation.insert("parameters".into(), Value::Array(rest));
    }

    attach_request_examples(operation);
}

fn is_body_like(param: &Value) -> bool {
    matches!(location(param), Some("body" | "formData"))
}

fn location(param: &Value) -> Option<&str> {
    param.get("in").and_then(Value::as_str)
}

fn is_required(param: &Value) -> bool {
    param.get("required").and_then(Value::as_bool) == Some(true)
}

fn media_types(declared: Option<&Value>) -> Vec<String> {
    declared
        .and_then(Value::as_array)
        .map(|mimes| mimes.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Returns `map[key]` as an object, creating or replacing it when needed.
pub(crate) fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(obj) => obj,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

/// The parameter's schema, falling back to its legacy type shorthand.
/// `file` becomes a binary string.
fn param_schema(param: &Value) -> Option<Value> {
    let mut schema = match param.get("schema") {
        Some(schema) => schema.clone(),
        None => {
            let ty = param.get("type")?;
            let mut schema = json!({ "type": ty });
            for key in ["format", "items", "enum"] {
                if let Some(v) = param.get(key) {
                    schema[key] = v.clone();
                }
            }
            schema
        }
    };
    if schema.get("type").and_then(Value::as_str) == Some("file") {
        schema = json!({ "type": "string", "format": "binary" });
    }
    Some(schema)
}

fn fold_parameters(operation: &mut Map<String, Value>, body_like: &[Value], mimes: &[String]) {
    let body_param = body_like.iter().find(|p| location(p) == Some("body"));
    let body_schema = body_param.and_then(param_schema);
    let any_required = body_like.iter().any(is_required);

    let request_body = object_entry(operation, "requestBody");
    for mime in mimes {
        let media = object_entry(object_entry(request_body, "content"), mime);
        match &body_schema {
            Some(schema) => {
                media.insert("schema".into(), schema.clone());
            }
            None if media.get("schema").is_some_and(is_declared_schema) => {}
            None => {
                for param in body_like.iter().filter(|p| location(p) == Some("formData")) {
                    merge_form_field(media, param);
                }
            }
        }
    }

    if any_required {
        request_body.insert("required".into(), Value::Bool(true));
    }
    if let Some(description) = body_param.and_then(|p| p.get("description")) {
        request_body
            .entry("description")
            .or_insert_with(|| description.clone());
    }
}

/// A schema set before promotion that is not an object being assembled from
/// form fields, e.g. a `$ref`. Form fields never merge into it.
fn is_declared_schema(schema: &Value) -> bool {
    let Some(map) = schema.as_object() else {
        return true;
    };
    if map.is_empty() {
        return false;
    }
    let is_object = map.get("type").map_or(true, |ty| ty.as_str() == Some("object"));
    !map.contains_key("properties") || !is_object
}

fn merge_form_field(media: &mut Map<String, Value>, param: &Value) {
    let Some(name) = param.get("name").and_then(Value::as_str) else {
        return;
    };
    let field_schema = param_schema(param).unwrap_or_else(|| json!({ "type": "string" }));

    let schema = object_entry(media, "schema");
    schema
        .entry("type")
        .or_insert_with(|| Value::String("object".into()));
    object_entry(schema, "properties").insert(name.to_string(), field_schema);
    if is_required(param) {
        let required = schema.entry("required").or_insert_with(|| json!([]));
        if let Some(list) = required.as_array_mut() {
            list.push(Value::String(name.to_string()));
        }
    }

    if let Some(content_type) = param.get("contentType") {
        object_entry(media, "encoding").insert(
            name.to_string(),
            json!({ "contentType": content_type }),
        );
    }
}

fn attach_request_examples(operation: &mut Map<String, Value>) {
    let Some(Value::Array(examples)) = operation.remove("request_examples") else {
        return;
    };
    let summary = operation.get("summary").cloned();
    let Some(content) = operation
        .get_mut("requestBody")
        .and_then(|body| body.get_mut("content"))
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    for media in content.values_mut().filter_map(Value::as_object_mut) {
        let target = object_entry(media, "examples");
        for example in &examples {
            let Some(name) = example.get("name").and_then(Value::as_str) else {
                continue;
            };
            let mut entry = Map::new();
            if let Some(summary) = example.get("summary").or(summary.as_ref()) {
                entry.insert("summary".into(), summary.clone());
            }
            entry.insert(
                "value".into(),
                example.get("value").cloned().unwrap_or(Value::Null),
            );
            target.insert(name.to_string(), Value::Object(entry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn operation(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("operation must be an object"),
        }
    }

    #[test]
    fn test_form_data_promoted_to_object_schema() {
        let mut op = operation(json!({
            "consumes": ["application/json"],
            "parameters": [
                { "in": "formData", "name": "foo", "schema": { "type": "string" } },
                { "in": "formData", "name": "bar", "schema": { "type": "number" }, "required": true }
            ]
        }));
        promote_request_body(&mut op, None);

        assert_eq!(
            op["requestBody"],
            json!({
                "content": { "application/json": { "schema": {
                    "type": "object",
                    "properties": { "foo": { "type": "string" }, "bar": { "type": "number" } },
                    "required": ["bar"]
                } } },
                "required": true
            })
        );
        assert!(op.get("parameters").is_none());
    }

    #[test]
    fn test_body_schema_is_authoritative() {
        let mut op = operation(json!({
            "parameters": [
                { "in": "body", "name": "blog", "schema": { "$ref": "#/components/schemas/blog" } },
                { "in": "formData", "name": "extra", "schema": { "type": "string" } },
                { "in": "query", "name": "draft", "schema": { "type": "boolean" } }
            ]
        }));
        promote_request_body(&mut op, Some(&json!(["application/json", "application/xml"])));

        let content = &op["requestBody"]["content"];
        assert_eq!(content["application/json"]["schema"], json!({ "$ref": "#/components/schemas/blog" }));
        assert_eq!(content["application/xml"]["schema"], json!({ "$ref": "#/components/schemas/blog" }));
        assert!(op["requestBody"].get("required").is_none());
        assert_eq!(op["parameters"], json!([{ "in": "query", "name": "draft", "schema": { "type": "boolean" } }]));
    }

    #[test]
    fn test_file_encoding_and_legacy_type() {
        let mut op = operation(json!({
            "consumes": ["multipart/form-data"],
            "parameters": [
                { "in": "formData", "name": "upload", "type": "file", "contentType": "image/png" },
                { "in": "formData", "name": "label", "type": "string" }
            ]
        }));
        promote_request_body(&mut op, None);

        let media = &op["requestBody"]["content"]["multipart/form-data"];
        assert_eq!(
            media["schema"]["properties"],
            json!({
                "upload": { "type": "string", "format": "binary" },
                "label": { "type": "string" }
            })
        );
        assert_eq!(media["encoding"], json!({ "upload": { "contentType": "image/png" } }));
    }

    #[test]
    fn test_required_list_is_append_only() {
        let mut op = operation(json!({
            "consumes": ["application/x-www-form-urlencoded"],
            "requestBody": { "content": { "application/x-www-form-urlencoded": { "schema": {
                "type": "object",
                "properties": { "name": { "type": "string" } },
                "required": ["name"]
            } } } },
            "parameters": [
                { "in": "formData", "name": "name", "schema": { "type": "string" }, "required": true }
            ]
        }));
        promote_request_body(&mut op, None);

        assert_eq!(
            op["requestBody"]["content"]["application/x-www-form-urlencoded"]["schema"]["required"],
            json!(["name", "name"])
        );
    }

    #[test]
    fn test_declared_ref_schema_not_merged_into() {
        let mut op = operation(json!({
            "consumes": ["multipart/form-data"],
            "requestBody": { "content": { "multipart/form-data": {
                "schema": { "$ref": "#/components/schemas/Upload" }
            } } },
            "parameters": [{ "in": "formData", "name": "file", "type": "file", "required": true }]
        }));
        promote_request_body(&mut op, None);

        assert_eq!(
            op["requestBody"],
            json!({
                "content": { "multipart/form-data": {
                    "schema": { "$ref": "#/components/schemas/Upload" }
                } },
                "required": true
            })
        );
        assert!(op.get("parameters").is_none());
    }

    #[test]
    fn test_declared_schema_detection() {
        assert!(is_declared_schema(&json!({ "$ref": "#/components/schemas/Upload" })));
        assert!(is_declared_schema(&json!({ "type": "string", "format": "binary" })));
        assert!(is_declared_schema(&json!({ "type": "array", "properties": {} })));
        assert!(!is_declared_schema(&json!({})));
        assert!(!is_declared_schema(&json!({ "type": "object", "properties": { "a": {} } })));
    }

    #[test]
    fn test_request_examples_fall_back_to_summary() {
        let mut op = operation(json!({
            "summary": "Creates a blog",
            "consumes": ["application/json"],
            "parameters": [{ "in": "body", "name": "blog", "schema": { "type": "object" }, "required": true }],
            "request_examples": [
                { "name": "basic", "value": { "title": "a" } },
                { "name": "full", "value": { "title": "b" }, "summary": "All fields" }
            ]
        }));
        promote_request_body(&mut op, None);

        assert_eq!(
            op["requestBody"]["content"]["application/json"]["examples"],
            json!({
                "basic": { "summary": "Creates a blog", "value": { "title": "a" } },
                "full": { "summary": "All fields", "value": { "title": "b" } }
            })
        );
        assert!(op.get("request_examples").is_none());
        assert_eq!(op["requestBody"]["required"], json!(true));
    }

    #[test]
    fn test_describe_enum_without_description() {
        let mut value = json!({ "a": "Alpha" });
        assert_eq!(describe_enum(&mut value, None).as_deref(), Some(" * a Alpha\n"));
        assert_eq!(value, json!(["a"]));

        let mut list = json!(["a"]);
        assert_eq!(describe_enum(&mut list, Some("x")), None);
    }
}
