//! # Request Validation
//!
//! Validates the payload of a built request before it is sent. The schema is
//! the first `body` parameter's, else the operation's
//! `requestBody.content["application/json"].schema`; with neither, there is
//! nothing to check.

use crate::error::{AppError, AppResult};
use crate::model::operation::OperationMetadata;
use crate::model::parameter::ParameterIn;
use crate::model::path_item::PathItem;
use crate::oas::refs::resolve_parameter;
use crate::oas::SpecVersion;
use crate::request::builder::{BuiltRequest, RequestPayload};
use crate::validation::schema::{validate_against, ValidationOptions};
use serde_json::Value;

/// Locates the request body schema of an operation, if any.
pub fn request_schema(
    doc: &Value,
    path_item: &PathItem,
    operation: &OperationMetadata,
) -> AppResult<Option<Value>> {
    let version = SpecVersion::of(doc)?;
    for entry in operation.parameters.iter().chain(path_item.parameters.iter()) {
        let param = resolve_parameter(entry, doc, version)?;
        if param.location == ParameterIn::Body {
            return Ok(param.schema);
        }
    }

    Ok(operation
        .request_body
        .as_ref()
        .and_then(|body| body.pointer("/content/application~1json/schema"))
        .cloned())
}

/// Validates the payload of `request` against the operation's body schema.
///
/// # Errors
///
/// `UnexpectedRequest` when the payload does not satisfy the schema.
pub fn validate_request(
    doc: &Value,
    path_item: &PathItem,
    operation: &OperationMetadata,
    request: &BuiltRequest,
    options: ValidationOptions,
) -> AppResult<()> {
    let Some(schema) = request_schema(doc, path_item, operation)? else {
        return Ok(());
    };
    let Some(payload) = request.body.as_ref().map(payload_value) else {
        return Ok(());
    };

    let errors = validate_against(doc, &schema, &payload, options)?;
    if errors.is_empty() {
        return Ok(());
    }
    Err(AppError::UnexpectedRequest(format!(
        "Expected request body to match schema:\n{}\n--\nRequest body: {}",
        errors.join("\n"),
        serde_json::to_string_pretty(&payload)?
    )))
}

fn payload_value(payload: &RequestPayload) -> Value {
    match payload {
        RequestPayload::Json(text) | RequestPayload::Raw(text) => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
        }
        RequestPayload::Form(fields) => Value::Object(fields.clone().into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parameter::ParameterDef;
    use crate::model::verb::Verb;
    use crate::request::builder::build_request;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "openapi": "3.0.1",
            "components": { "schemas": { "blog": {
                "type": "object",
                "properties": { "title": { "type": "string" } },
                "required": ["title"]
            } } }
        })
    }

    #[test]
    fn test_body_parameter_schema_validated() {
        let item = PathItem::new("/blogs");
        let op = Verb::Post
            .operation("Creates a blog")
            .consumes(["application/json"])
            .parameter(ParameterDef::new("blog", ParameterIn::Body).schema(json!({ "$ref": "#/components/schemas/blog" })));

        let good = build_request(&doc(), &item, &op, &json!({ "blog": { "title": "a" } })).unwrap();
        assert!(validate_request(&doc(), &item, &op, &good, Default::default()).is_ok());

        let bad = build_request(&doc(), &item, &op, &json!({ "blog": { "title": 5 } })).unwrap();
        let err = validate_request(&doc(), &item, &op, &bad, Default::default()).unwrap_err();
        match err {
            AppError::UnexpectedRequest(msg) => {
                assert!(msg.starts_with("Expected request body to match schema:"), "{}", msg);
                assert!(msg.contains("\"title\": 5"), "{}", msg);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_request_body_fallback() {
        let mut op = Verb::Post.operation("Creates a blog").consumes(["application/json"]);
        op.request_body = Some(json!({
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/blog" } } }
        }));
        let item = PathItem::new("/blogs");
        assert_eq!(
            request_schema(&doc(), &item, &op).unwrap(),
            Some(json!({ "$ref": "#/components/schemas/blog" }))
        );
    }

    #[test]
    fn test_no_schema_is_noop() {
        let item = PathItem::new("/blogs");
        let op = Verb::Get.operation("Lists blogs");
        let request = build_request(&doc(), &item, &op, &json!({})).unwrap();
        assert!(validate_request(&doc(), &item, &op, &request, Default::default()).is_ok());
    }
}
