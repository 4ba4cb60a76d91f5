//! # Response Validation
//!
//! Checks, in order: the status code, the declared headers, then the body
//! (only when the expected response declares a schema).

use crate::error::{AppError, AppResult};
use crate::model::example::{ActualResponse, ExampleMetadata};
use crate::validation::schema::{validate_against, ValidationOptions};
use serde_json::Value;

/// Validates an observed response against the example's expected response.
///
/// # Errors
///
/// `UnexpectedResponse` for a code, header or body mismatch;
/// `Discriminator` when a discriminated `oneOf` cannot select a branch.
pub fn validate_response(
    doc: &Value,
    metadata: &ExampleMetadata,
    response: &ActualResponse,
    options: ValidationOptions,
) -> AppResult<()> {
    validate_code(metadata, response)?;
    validate_headers(metadata, response)?;
    validate_body(doc, metadata, response, options)
}

fn validate_code(metadata: &ExampleMetadata, response: &ActualResponse) -> AppResult<()> {
    let expected = &metadata.response.code;
    let actual = response.status.to_string();
    if actual == *expected {
        return Ok(());
    }
    Err(AppError::UnexpectedResponse(format!(
        "Expected response code '{}' to match '{}'\nResponse body: {}",
        actual, expected, response.body
    )))
}

fn validate_headers(metadata: &ExampleMetadata, response: &ActualResponse) -> AppResult<()> {
    for (name, header) in &metadata.response.headers {
        match response.header_value(name) {
            None if header.is_required() => {
                return Err(AppError::UnexpectedResponse(format!(
                    "Expected response header {} to be present",
                    name
                )));
            }
            Some(None) if !header.is_nullable() => {
                return Err(AppError::UnexpectedResponse(format!(
                    "Expected response header {} to not be null",
                    name
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_body(
    doc: &Value,
    metadata: &ExampleMetadata,
    response: &ActualResponse,
    options: ValidationOptions,
) -> AppResult<()> {
    let Some(schema) = metadata.response.body_schema() else {
        return Ok(());
    };

    let body: Value = serde_json::from_str(&response.body).map_err(|e| {
        AppError::UnexpectedResponse(format!(
            "Expected response body to be JSON: {}\nResponse body: {}",
            e, response.body
        ))
    })?;

    let errors = validate_against(doc, schema, &body, options)?;
    if errors.is_empty() {
        return Ok(());
    }
    Err(AppError::UnexpectedResponse(format!(
        "Expected response body to match schema:\n{}\n--\nResponse body: {}",
        errors.join("\n"),
        serde_json::to_string_pretty(&body)?
    )))
}
