//! # Document Versions
//!
//! Swagger 2.0 and OpenAPI 3.x keep schemas, parameters and security schemes
//! in different places. `SpecVersion` answers "where does this live" for both.

use crate::error::{AppError, AppResult};
use serde_json::Value;

/// The major document dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// `swagger: "2.0"`
    Swagger2,
    /// `openapi: "3.x"`
    OpenApi3,
}

impl SpecVersion {
    /// Detects the dialect from the root `swagger` / `openapi` key.
    pub fn of(doc: &Value) -> AppResult<Self> {
        let version = doc
            .get("openapi")
            .or_else(|| doc.get("swagger"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::Configuration(
                    "Document must declare an 'openapi' or 'swagger' version".into(),
                )
            })?;

        if version.starts_with('2') {
            Ok(SpecVersion::Swagger2)
        } else {
            Ok(SpecVersion::OpenApi3)
        }
    }

    /// True for Swagger 2.0 documents.
    pub fn is_swagger2(&self) -> bool {
        matches!(self, SpecVersion::Swagger2)
    }

    /// Prefix of reusable schema references.
    pub fn schema_ref_prefix(&self) -> &'static str {
        match self {
            SpecVersion::Swagger2 => "#/definitions/",
            SpecVersion::OpenApi3 => "#/components/schemas/",
        }
    }

    /// Prefix of reusable parameter references.
    pub fn parameter_ref_prefix(&self) -> &'static str {
        match self {
            SpecVersion::Swagger2 => "#/parameters/",
            SpecVersion::OpenApi3 => "#/components/parameters/",
        }
    }
}
