#![deny(missing_docs)]

//! # Specgen Core
//!
//! Turns the metadata of integration-test examples into OpenAPI 3.x or
//! Swagger 2.0 documents. The same metadata drives request construction,
//! request/response validation against the declared schemas, and the
//! accumulation of a document per configured output file.

/// Output roots, document templates and validation flags.
pub mod config;
/// Document accumulation, normalization and emission.
pub mod document;
/// Unified error handling.
pub mod error;
/// Typed example metadata.
pub mod model;
/// OpenAPI version detection and `$ref` resolution.
pub mod oas;
/// Concrete request construction from metadata and bound values.
pub mod request;
/// Resolution of generated documents for static serving.
pub mod serve;
/// Schema-based request and response validation.
pub mod validation;

pub use config::{Config, ConfigFile, DocumentFilter, OutputFormat, RequestEnv};
pub use document::{build_fragment, emit_documents, finalize_document, SpecContext};
pub use error::{AppError, AppResult};
pub use model::{
    ActualResponse, ExampleMetadata, ExampleRunResult, OperationMetadata, ParameterDef, ParameterIn,
    PathItem, ResponseDef, Verb,
};
pub use oas::SpecVersion;
pub use request::{build_request, BuiltRequest, FnSource, RequestPayload, ValueSource};
pub use serve::{ServedDocument, SpecFiles};
pub use validation::ValidationOptions;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_operational() {
        let mut specs = indexmap::IndexMap::new();
        specs.insert("v1/openapi.json".to_string(), json!({ "openapi": "3.0.1", "paths": {} }));
        let config = Config::new("docs", specs).unwrap();
        let ctx = SpecContext::new(config);
        assert_eq!(ctx.version(None).unwrap(), SpecVersion::OpenApi3);
    }
}
