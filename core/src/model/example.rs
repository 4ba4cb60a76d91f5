//! # Example Metadata
//!
//! The metadata one example group contributes, and the response observed
//! while running it.

use crate::error::AppResult;
use crate::model::operation::OperationMetadata;
use crate::model::parameter::RefOr;
use crate::model::path_item::PathItem;
use crate::model::response::ResponseDef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Everything one example group declares about the operation under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleMetadata {
    /// Target document name; `None` selects the first configured document.
    #[serde(rename = "openapi_spec", default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Path template and path-level parameters.
    pub path_item: PathItem,
    /// The operation under test.
    pub operation: OperationMetadata,
    /// The expected response.
    pub response: ResponseDef,
    /// Legacy per-test strict flag.
    #[serde(
        rename = "openapi_strict_schema_validation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub strict_schema_validation: Option<bool>,
    /// Per-test override forcing every schema property into `required`.
    #[serde(
        rename = "openapi_all_properties_required",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub all_properties_required: Option<bool>,
    /// Per-test override rejecting unknown properties.
    #[serde(
        rename = "openapi_no_additional_properties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub no_additional_properties: Option<bool>,
}

impl ExampleMetadata {
    /// Combines a path item, operation and expected response.
    pub fn new(path_item: PathItem, operation: OperationMetadata, response: ResponseDef) -> Self {
        Self {
            document: None,
            path_item,
            operation,
            response,
            strict_schema_validation: None,
            all_properties_required: None,
            no_additional_properties: None,
        }
    }

    /// Targets a named document.
    pub fn document(mut self, name: impl Into<String>) -> Self {
        self.document = Some(name.into());
        self
    }

    /// Overrides the all-properties-required validation option.
    pub fn all_properties_required(mut self, value: bool) -> Self {
        self.all_properties_required = Some(value);
        self
    }

    /// Overrides the no-additional-properties validation option.
    pub fn no_additional_properties(mut self, value: bool) -> Self {
        self.no_additional_properties = Some(value);
        self
    }

    /// Sets the legacy strict flag.
    pub fn strict_schema_validation(mut self, value: bool) -> Self {
        self.strict_schema_validation = Some(value);
        self
    }

    /// Validates every node and applies declaration-time parameter rules.
    ///
    /// Metadata built through the builders is already normalized; this is
    /// meant for metadata loaded from files.
    pub fn normalized(mut self) -> AppResult<Self> {
        self.path_item.parameters = normalize_params(self.path_item.parameters);
        self.operation.parameters = normalize_params(self.operation.parameters);
        self.path_item.validate()?;
        self.operation.validate()?;
        self.response.validate()?;
        Ok(self)
    }
}

fn normalize_params(
    params: Vec<RefOr<crate::model::parameter::ParameterDef>>,
) -> Vec<RefOr<crate::model::parameter::ParameterDef>> {
    params
        .into_iter()
        .map(|p| match p {
            RefOr::Item(param) => RefOr::Item(param.normalized()),
            other => other,
        })
        .collect()
}

/// A response observed while running an example.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActualResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers; a `None` value is a header present without a value.
    #[serde(default)]
    pub headers: IndexMap<String, Option<String>>,
    /// Raw response body.
    #[serde(default)]
    pub body: String,
}

impl ActualResponse {
    /// Creates a response with a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Some(value.into()));
        self
    }

    /// Adds a header that is present without a value.
    pub fn null_header(mut self, name: impl Into<String>) -> Self {
        self.headers.insert(name.into(), None);
        self
    }

    /// Case-insensitive header lookup. The outer `Option` is presence.
    pub fn header_value(&self, name: &str) -> Option<Option<&str>> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref())
    }
}

/// One executed example: its metadata plus what the server returned.
///
/// Consumed once by the accumulator, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleRunResult {
    /// The example's metadata.
    pub metadata: ExampleMetadata,
    /// The observed response.
    pub response: ActualResponse,
}

impl ExampleRunResult {
    /// Pairs metadata with an observed response.
    pub fn new(metadata: ExampleMetadata, response: ActualResponse) -> Self {
        Self { metadata, response }
    }
}
