//! # Operation Metadata
//!
//! One HTTP operation under a path template, built incrementally by the
//! calling test declarations.

use crate::error::AppResult;
use crate::model::parameter::{validate_extensions, ParameterDef, RefOr};
use crate::model::response::ResponseDef;
use crate::model::verb::Verb;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A security requirement: scheme name to required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// A named request example attached to an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestExample {
    /// Key under the media type's `examples` map.
    pub name: String,
    /// Example payload.
    pub value: Value,
    /// Summary; falls back to the operation summary when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Operation level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// The verb this operation is declared under.
    pub verb: Verb,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unique operation identifier.
    #[serde(rename = "operationId", default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation parameters, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<ParameterDef>>,
    /// Security requirements; `None` falls back to the document level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Legacy request media types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    /// Legacy response media types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    /// Legacy transfer schemes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    /// Marks the operation deprecated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Host override used for the `Host` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// OAS 3.x request body, populated by normalization.
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    /// Declared request examples, folded into `requestBody` on emit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_examples: Vec<RequestExample>,
    /// Pre-declared responses keyed by status code.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseDef>,
    /// Vendor extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl OperationMetadata {
    /// Starts an operation for `verb`.
    pub fn new(verb: Verb, summary: impl Into<String>) -> Self {
        Self {
            verb,
            summary: Some(summary.into()),
            description: None,
            operation_id: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            security: None,
            consumes: None,
            produces: None,
            schemes: None,
            deprecated: None,
            host: None,
            request_body: None,
            request_examples: Vec::new(),
            responses: IndexMap::new(),
            extensions: IndexMap::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the operation id.
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Sets the tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a parameter.
    pub fn parameter(mut self, param: ParameterDef) -> Self {
        self.parameters.push(RefOr::Item(param.normalized()));
        self
    }

    /// Appends a `$ref` parameter.
    pub fn parameter_ref(mut self, reference: impl Into<String>) -> Self {
        self.parameters.push(RefOr::reference(reference));
        self
    }

    /// Sets the security requirements.
    pub fn security(mut self, security: Vec<SecurityRequirement>) -> Self {
        self.security = Some(security);
        self
    }

    /// Sets the request media types.
    pub fn consumes<I, S>(mut self, mimes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = Some(mimes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the response media types.
    pub fn produces<I, S>(mut self, mimes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = Some(mimes.into_iter().map(Into::into).collect());
        self
    }

    /// Marks the operation deprecated.
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Declares a named request example.
    pub fn request_example(
        mut self,
        name: impl Into<String>,
        value: Value,
        summary: Option<&str>,
    ) -> Self {
        self.request_examples.push(RequestExample {
            name: name.into(),
            value,
            summary: summary.map(str::to_string),
        });
        self
    }

    /// Pre-declares a response.
    pub fn response(mut self, response: ResponseDef) -> Self {
        self.responses.insert(response.code.clone(), response);
        self
    }

    /// Adds a vendor extension.
    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Inline parameters only, skipping `$ref` entries.
    pub fn inline_parameters(&self) -> impl Iterator<Item = &ParameterDef> {
        self.parameters.iter().filter_map(|p| match p {
            RefOr::Item(param) => Some(param),
            RefOr::Ref { .. } => None,
        })
    }

    /// Validates parameters, responses and extension keys.
    pub fn validate(&self) -> AppResult<()> {
        for param in self.inline_parameters() {
            param.validate()?;
        }
        for response in self.responses.values() {
            response.validate()?;
        }
        validate_extensions(&self.extensions, &format!("operation '{}'", self.verb))
    }
}
