//! # Path Items

use crate::error::{AppError, AppResult};
use crate::model::parameter::{validate_extensions, ParameterDef, RefOr};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"))
}

/// A URL template and its path-level parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// URL template, e.g. `/blogs/{id}`.
    pub template: String,
    /// Short summary shared by all operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description shared by all operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameters inherited by every operation under this path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<ParameterDef>>,
    /// Vendor extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl PathItem {
    /// Declares a path template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            summary: None,
            description: None,
            parameters: Vec::new(),
            extensions: IndexMap::new(),
        }
    }

    /// Appends a path-level parameter.
    pub fn parameter(mut self, param: ParameterDef) -> Self {
        self.parameters.push(RefOr::Item(param.normalized()));
        self
    }

    /// Appends a path-level `$ref` parameter.
    pub fn parameter_ref(mut self, reference: impl Into<String>) -> Self {
        self.parameters.push(RefOr::reference(reference));
        self
    }

    /// Names of the `{placeholder}` tokens in the template, in order.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholder_names(&self.template)
    }

    /// Validates the template, parameters and extension keys.
    pub fn validate(&self) -> AppResult<()> {
        if !self.template.starts_with('/') {
            return Err(AppError::Configuration(format!(
                "Path template '{}' must start with '/'",
                self.template
            )));
        }
        for param in &self.parameters {
            if let RefOr::Item(param) = param {
                param.validate()?;
            }
        }
        validate_extensions(&self.extensions, &format!("path '{}'", self.template))
    }
}

/// Names of the `{placeholder}` tokens in a template, in order.
pub(crate) fn placeholder_names(template: &str) -> Vec<&str> {
    placeholder_re()
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}
