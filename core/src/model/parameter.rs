//! # Parameter Definitions
//!
//! Typed parameter declarations covering OAS 3.x `style`/`explode` and the
//! legacy Swagger 2.0 `type`/`collectionFormat` shorthand.

use crate::document::normalize::describe_enum;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Either a `$ref` pointer or an inline item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// A `{"$ref": "..."}` reference.
    Ref {
        /// The reference target, e.g. `#/components/parameters/Limit`.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// An inline definition.
    Item(T),
}

impl<T> RefOr<T> {
    /// Builds a reference entry.
    pub fn reference(target: impl Into<String>) -> Self {
        RefOr::Ref {
            reference: target.into(),
        }
    }
}

impl From<ParameterDef> for RefOr<ParameterDef> {
    fn from(param: ParameterDef) -> Self {
        RefOr::Item(param)
    }
}

/// The location of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterIn {
    /// URL path segment (`/blogs/{id}`).
    #[serde(rename = "path")]
    Path,
    /// Query string.
    #[serde(rename = "query")]
    Query,
    /// Request header.
    #[serde(rename = "header")]
    Header,
    /// Cookie.
    #[serde(rename = "cookie")]
    Cookie,
    /// Swagger 2.0 request body.
    #[serde(rename = "body")]
    Body,
    /// Swagger 2.0 form field.
    #[serde(rename = "formData")]
    FormData,
}

impl ParameterIn {
    /// The key used in the `in` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterIn::Path => "path",
            ParameterIn::Query => "query",
            ParameterIn::Header => "header",
            ParameterIn::Cookie => "cookie",
            ParameterIn::Body => "body",
            ParameterIn::FormData => "formData",
        }
    }

    /// Returns true for the legacy locations folded into `requestBody`.
    pub fn is_body_like(&self) -> bool {
        matches!(self, ParameterIn::Body | ParameterIn::FormData)
    }
}

impl fmt::Display for ParameterIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAS 3.x serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    /// `;name=value`
    Matrix,
    /// `.value`
    Label,
    /// `name=value`, default for query and cookie.
    Form,
    /// `value,value`, default for path and header.
    Simple,
    /// Space separated arrays.
    SpaceDelimited,
    /// Pipe separated arrays.
    PipeDelimited,
    /// `name[key]=value`
    DeepObject,
}

/// Swagger 2.0 array serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionFormat {
    /// Comma separated.
    Csv,
    /// Space separated.
    Ssv,
    /// Tab separated.
    Tsv,
    /// Pipe separated.
    Pipes,
    /// Repeated `name=value` pairs.
    Multi,
}

/// A single parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDef {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit required flag. Path parameters are always required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// JSON Schema of the value (may itself be a `$ref`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Legacy Swagger 2.0 primitive type shorthand.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<String>,
    /// Legacy Swagger 2.0 format modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Legacy Swagger 2.0 array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    /// Legacy Swagger 2.0 enum (array, or map of value to description).
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Value>,
    /// OAS 3.x serialization style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,
    /// OAS 3.x explode flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    /// Swagger 2.0 array serialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<CollectionFormat>,
    /// Per-field content type for `formData` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Marks the parameter as deprecated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Vendor extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl ParameterDef {
    /// Creates a parameter; path parameters are marked required.
    pub fn new(name: impl Into<String>, location: ParameterIn) -> Self {
        let required = (location == ParameterIn::Path).then_some(true);
        Self {
            name: name.into(),
            location,
            description: None,
            required,
            schema: None,
            legacy_type: None,
            format: None,
            items: None,
            enum_values: None,
            style: None,
            explode: None,
            collection_format: None,
            content_type: None,
            deprecated: None,
            example: None,
            extensions: IndexMap::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the required flag. Ignored for path parameters.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required || self.location == ParameterIn::Path);
        self
    }

    /// Sets the schema.
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the legacy `type` shorthand.
    pub fn legacy_type(mut self, ty: impl Into<String>) -> Self {
        self.legacy_type = Some(ty.into());
        self
    }

    /// Sets the OAS 3.x style.
    pub fn style(mut self, style: ParameterStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the OAS 3.x explode flag.
    pub fn explode(mut self, explode: bool) -> Self {
        self.explode = Some(explode);
        self
    }

    /// Sets the Swagger 2.0 collection format.
    pub fn collection_format(mut self, format: CollectionFormat) -> Self {
        self.collection_format = Some(format);
        self
    }

    /// Sets the per-field content type (formData only).
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds a vendor extension.
    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// True when the parameter must be bound to a value.
    pub fn is_required(&self) -> bool {
        self.location == ParameterIn::Path || self.required == Some(true)
    }

    /// The declared value type, from `schema.type` or the legacy shorthand.
    pub fn value_type(&self) -> Option<&str> {
        self.schema
            .as_ref()
            .and_then(|s| s.get("type"))
            .and_then(Value::as_str)
            .or(self.legacy_type.as_deref())
    }

    /// Applies declaration-time rules: path parameters become required, and
    /// map-valued enums are unpacked into key lists with a generated description.
    pub fn normalized(mut self) -> Self {
        if self.location == ParameterIn::Path {
            self.required = Some(true);
        }
        let description = self.description.clone();
        if let Some(enum_value) = self
            .schema
            .as_mut()
            .and_then(|s| s.as_object_mut())
            .and_then(|s| s.get_mut("enum"))
        {
            if let Some(text) = describe_enum(enum_value, description.as_deref()) {
                self.description = Some(text);
            }
        }
        let description = self.description.clone();
        if let Some(enum_value) = self.enum_values.as_mut() {
            if let Some(text) = describe_enum(enum_value, description.as_deref()) {
                self.description = Some(text);
            }
        }
        self
    }

    /// Rejects unnamed parameters and non `x-` extension keys.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Configuration(format!(
                "Parameter in '{}' must have a name",
                self.location
            )));
        }
        validate_extensions(&self.extensions, &format!("parameter '{}'", self.name))
    }
}

/// Ensures every key of an extension bag is a vendor extension.
pub(crate) fn validate_extensions(extensions: &IndexMap<String, Value>, context: &str) -> AppResult<()> {
    match extensions.keys().find(|k| !k.starts_with("x-")) {
        Some(key) => Err(AppError::Configuration(format!(
            "Unknown field '{}' on {}; extensions must start with 'x-'",
            key, context
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_parameter_always_required() {
        let param = ParameterDef::new("id", ParameterIn::Path).required(false);
        assert!(param.is_required());
        assert_eq!(param.required, Some(true));
    }

    #[test]
    fn test_query_parameter_optional_by_default() {
        let param = ParameterDef::new("page", ParameterIn::Query);
        assert!(!param.is_required());
        assert_eq!(param.required, None);
    }

    #[test]
    fn test_deserialized_path_parameter_normalized() {
        let param: ParameterDef = serde_json::from_value(json!({
            "name": "id", "in": "path", "required": false, "type": "integer"
        }))
        .unwrap();
        let param = param.normalized();
        assert_eq!(param.required, Some(true));
        assert_eq!(param.value_type(), Some("integer"));
    }

    #[test]
    fn test_enum_map_unpacked() {
        let param = ParameterDef::new("status", ParameterIn::Query)
            .description("Order status")
            .schema(json!({
                "type": "string",
                "enum": { "placed": "Order placed", "shipped": "Order shipped" }
            }))
            .normalized();

        assert_eq!(
            param.schema.unwrap()["enum"],
            json!(["placed", "shipped"])
        );
        assert_eq!(
            param.description.as_deref(),
            Some("Order status:\n * placed Order placed\n * shipped Order shipped\n")
        );
    }

    #[test]
    fn test_ref_or_deserializes_both_shapes() {
        let params: Vec<RefOr<ParameterDef>> = serde_json::from_value(json!([
            { "$ref": "#/components/parameters/Limit" },
            { "name": "q", "in": "query", "schema": { "type": "string" } }
        ]))
        .unwrap();
        assert!(matches!(&params[0], RefOr::Ref { reference } if reference == "#/components/parameters/Limit"));
        assert!(matches!(&params[1], RefOr::Item(p) if p.name == "q"));
    }

    #[test]
    fn test_extensions_round_trip_and_validation() {
        let param: ParameterDef = serde_json::from_value(json!({
            "name": "q", "in": "query", "x-internal": true
        }))
        .unwrap();
        assert_eq!(param.extensions.get("x-internal"), Some(&json!(true)));
        assert!(param.validate().is_ok());

        let bad: ParameterDef = serde_json::from_value(json!({
            "name": "q", "in": "query", "bogus": 1
        }))
        .unwrap();
        assert!(matches!(bad.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let param = ParameterDef::new("tags", ParameterIn::Query)
            .legacy_type("array")
            .collection_format(CollectionFormat::Pipes);
        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(
            value,
            json!({ "name": "tags", "in": "query", "type": "array", "collectionFormat": "pipes" })
        );
    }
}
