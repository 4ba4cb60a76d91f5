//! # Response Definitions

use crate::error::AppResult;
use crate::model::parameter::validate_extensions;
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

/// A declared response header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeaderDef {
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the header value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Legacy Swagger 2.0 type shorthand.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<String>,
    /// Whether the header must be present. Absent means required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Vendor extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl HeaderDef {
    /// Creates a header with the given schema.
    pub fn new(schema: Value) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the required flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Headers are required unless explicitly declared otherwise.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    /// True when the schema allows a null value.
    pub fn is_nullable(&self) -> bool {
        self.schema.as_ref().is_some_and(|schema| {
            ["nullable", "x-nullable"]
                .iter()
                .any(|flag| schema.get(*flag).and_then(Value::as_bool) == Some(true))
        })
    }
}

/// One expected response of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDef {
    /// Status code, e.g. `"200"`. Integers are accepted on input.
    #[serde(deserialize_with = "deserialize_status_code")]
    pub code: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Declared response headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderDef>,
    /// Response body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// OAS 3.x content map (media type to media type object).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, Value>,
    /// Swagger 2.0 examples (media type to example value).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Value>,
    /// Vendor extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl ResponseDef {
    /// Creates a response for a status code.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            headers: IndexMap::new(),
            schema: None,
            content: IndexMap::new(),
            examples: IndexMap::new(),
            extensions: IndexMap::new(),
        }
    }

    /// Sets the body schema.
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Declares a response header.
    pub fn header(mut self, name: impl Into<String>, header: HeaderDef) -> Self {
        self.headers.insert(name.into(), header);
        self
    }

    /// Sets a media type object under `content`.
    pub fn content(mut self, media_type: impl Into<String>, media: Value) -> Self {
        self.content.insert(media_type.into(), media);
        self
    }

    /// Records a Swagger 2.0 style example keyed by media type.
    pub fn example(mut self, media_type: impl Into<String>, value: Value) -> Self {
        self.examples.insert(media_type.into(), value);
        self
    }

    /// Records a named OAS 3.x example under `content[media_type].examples`.
    pub fn named_example(
        mut self,
        media_type: impl Into<String>,
        name: impl Into<String>,
        value: Value,
        summary: Option<&str>,
    ) -> Self {
        let media = self
            .content
            .entry(media_type.into())
            .or_insert_with(|| Value::Object(Map::new()));
        if !media.is_object() {
            *media = Value::Object(Map::new());
        }
        if let Some(media) = media.as_object_mut() {
            let examples = media
                .entry("examples")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(examples) = examples.as_object_mut() {
                let mut entry = json!({ "value": value });
                if let Some(summary) = summary {
                    entry["summary"] = Value::String(summary.to_string());
                }
                examples.insert(name.into(), entry);
            }
        }
        self
    }

    /// The schema to validate a body with: `schema`, else the first JSON
    /// media type's schema under `content`.
    pub fn body_schema(&self) -> Option<&Value> {
        self.schema.as_ref().or_else(|| {
            self.content
                .iter()
                .find(|(mime, _)| crate::request::builder::is_json_media_type(mime))
                .and_then(|(_, media)| media.get("schema"))
        })
    }

    /// Rejects non `x-` extension keys.
    pub fn validate(&self) -> AppResult<()> {
        validate_extensions(&self.extensions, &format!("response '{}'", self.code))?;
        for (name, header) in &self.headers {
            validate_extensions(&header.extensions, &format!("header '{}'", name))?;
        }
        Ok(())
    }
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(code) => Ok(code),
        Value::Number(code) => Ok(code.to_string()),
        other => Err(DeError::custom(format!(
            "response code must be a string or integer, got {}",
            other
        ))),
    }
}
