//! # Query Parameter Serialization
//!
//! Encodes one parameter into a query-string fragment following the OAS 3.x
//! `style`/`explode` rules or the Swagger 2.0 `collectionFormat` rules.
//!
//! | Dialect | Declaration | `["foo","bar"]` |
//! |---------|-------------|-----------------|
//! | OAS 3 | `form`, explode (default) | `name=foo&name=bar` |
//! | OAS 3 | `form`, `explode: false` | `name=foo,bar` |
//! | OAS 3 | `spaceDelimited`, `explode: false` | `name=foo%20bar` |
//! | OAS 3 | `pipeDelimited`, `explode: false` | `name=foo\|bar` |
//! | Swagger 2 | `csv` (default) | `name=foo,bar` |
//! | Swagger 2 | `multi` | `name=foo&name=bar` |

use crate::model::parameter::{CollectionFormat, ParameterDef, ParameterStyle};
use crate::oas::SpecVersion;
use serde_json::{Map, Value};
use url::form_urlencoded::byte_serialize;

/// How array items are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayEncoding {
    /// `name=a&name=b`
    Repeat,
    /// `name=a<sep>b`
    Join(&'static str),
}

/// Serializes `value` for `param`, or `None` when nothing should be sent.
///
/// A missing schema (and, for Swagger 2.0, a missing legacy `type`) or a
/// `null` value produces nothing; the caller omits the parameter.
pub fn serialize_query_param(
    param: &ParameterDef,
    value: &Value,
    version: SpecVersion,
) -> Option<String> {
    if value.is_null() {
        return None;
    }

    match version {
        SpecVersion::OpenApi3 => serialize_oas3(param, value),
        SpecVersion::Swagger2 => serialize_swagger2(param, value),
    }
}

fn serialize_oas3(param: &ParameterDef, value: &Value) -> Option<String> {
    let schema = param.schema.as_ref()?;
    let style = param.style.unwrap_or(ParameterStyle::Form);
    let explode = param.explode.unwrap_or(true);
    let name = param.name.as_str();

    match schema.get("type").and_then(Value::as_str) {
        Some("object") => match value {
            Value::Object(map) => serialize_object(name, map, style, explode),
            other => Some(scalar_pair(name, other)),
        },
        Some("array") => {
            let encoding = if explode {
                ArrayEncoding::Repeat
            } else {
                ArrayEncoding::Join(style_separator(style))
            };
            serialize_array(name, value, encoding)
        }
        _ => Some(scalar_pair(name, value)),
    }
}

fn serialize_swagger2(param: &ParameterDef, value: &Value) -> Option<String> {
    let value_type = param.value_type()?;
    if value_type != "array" {
        return Some(scalar_pair(&param.name, value));
    }

    let encoding = match param.collection_format.unwrap_or(CollectionFormat::Csv) {
        CollectionFormat::Csv => ArrayEncoding::Join(","),
        CollectionFormat::Ssv => ArrayEncoding::Join("%20"),
        CollectionFormat::Tsv => ArrayEncoding::Join("%09"),
        CollectionFormat::Pipes => ArrayEncoding::Join("|"),
        CollectionFormat::Multi => ArrayEncoding::Repeat,
    };
    serialize_array(&param.name, value, encoding)
}

fn style_separator(style: ParameterStyle) -> &'static str {
    match style {
        ParameterStyle::SpaceDelimited => "%20",
        ParameterStyle::PipeDelimited => "|",
        _ => ",",
    }
}

fn serialize_array(name: &str, value: &Value, encoding: ArrayEncoding) -> Option<String> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    if items.is_empty() {
        return None;
    }

    match encoding {
        ArrayEncoding::Repeat => {
            Some(
                items
                    .iter()
                    .map(|item| scalar_pair(name, item))
                    .collect::<Vec<_>>()
                    .join("&"),
            )
        }
        ArrayEncoding::Join(separator) => {
            let joined = items
                .iter()
                .map(|item| encode(&scalar_text(item)))
                .collect::<Vec<_>>()
                .join(separator);
            Some(format!("{}={}", encode(name), joined))
        }
    }
}

fn serialize_object(
    name: &str,
    map: &Map<String, Value>,
    style: ParameterStyle,
    explode: bool,
) -> Option<String> {
    if map.is_empty() {
        return None;
    }

    if style == ParameterStyle::DeepObject {
        let mut pairs = Vec::new();
        deep_object_pairs(&encode(name), map, &mut pairs);
        return Some(pairs.join("&"));
    }

    if explode {
        return Some(
            map.iter()
                .map(|(key, v)| scalar_pair(key, v))
                .collect::<Vec<_>>()
                .join("&"),
        );
    }

    let flattened = map
        .iter()
        .flat_map(|(key, v)| [encode(key), encode(&scalar_text(v))])
        .collect::<Vec<_>>()
        .join(style_separator(style));
    Some(format!("{}={}", encode(name), flattened))
}

fn deep_object_pairs(prefix: &str, map: &Map<String, Value>, pairs: &mut Vec<String>) {
    for (key, value) in map {
        let path = format!("{}[{}]", prefix, encode(key));
        match value {
            Value::Object(nested) => deep_object_pairs(&path, nested, pairs),
            Value::Array(items) => {
                for item in items {
                    pairs.push(format!("{}[]={}", path, encode(&scalar_text(item))));
                }
            }
            other => pairs.push(format!("{}={}", path, encode(&scalar_text(other)))),
        }
    }
}

fn scalar_pair(name: &str, value: &Value) -> String {
    format!("{}={}", encode(name), encode(&scalar_text(value)))
}

/// Renders a bound value as text: strings verbatim, `null` empty, anything
/// else as compact JSON.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Form-urlencodes a name or value (space becomes `+`).
pub(crate) fn encode(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}
