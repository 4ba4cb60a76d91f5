//! # Request Builder
//!
//! Turns an operation plus bound example values into a concrete request:
//! verb, interpolated path with query string, headers and payload.
//!
//! Parameter expansion order is operation parameters, then path-item
//! parameters, then parameters derived from security requirements. Entries
//! are de-duplicated by `(name, in)` with the first occurrence winning.

use crate::error::{AppError, AppResult};
use crate::model::operation::{OperationMetadata, SecurityRequirement};
use crate::model::parameter::{ParameterDef, ParameterIn};
use crate::model::path_item::PathItem;
use crate::model::verb::Verb;
use crate::oas::refs::resolve_parameter;
use crate::oas::SpecVersion;
use crate::request::query::{scalar_text, serialize_query_param};
use crate::request::values::ValueSource;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

const FORM_MEDIA_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "multipart/form-data"];

fn json_media_type_re() -> &'static Regex {
    static JSON_MIME_RE: OnceLock<Regex> = OnceLock::new();
    JSON_MIME_RE.get_or_init(|| {
        Regex::new(r"^application/([0-9A-Za-z._-]+\+json|json)$").expect("Invalid regex")
    })
}

fn server_variable_re() -> &'static Regex {
    static SERVER_VAR_RE: OnceLock<Regex> = OnceLock::new();
    SERVER_VAR_RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"))
}

/// True for `application/json` and `application/<anything>+json`.
///
/// Media type parameters (`; charset=utf-8`) are ignored.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    json_media_type_re().is_match(essence)
}

/// True for the two form encodings that carry `formData` parameters.
pub fn is_form_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    FORM_MEDIA_TYPES.contains(&essence)
}

/// The payload of a built request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    /// JSON-encoded body parameter.
    Json(String),
    /// Bound `formData` values keyed by parameter name.
    Form(IndexMap<String, Value>),
    /// Body parameter sent as-is.
    Raw(String),
}

/// A concrete request ready to be sent by the calling test.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    /// HTTP verb.
    pub verb: Verb,
    /// Base path, interpolated template and query string.
    pub path: String,
    /// Request headers in insertion order.
    pub headers: IndexMap<String, String>,
    /// Request payload, when the content type and parameters call for one.
    pub body: Option<RequestPayload>,
}

impl BuiltRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builds the request for `operation` under `path_item`.
///
/// # Errors
///
/// * `MissingReference` when a parameter or security scheme does not resolve.
/// * `MissingValue` when a required parameter has no bound value.
/// * `Configuration` when the document declares no version.
pub fn build_request<V>(
    doc: &Value,
    path_item: &PathItem,
    operation: &OperationMetadata,
    values: &V,
) -> AppResult<BuiltRequest>
where
    V: ValueSource + ?Sized,
{
    let version = SpecVersion::of(doc)?;
    let parameters = expand_parameters(doc, path_item, operation, version)?;

    let mut bound: Vec<(ParameterDef, Value)> = Vec::with_capacity(parameters.len());
    for param in parameters {
        match values.lookup(&param.name) {
            Some(value) => bound.push((param, value)),
            None if param.is_required() => {
                return Err(AppError::MissingValue(format!(
                    "Parameter '{}' in '{}' is required but has no bound value",
                    param.name, param.location
                )));
            }
            None => tracing::debug!(parameter = %param.name, "skipping unbound optional parameter"),
        }
    }

    let path = format!(
        "{}{}",
        base_path(doc, version),
        interpolate_path(&path_item.template, &bound, version)
    );
    let headers = build_headers(doc, operation, &bound, values);
    let body = headers
        .get("Content-Type")
        .and_then(|content_type| build_payload(content_type, &bound));

    Ok(BuiltRequest {
        verb: operation.verb,
        path,
        headers,
        body,
    })
}

/// Resolves, merges and de-duplicates every parameter that applies to the
/// operation, including security-derived ones.
pub fn expand_parameters(
    doc: &Value,
    path_item: &PathItem,
    operation: &OperationMetadata,
    version: SpecVersion,
) -> AppResult<Vec<ParameterDef>> {
    let declared = operation.parameters.iter().chain(path_item.parameters.iter());

    let mut expanded = Vec::new();
    for entry in declared {
        expanded.push(resolve_parameter(entry, doc, version)?);
    }
    expanded.extend(security_parameters(doc, operation, version)?);

    let mut seen = HashSet::new();
    expanded.retain(|p| seen.insert((p.name.clone(), p.location)));
    Ok(expanded)
}

fn security_parameters(
    doc: &Value,
    operation: &OperationMetadata,
    version: SpecVersion,
) -> AppResult<Vec<ParameterDef>> {
    let requirements: Vec<SecurityRequirement> = match &operation.security {
        Some(security) => security.clone(),
        None => match doc.get("security") {
            Some(security) => serde_json::from_value(security.clone())?,
            None => Vec::new(),
        },
    };
    if requirements.is_empty() {
        return Ok(Vec::new());
    }

    let schemes = security_schemes(doc, version);
    let required = requirements.len() == 1;
    let mut params = Vec::new();

    for name in requirements.iter().flat_map(|r| r.keys()) {
        let scheme = schemes.and_then(|s| s.get(name)).ok_or_else(|| {
            AppError::MissingReference(format!("Referenced security scheme '{}' must be defined", name))
        })?;

        let param = match scheme.get("type").and_then(Value::as_str) {
            Some("apiKey") => {
                let param_name = scheme.get("name").and_then(Value::as_str).unwrap_or(name);
                let location: ParameterIn = scheme
                    .get("in")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()?
                    .unwrap_or(ParameterIn::Header);
                ParameterDef::new(param_name, location)
            }
            Some("basic" | "http" | "oauth2") => ParameterDef::new("Authorization", ParameterIn::Header),
            _ => continue,
        };

        let param = match version {
            SpecVersion::OpenApi3 => param.schema(json!({ "type": "string" })),
            SpecVersion::Swagger2 => param.legacy_type("string"),
        };
        params.push(param.required(required));
    }
    Ok(params)
}

fn security_schemes(doc: &Value, version: SpecVersion) -> Option<&serde_json::Map<String, Value>> {
    let legacy = doc.get("securityDefinitions").and_then(Value::as_object);
    match version {
        SpecVersion::Swagger2 => legacy,
        SpecVersion::OpenApi3 => {
            let schemes = doc
                .pointer("/components/securitySchemes")
                .and_then(Value::as_object);
            if schemes.is_none() && legacy.is_some() {
                tracing::warn!(
                    "securityDefinitions is replaced in OpenAPI3! Rename to components/securitySchemes"
                );
                return legacy;
            }
            schemes
        }
    }
}

/// The prefix prepended to every path: Swagger 2 `basePath`, or the path of
/// the first OpenAPI 3 server with its variables set to their defaults.
pub fn base_path(doc: &Value, version: SpecVersion) -> String {
    match version {
        SpecVersion::Swagger2 => doc
            .get("basePath")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string(),
        SpecVersion::OpenApi3 => {
            let Some(server) = doc.get("servers").and_then(|s| s.get(0)) else {
                return String::new();
            };
            let template = server.get("url").and_then(Value::as_str).unwrap_or_default();
            let variables = server.get("variables");
            let url = server_variable_re().replace_all(template, |caps: &regex::Captures| {
                variables
                    .and_then(|v| v.get(&caps[1]))
                    .and_then(|v| v.get("default"))
                    .map(scalar_text)
                    .unwrap_or_default()
            });

            let path = match Url::parse(&url) {
                Ok(parsed) => parsed.path().to_string(),
                Err(_) => url.into_owned(),
            };
            path.trim_end_matches('/').to_string()
        }
    }
}

fn interpolate_path(template: &str, bound: &[(ParameterDef, Value)], version: SpecVersion) -> String {
    let mut path = template.to_string();
    for (param, value) in bound.iter().filter(|(p, _)| p.location == ParameterIn::Path) {
        path = path.replace(&format!("{{{}}}", param.name), &scalar_text(value));
    }

    let query: Vec<String> = bound
        .iter()
        .filter(|(p, _)| p.location == ParameterIn::Query)
        .filter_map(|(p, v)| serialize_query_param(p, v, version))
        .collect();
    if !query.is_empty() {
        path.push('?');
        path.push_str(&query.join("&"));
    }
    path
}

fn build_headers<V>(
    doc: &Value,
    operation: &OperationMetadata,
    bound: &[(ParameterDef, Value)],
    values: &V,
) -> IndexMap<String, String>
where
    V: ValueSource + ?Sized,
{
    let mut headers: IndexMap<String, String> = bound
        .iter()
        .filter(|(p, _)| p.location == ParameterIn::Header)
        .map(|(p, v)| (p.name.clone(), scalar_text(v)))
        .collect();

    let first_of = |declared: &Option<Vec<String>>, key: &str| {
        declared
            .as_ref()
            .and_then(|m| m.first().cloned())
            .or_else(|| doc.get(key).and_then(|m| m.get(0)).and_then(Value::as_str).map(str::to_string))
    };
    let with_override = |header: &str, fallback: Option<String>| {
        fallback.map(|default| values.lookup(header).map(|v| scalar_text(&v)).unwrap_or(default))
    };

    if let Some(accept) = with_override("Accept", first_of(&operation.produces, "produces")) {
        headers.insert("Accept".into(), accept);
    }
    if let Some(content_type) = with_override("Content-Type", first_of(&operation.consumes, "consumes")) {
        headers.insert("Content-Type".into(), content_type);
    }
    let host = operation
        .host
        .clone()
        .or_else(|| doc.get("host").and_then(Value::as_str).map(str::to_string))
        .filter(|h| !h.is_empty());
    if let Some(host) = with_override("Host", host) {
        headers.insert("Host".into(), host);
    }

    let cookies: Vec<String> = bound
        .iter()
        .filter(|(p, _)| p.location == ParameterIn::Cookie)
        .map(|(p, v)| format!("{}={}", p.name, scalar_text(v)))
        .collect();
    if !cookies.is_empty() {
        headers.insert("Cookie".into(), cookies.join("; "));
    }
    headers
}

fn build_payload(content_type: &str, bound: &[(ParameterDef, Value)]) -> Option<RequestPayload> {
    if is_form_media_type(content_type) {
        let form: IndexMap<String, Value> = bound
            .iter()
            .filter(|(p, _)| p.location == ParameterIn::FormData)
            .map(|(p, v)| (p.name.clone(), v.clone()))
            .collect();
        return Some(RequestPayload::Form(form));
    }

    let (_, value) = bound.iter().find(|(p, _)| p.location == ParameterIn::Body)?;
    if is_json_media_type(content_type) {
        Some(RequestPayload::Json(value.to_string()))
    } else {
        Some(RequestPayload::Raw(scalar_text(value)))
    }
}
