//! # Document Accumulator
//!
//! `SpecContext` owns one in-memory document per configured name for the
//! duration of a test-suite run. Each completed example group contributes a
//! fragment that is deep-merged into its target document.

use crate::config::Config;
use crate::document::emitter;
use crate::document::merge::deep_merge;
use crate::document::upgrade;
use crate::error::{AppError, AppResult};
use crate::model::example::{ActualResponse, ExampleMetadata, ExampleRunResult};
use crate::oas::SpecVersion;
use crate::request::builder::{build_request, is_json_media_type, BuiltRequest};
use crate::request::values::ValueSource;
use crate::validation::{self, ValidationOptions};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Per-run state: the configuration and every accumulated document.
#[derive(Debug, Clone)]
pub struct SpecContext {
    config: Config,
    documents: IndexMap<String, Value>,
}

impl SpecContext {
    /// Starts every document from its configured initial content.
    pub fn new(config: Config) -> Self {
        let documents = config.specs.clone();
        Self { config, documents }
    }

    /// The configuration this context was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accumulated documents in configuration order.
    pub fn documents(&self) -> &IndexMap<String, Value> {
        &self.documents
    }

    /// The document `name` refers to (`None` selects the first).
    pub fn document(&self, name: Option<&str>) -> AppResult<&Value> {
        let name = self.config.document_name(name)?;
        self.documents
            .get(name)
            .ok_or_else(|| AppError::Configuration(format!("Unknown openapi_spec '{}'", name)))
    }

    /// Mutable access to the document `name` refers to.
    pub fn document_mut(&mut self, name: Option<&str>) -> AppResult<&mut Value> {
        let name = self.config.document_name(name)?.to_string();
        self.documents
            .get_mut(&name)
            .ok_or_else(|| AppError::Configuration(format!("Unknown openapi_spec '{}'", name)))
    }

    /// Dialect of the document `name` refers to.
    pub fn version(&self, name: Option<&str>) -> AppResult<SpecVersion> {
        SpecVersion::of(self.document(name)?)
    }

    /// Builds the request an example sends.
    pub fn build_request<V>(&self, metadata: &ExampleMetadata, values: &V) -> AppResult<BuiltRequest>
    where
        V: ValueSource + ?Sized,
    {
        let doc = self.document(metadata.document.as_deref())?;
        build_request(doc, &metadata.path_item, &metadata.operation, values)
    }

    /// Validates a built request's payload against the operation's body schema.
    pub fn validate_request(&self, metadata: &ExampleMetadata, request: &BuiltRequest) -> AppResult<()> {
        let doc = self.document(metadata.document.as_deref())?;
        validation::validate_request(
            doc,
            &metadata.path_item,
            &metadata.operation,
            request,
            ValidationOptions::resolve(&self.config, metadata),
        )
    }

    /// Validates an observed response against the example's expectations.
    pub fn validate_response(&self, metadata: &ExampleMetadata, response: &ActualResponse) -> AppResult<()> {
        let doc = self.document(metadata.document.as_deref())?;
        validation::validate_response(
            doc,
            metadata,
            response,
            ValidationOptions::resolve(&self.config, metadata),
        )
    }

    /// Merges one completed example group into its target document.
    pub fn record(&mut self, metadata: &ExampleMetadata) -> AppResult<()> {
        self.record_fragment(metadata, None)
    }

    /// Like `record`, also attaching the observed body as a response example
    /// when it parses as JSON.
    pub fn record_run(&mut self, run: ExampleRunResult) -> AppResult<()> {
        self.record_fragment(&run.metadata, Some(&run.response))
    }

    /// Finalizes and writes every document; returns the paths written.
    pub fn emit(&self) -> AppResult<Vec<PathBuf>> {
        emitter::emit_documents(&self.config, &self.documents)
    }

    fn record_fragment(&mut self, metadata: &ExampleMetadata, observed: Option<&ActualResponse>) -> AppResult<()> {
        let doc = self.document_mut(metadata.document.as_deref())?;
        let version = SpecVersion::of(doc)?;
        if version == SpecVersion::OpenApi3 {
            upgrade::upgrade_servers(doc);
            upgrade::upgrade_oauth(doc);
        }

        let fragment = build_fragment(doc, metadata, version, observed)?;
        tracing::debug!(
            path = %metadata.path_item.template,
            verb = %metadata.operation.verb,
            code = %metadata.response.code,
            "merging example fragment"
        );
        deep_merge(doc, &fragment);
        Ok(())
    }
}

/// Builds `{paths: {template: {..path item, verb: {..operation, responses}}}}`
/// for one example.
pub fn build_fragment(
    doc: &Value,
    metadata: &ExampleMetadata,
    version: SpecVersion,
    observed: Option<&ActualResponse>,
) -> AppResult<Value> {
    let operation = &metadata.operation;
    let produces: Vec<String> = operation.produces.clone().unwrap_or_else(|| {
        doc.get("produces")
            .and_then(Value::as_array)
            .map(|m| m.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    });

    let mut path_item = to_object(serde_json::to_value(&metadata.path_item)?);
    path_item.remove("template");

    let mut op = to_object(serde_json::to_value(operation)?);
    op.remove("verb");
    op.remove("host");
    op.remove("responses");

    let mut responses = Map::new();
    for (code, declared) in &operation.responses {
        responses.insert(code.clone(), response_node(serde_json::to_value(declared)?, version, &produces));
    }
    let mut current = response_node(serde_json::to_value(&metadata.response)?, version, &produces);
    if let Some(observed) = observed {
        attach_example(&mut current, observed, version, &produces);
    }
    responses.insert(metadata.response.code.clone(), current);
    op.insert("responses".into(), Value::Object(responses));

    if version == SpecVersion::OpenApi3 {
        for params in [path_item.get_mut("parameters"), op.get_mut("parameters")].into_iter().flatten() {
            if let Some(params) = params.as_array_mut() {
                params.iter_mut().for_each(upgrade::upgrade_legacy_type);
            }
        }
    }

    path_item.insert(operation.verb.as_str().into(), Value::Object(op));
    let mut paths = Map::new();
    paths.insert(metadata.path_item.template.clone(), Value::Object(path_item));
    Ok(json!({ "paths": paths }))
}

fn to_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn response_node(value: Value, version: SpecVersion, produces: &[String]) -> Value {
    let mut response = to_object(value);
    response.remove("code");
    let mut response = Value::Object(response);

    if version == SpecVersion::OpenApi3 {
        if let Some(headers) = response.get_mut("headers").and_then(Value::as_object_mut) {
            headers.values_mut().for_each(upgrade::upgrade_legacy_type);
        }
        upgrade::upgrade_response_content(&mut response, produces);
    }
    response
}

fn attach_example(response: &mut Value, observed: &ActualResponse, version: SpecVersion, produces: &[String]) {
    let Ok(body) = serde_json::from_str::<Value>(&observed.body) else {
        return;
    };

    let mut mimes: Vec<String> = produces.to_vec();
    if mimes.is_empty() {
        if let Some(content) = response.get("content").and_then(Value::as_object) {
            mimes = content.keys().cloned().collect();
        }
    }
    if mimes.is_empty() {
        mimes.push("application/json".into());
    }

    for mime in mimes.iter().filter(|m| is_json_media_type(m)) {
        match version {
            SpecVersion::OpenApi3 => {
                response["content"][mime.as_str()]["example"] = body.clone();
            }
            SpecVersion::Swagger2 => {
                response["examples"][mime.as_str()] = body.clone();
            }
        }
    }
}
