//! # Schema Validation
//!
//! Validates a JSON payload against a schema fragment of a document.
//!
//! The fragment is wrapped into a root that also carries the document's
//! `components` (or `definitions`) so local `$ref`s resolve, then rewritten
//! into plain Draft 7 before compiling with `jsonschema`:
//!
//! * `nullable` / `x-nullable` become a `null` type union (or `anyOf`).
//! * Boolean `exclusiveMinimum` / `exclusiveMaximum` become numeric bounds.
//! * Discriminated `oneOf` becomes one `if`/`then` clause per known value.
//! * The strictness options add `required` and `additionalProperties: false`
//!   to every object schema declaring `properties`.
//!
//! A lockstep walk over schema and payload runs first so a missing
//! discriminator property, or a value that selects no schema, is reported
//! as a `Discriminator` error instead of a generic mismatch.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::example::ExampleMetadata;
use crate::oas::refs::{resolve_pointer, resolve_schema};
use crate::oas::SpecVersion;
use jsonschema::Draft;
use serde_json::{json, Map, Value};

const MAX_WALK_DEPTH: usize = 64;

/// Strictness applied on top of the declared schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Every declared property becomes required.
    pub all_properties_required: bool,
    /// Properties not declared by the schema are rejected.
    pub no_additional_properties: bool,
}

impl ValidationOptions {
    /// Per-test overrides win over the configuration. The legacy strict flag
    /// (either source) implies both options and is reported as deprecated.
    pub fn resolve(config: &Config, metadata: &ExampleMetadata) -> Self {
        let strict = metadata
            .strict_schema_validation
            .unwrap_or(config.strict_schema_validation);
        if strict {
            tracing::warn!(
                "strict schema validation is deprecated; use openapi_all_properties_required and openapi_no_additional_properties"
            );
        }

        Self {
            all_properties_required: strict
                || metadata
                    .all_properties_required
                    .unwrap_or(config.all_properties_required),
            no_additional_properties: strict
                || metadata
                    .no_additional_properties
                    .unwrap_or(config.no_additional_properties),
        }
    }
}

/// Validates `instance` against `schema` in the context of `doc`.
///
/// Returns one `- <path>: <message>` line per violation; an empty list
/// means the payload is valid.
///
/// # Errors
///
/// * `Discriminator` when a discriminated `oneOf` cannot select a branch.
/// * `MissingReference` when a `$ref` met during the walk does not resolve.
/// * `InvalidSchema` when the prepared schema does not compile.
pub fn validate_against(
    doc: &Value,
    schema: &Value,
    instance: &Value,
    options: ValidationOptions,
) -> AppResult<Vec<String>> {
    let version = SpecVersion::of(doc)?;
    check_discriminators(doc, schema, instance, version, "", 0)?;

    let root = prepare_schema(doc, schema, version, options);
    let validator = jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&root)
        .map_err(|e| AppError::InvalidSchema(e.to_string()))?;

    Ok(validator
        .iter_errors(instance)
        .map(|err| format!("- {}: {}", err.instance_path, err))
        .collect())
}

/// Builds the rewritten Draft 7 root for `schema`.
pub fn prepare_schema(
    doc: &Value,
    schema: &Value,
    version: SpecVersion,
    options: ValidationOptions,
) -> Value {
    let mut root = Map::new();
    root.insert("allOf".into(), json!([schema]));

    match (version, doc.get("components"), doc.get("definitions")) {
        (SpecVersion::OpenApi3, Some(components), _) => {
            root.insert("components".into(), components.clone());
        }
        (SpecVersion::OpenApi3, None, Some(definitions)) => {
            tracing::warn!("definitions is replaced in OpenAPI3! Rename to components/schemas");
            root.insert("definitions".into(), definitions.clone());
        }
        (SpecVersion::Swagger2, _, Some(definitions)) => {
            root.insert("definitions".into(), definitions.clone());
        }
        _ => {}
    }

    let rewriter = Rewriter {
        names: schema_names(doc, version),
        prefix: version.schema_ref_prefix(),
        options,
    };

    let mut root = Value::Object(root);
    if let Some(all_of) = root.get_mut("allOf") {
        rewriter.children(all_of);
    }
    for pointer in ["/components/schemas", "/definitions"] {
        if let Some(Value::Object(schemas)) = root.pointer_mut(pointer) {
            for node in schemas.values_mut() {
                rewriter.node(node);
            }
        }
    }
    root
}

fn schema_names(doc: &Value, version: SpecVersion) -> Vec<String> {
    let registry = match version {
        SpecVersion::OpenApi3 => doc
            .pointer("/components/schemas")
            .or_else(|| doc.get("definitions")),
        SpecVersion::Swagger2 => doc.get("definitions"),
    };
    registry
        .and_then(Value::as_object)
        .map(|schemas| {
            schemas
                .iter()
                .filter(|(_, schema)| !is_discriminated(schema))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Discriminated containers never select themselves.
fn is_discriminated(schema: &Value) -> bool {
    schema
        .as_object()
        .is_some_and(|map| discriminator_property(map).is_some() && map.contains_key("oneOf"))
}

struct Rewriter {
    names: Vec<String>,
    prefix: &'static str,
    options: ValidationOptions,
}

impl Rewriter {
    fn node(&self, value: &mut Value) {
        if let Value::Object(map) = value {
            self.expand_discriminator(map);
            normalize_exclusive_bounds(map);
            self.apply_strictness(map);
            if let Some(replacement) = apply_nullable_flag(map) {
                *value = replacement;
            }
        }
        self.children(value);
    }

    fn children(&self, value: &mut Value) {
        match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.node(item);
                }
            }
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    match key.as_str() {
                        "properties" | "patternProperties" => {
                            if let Value::Object(props) = child {
                                for prop in props.values_mut() {
                                    self.node(prop);
                                }
                            }
                        }
                        "allOf" | "anyOf" | "oneOf" => {
                            if let Value::Array(items) = child {
                                for item in items.iter_mut() {
                                    self.node(item);
                                }
                            }
                        }
                        "items" | "then" | "else" | "not" => self.node(child),
                        "additionalProperties" if child.is_object() => self.node(child),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn expand_discriminator(&self, map: &mut Map<String, Value>) {
        let Some(property) = discriminator_property(map).map(str::to_string) else {
            return;
        };
        let Some(Value::Array(branches)) = map.remove("oneOf") else {
            return;
        };

        let mut targets: Vec<(String, String)> = Vec::new();
        if let Some(mapping) = map
            .get("discriminator")
            .and_then(|d| d.get("mapping"))
            .and_then(Value::as_object)
        {
            for (value, target) in mapping {
                if let Some(target) = target.as_str() {
                    targets.push((value.clone(), target.to_string()));
                }
            }
        }
        let implicit = self.names.iter().map(|n| (n.clone(), format!("{}{}", self.prefix, n)));
        let branch_refs = branches
            .iter()
            .filter_map(|b| b.get("$ref").and_then(Value::as_str))
            .filter_map(|r| r.rsplit('/').next().map(|name| (name.to_string(), r.to_string())));
        for (value, target) in implicit.chain(branch_refs) {
            if !targets.iter().any(|(v, _)| *v == value) {
                targets.push((value, target));
            }
        }

        let clauses: Vec<Value> = targets
            .into_iter()
            .map(|(value, target)| {
                json!({
                    "if": {
                        "properties": { property.as_str(): { "const": value } },
                        "required": [property.as_str()]
                    },
                    "then": { "$ref": target }
                })
            })
            .collect();

        let required = map.entry("required").or_insert_with(|| json!([]));
        if let Some(list) = required.as_array_mut() {
            if !list.iter().any(|v| v.as_str() == Some(property.as_str())) {
                list.push(Value::String(property.clone()));
            }
        }
        let all_of = map.entry("allOf").or_insert_with(|| json!([]));
        if let Some(list) = all_of.as_array_mut() {
            list.extend(clauses);
        }
    }

    fn apply_strictness(&self, map: &mut Map<String, Value>) {
        let Some(keys) = map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().map(Value::String).collect::<Vec<_>>())
        else {
            return;
        };

        if self.options.all_properties_required {
            map.insert("required".into(), Value::Array(keys));
        }
        if self.options.no_additional_properties {
            map.entry("additionalProperties")
                .or_insert(Value::Bool(false));
        }
    }
}

fn discriminator_property(map: &Map<String, Value>) -> Option<&str> {
    map.get("discriminator")
        .and_then(|d| d.get("propertyName"))
        .and_then(Value::as_str)
}

fn normalize_exclusive_bounds(map: &mut Map<String, Value>) {
    for (flag, bound) in [("exclusiveMinimum", "minimum"), ("exclusiveMaximum", "maximum")] {
        match map.get(flag).and_then(Value::as_bool) {
            Some(true) => {
                if let Some(limit) = map.remove(bound) {
                    map.insert(flag.to_string(), limit);
                } else {
                    map.remove(flag);
                }
            }
            Some(false) => {
                map.remove(flag);
            }
            _ => {}
        }
    }
}

/// Rewrites `nullable` / `x-nullable` into a `null` type union, or wraps the
/// schema in `anyOf` with `{type: null}` when it declares no `type`.
fn apply_nullable_flag(map: &mut Map<String, Value>) -> Option<Value> {
    let nullable = ["nullable", "x-nullable"]
        .iter()
        .any(|flag| map.get(*flag).and_then(Value::as_bool).unwrap_or(false));
    map.remove("nullable");
    map.remove("x-nullable");
    if !nullable {
        return None;
    }

    if let Some(type_val) = map.get_mut("type") {
        match type_val {
            Value::String(s) if s != "null" => {
                *type_val = json!([s.clone(), "null"]);
            }
            Value::Array(arr) if !arr.iter().any(|v| v.as_str() == Some("null")) => {
                arr.push(Value::String("null".into()));
            }
            _ => {}
        }
        if let Some(Value::Array(values)) = map.get_mut("enum") {
            if !values.contains(&Value::Null) {
                values.push(Value::Null);
            }
        }
        return None;
    }

    let original = Value::Object(map.clone());
    Some(json!({ "anyOf": [original, { "type": "null" }] }))
}

/// Walks schema and payload together and checks every discriminated
/// `oneOf` can select a schema.
fn check_discriminators(
    doc: &Value,
    schema: &Value,
    instance: &Value,
    version: SpecVersion,
    path: &str,
    depth: usize,
) -> AppResult<()> {
    if depth > MAX_WALK_DEPTH {
        return Ok(());
    }
    let schema = resolve_schema(doc, schema)?;
    let Value::Object(map) = schema else {
        return Ok(());
    };
    let recurse = |sub: &Value, inst: &Value, sub_path: &str| {
        check_discriminators(doc, sub, inst, version, sub_path, depth + 1)
    };

    // Non-object payloads are left to the compiled schema (e.g. a nullable ref).
    if let (Some(property), true, true) = (
        discriminator_property(map),
        map.contains_key("oneOf"),
        instance.is_object(),
    ) {
        let location = if path.is_empty() { "/" } else { path };
        let value = instance.get(property).ok_or_else(|| {
            AppError::Discriminator(format!(
                "Expected discriminator property '{}' to be present at '{}'",
                property, location
            ))
        })?;
        let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());

        let target = map
            .get("discriminator")
            .and_then(|d| d.get("mapping"))
            .and_then(|m| m.get(&value))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}{}", version.schema_ref_prefix(), value));
        let selected = resolve_pointer(doc, &target).ok_or_else(|| {
            AppError::Discriminator(format!(
                "No schema found for discriminator '{}' value '{}' at '{}' (looked for '{}')",
                property, value, location, target
            ))
        })?;
        recurse(selected, instance, path)?;
    }

    if let Some(all_of) = map.get("allOf").and_then(Value::as_array) {
        for sub in all_of {
            recurse(sub, instance, path)?;
        }
    }

    match instance {
        Value::Object(fields) => {
            let properties = map.get("properties").and_then(Value::as_object);
            for (key, field) in fields {
                let sub_path = format!("{}/{}", path, key);
                match properties.and_then(|p| p.get(key)) {
                    Some(sub) => recurse(sub, field, &sub_path)?,
                    None => {
                        if let Some(additional) = map.get("additionalProperties").filter(|a| a.is_object()) {
                            recurse(additional, field, &sub_path)?;
                        }
                    }
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = map.get("items").filter(|i| i.is_object()) {
                for (index, item) in items.iter().enumerate() {
                    recurse(item_schema, item, &format!("{}/{}", path, index))?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn pets_doc() -> Value {
        json!({
            "openapi": "3.0.1",
            "components": { "schemas": {
                "Pet": {
                    "oneOf": [{ "$ref": "#/components/schemas/Cat" }],
                    "discriminator": {
                        "propertyName": "kind",
                        "mapping": { "cat": "#/components/schemas/Cat" }
                    }
                },
                "Cat": {
                    "type": "object",
                    "properties": { "kind": { "type": "string" }, "lives": { "type": "integer" } },
                    "required": ["kind", "lives"]
                }
            } }
        })
    }

    fn pet_ref() -> Value {
        json!({ "$ref": "#/components/schemas/Pet" })
    }

    #[test]
    fn test_discriminator_selects_mapped_schema() {
        let doc = pets_doc();
        let ok = validate_against(&doc, &pet_ref(), &json!({ "kind": "cat", "lives": 9 }), Default::default())
            .unwrap();
        assert!(ok.is_empty(), "{:?}", ok);

        let errors = validate_against(&doc, &pet_ref(), &json!({ "kind": "cat", "lives": "nine" }), Default::default())
            .unwrap();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_discriminator_unknown_value_fails() {
        let err = validate_against(&pets_doc(), &pet_ref(), &json!({ "kind": "dog" }), Default::default())
            .unwrap_err();
        match err {
            AppError::Discriminator(msg) => {
                assert!(msg.contains("'kind'"), "{}", msg);
                assert!(msg.contains("'dog'"), "{}", msg);
                assert!(msg.contains("#/components/schemas/dog"), "{}", msg);
            }
            other => panic!("expected discriminator error, got {other}"),
        }
    }

    #[test]
    fn test_discriminator_missing_property_fails() {
        let err = validate_against(&pets_doc(), &pet_ref(), &json!({ "lives": 1 }), Default::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Discriminator(msg) if msg.contains("to be present")));
    }

    #[test]
    fn test_discriminator_inside_array_items() {
        let schema = json!({ "type": "array", "items": { "$ref": "#/components/schemas/Pet" } });
        let err = validate_against(&pets_doc(), &schema, &json!([{ "kind": "cat", "lives": 1 }, {}]), Default::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Discriminator(msg) if msg.contains("'/1'")));
    }

    #[test]
    fn test_discriminator_without_mapping_selects_named_schema() {
        let doc = json!({
            "openapi": "3.0.1",
            "components": { "schemas": {
                "Animal": {
                    "oneOf": [{ "$ref": "#/components/schemas/Dog" }],
                    "discriminator": { "propertyName": "kind" }
                },
                "Dog": {
                    "type": "object",
                    "properties": { "kind": { "type": "string" }, "bark": { "type": "string" } },
                    "required": ["kind", "bark"]
                }
            } }
        });
        let schema = json!({ "$ref": "#/components/schemas/Animal" });

        let ok = validate_against(&doc, &schema, &json!({ "kind": "Dog", "bark": "woof" }), Default::default())
            .unwrap();
        assert!(ok.is_empty(), "{:?}", ok);

        let errors = validate_against(&doc, &schema, &json!({ "kind": "Dog" }), Default::default()).unwrap();
        assert!(errors.iter().any(|e| e.contains("bark")), "{:?}", errors);
    }

    #[test]
    fn test_nullable_discriminated_property_accepts_null() {
        let doc = pets_doc();
        let schema = json!({
            "type": "object",
            "properties": { "pet": { "allOf": [pet_ref()], "nullable": true } }
        });

        let errors = validate_against(&doc, &schema, &json!({ "pet": null }), Default::default()).unwrap();
        assert!(errors.is_empty(), "{:?}", errors);

        let err = validate_against(&doc, &schema, &json!({ "pet": { "lives": 1 } }), Default::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Discriminator(msg) if msg.contains("'/pet'")));
    }

    #[test]
    fn test_x_nullable_accepts_null() {
        let doc = json!({ "swagger": "2.0" });
        let nullable = json!({ "type": "string", "x-nullable": true });
        assert!(validate_against(&doc, &nullable, &Value::Null, Default::default())
            .unwrap()
            .is_empty());

        let plain = json!({ "type": "string" });
        assert!(!validate_against(&doc, &plain, &Value::Null, Default::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_nullable_ref_wrapped_in_any_of() {
        let doc = json!({
            "openapi": "3.0.1",
            "components": { "schemas": { "blog": { "type": "object" } } }
        });
        let schema = json!({ "$ref": "#/components/schemas/blog", "nullable": true });
        assert!(validate_against(&doc, &schema, &Value::Null, Default::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_strictness_options() {
        let doc = json!({ "openapi": "3.0.1" });
        let schema = json!({
            "type": "object",
            "properties": { "id": { "type": "integer" }, "title": { "type": "string" } }
        });

        let relaxed = validate_against(&doc, &schema, &json!({ "id": 1, "extra": true }), Default::default())
            .unwrap();
        assert!(relaxed.is_empty());

        let all_required = ValidationOptions { all_properties_required: true, ..Default::default() };
        assert!(!validate_against(&doc, &schema, &json!({ "id": 1 }), all_required)
            .unwrap()
            .is_empty());

        let closed = ValidationOptions { no_additional_properties: true, ..Default::default() };
        assert!(!validate_against(&doc, &schema, &json!({ "id": 1, "extra": true }), closed)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_definitions_fallback_under_openapi3() {
        let doc = json!({
            "openapi": "3.0.1",
            "definitions": { "blog": { "type": "object", "required": ["title"] } }
        });
        let schema = json!({ "$ref": "#/definitions/blog" });
        assert!(!validate_against(&doc, &schema, &json!({}), Default::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_boolean_exclusive_bounds() {
        let doc = json!({ "swagger": "2.0" });
        let schema = json!({ "type": "integer", "minimum": 0, "exclusiveMinimum": true });
        assert!(!validate_against(&doc, &schema, &json!(0), Default::default()).unwrap().is_empty());
        assert!(validate_against(&doc, &schema, &json!(1), Default::default()).unwrap().is_empty());
    }

    #[test]
    fn test_options_resolution() {
        let mut specs = IndexMap::new();
        specs.insert("v1/openapi.json".to_string(), json!({ "openapi": "3.0.1" }));
        let config = Config::new("docs", specs).unwrap().with_no_additional_properties(true);

        let metadata = ExampleMetadata::new(
            crate::model::path_item::PathItem::new("/blogs"),
            crate::model::verb::Verb::Get.operation("List"),
            crate::model::response::ResponseDef::new("200", "ok"),
        );
        assert_eq!(
            ValidationOptions::resolve(&config, &metadata),
            ValidationOptions { all_properties_required: false, no_additional_properties: true }
        );

        let overridden = metadata.clone().no_additional_properties(false);
        assert_eq!(ValidationOptions::resolve(&config, &overridden), ValidationOptions::default());

        let strict = metadata.strict_schema_validation(true);
        assert_eq!(
            ValidationOptions::resolve(&config, &strict),
            ValidationOptions { all_properties_required: true, no_additional_properties: true }
        );
    }
}
