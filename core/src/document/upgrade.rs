//! # OpenAPI 3 Upgrades
//!
//! Rewrites Swagger 2.0 constructs that test metadata may still carry into
//! their OpenAPI 3 equivalents before a fragment is merged. Each rewrite of a
//! document-level key is reported as a deprecation.

use serde_json::{json, Map, Value};

const LEGACY_SCHEMA_KEYS: [&str; 4] = ["type", "format", "items", "enum"];

/// Moves a legacy `type` (with `format`, `items`, `enum`) into `schema` on a
/// parameter or header node that has no schema yet.
pub fn upgrade_legacy_type(node: &mut Value) {
    let Some(map) = node.as_object_mut() else {
        return;
    };
    if map.contains_key("schema") || !map.contains_key("type") {
        return;
    }
    if map.get("in").and_then(Value::as_str) == Some("body") {
        return;
    }

    let mut schema = Map::new();
    for key in LEGACY_SCHEMA_KEYS {
        if let Some(value) = map.remove(key) {
            schema.insert(key.to_string(), value);
        }
    }
    map.insert("schema".into(), Value::Object(schema));
}

/// Moves a response `schema` under `content[mime].schema` for every media
/// type in `mimes`. The top-level `schema` key is always removed.
pub fn upgrade_response_content(response: &mut Value, mimes: &[String]) {
    let Some(map) = response.as_object_mut() else {
        return;
    };
    let Some(schema) = map.remove("schema") else {
        return;
    };
    if mimes.is_empty() {
        return;
    }

    let content = map
        .entry("content")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(content) = content.as_object_mut() else {
        return;
    };
    for mime in mimes {
        let media = content
            .entry(mime.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(media) = media.as_object_mut() {
            media.insert("schema".into(), schema.clone());
        }
    }
}

/// Replaces `schemes`/`host`/`basePath` with `servers` when no servers are
/// declared.
pub fn upgrade_servers(doc: &mut Value) {
    let Some(map) = doc.as_object_mut() else {
        return;
    };
    if map.contains_key("servers") || !map.contains_key("schemes") {
        return;
    }
    tracing::warn!(
        "schemes, host, and basePath are replaced in OpenAPI3! Rename to array of servers[{{url}}]"
    );

    let host = map
        .remove("host")
        .and_then(|h| h.as_str().map(str::to_string))
        .unwrap_or_default();
    let base_path = map
        .remove("basePath")
        .and_then(|b| b.as_str().map(str::to_string))
        .unwrap_or_default();
    let servers: Vec<Value> = map
        .remove("schemes")
        .and_then(|s| s.as_array().cloned())
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .map(|scheme| json!({ "url": format!("{}://{}{}", scheme, host, base_path) }))
        .collect();
    map.insert("servers".into(), Value::Array(servers));
}

/// Rewrites Swagger 2.0 OAuth `flow` declarations under
/// `components.securitySchemes` into OpenAPI 3 `flows`.
pub fn upgrade_oauth(doc: &mut Value) {
    let Some(schemes) = doc
        .pointer_mut("/components/securitySchemes")
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    for (name, scheme) in schemes.iter_mut() {
        let Some(scheme) = scheme.as_object_mut() else {
            continue;
        };
        let Some(flow) = scheme.remove("flow") else {
            continue;
        };
        tracing::warn!(
            scheme = %name,
            "securityDefinitions flow is replaced in OpenAPI3! Rename to components/securitySchemes/{}/flows[]",
            name
        );

        let flow_name = match flow.as_str().unwrap_or_default() {
            "application" => "clientCredentials",
            "accessCode" => "authorizationCode",
            other => other,
        }
        .to_string();

        let mut flow_def = Map::new();
        for key in ["authorizationUrl", "tokenUrl", "refreshUrl", "scopes"] {
            if let Some(value) = scheme.remove(key) {
                flow_def.insert(key.to_string(), value);
            }
        }
        flow_def
            .entry("scopes")
            .or_insert_with(|| Value::Object(Map::new()));

        let mut flows = Map::new();
        flows.insert(flow_name, Value::Object(flow_def));
        scheme.insert("flows".into(), Value::Object(flows));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_legacy_type_moves_into_schema() {
        let mut param = json!({ "name": "ids", "in": "query", "type": "array", "items": { "type": "integer" } });
        upgrade_legacy_type(&mut param);
        assert_eq!(
            param,
            json!({ "name": "ids", "in": "query", "schema": { "type": "array", "items": { "type": "integer" } } })
        );

        let mut with_schema = json!({ "name": "q", "in": "query", "type": "string", "schema": { "type": "string" } });
        upgrade_legacy_type(&mut with_schema);
        assert_eq!(with_schema["type"], json!("string"));
    }

    #[test]
    fn test_response_schema_moves_into_content() {
        let mut response = json!({ "description": "ok", "schema": { "type": "object" } });
        upgrade_response_content(&mut response, &["application/json".into(), "application/xml".into()]);
        assert_eq!(
            response,
            json!({
                "description": "ok",
                "content": {
                    "application/json": { "schema": { "type": "object" } },
                    "application/xml": { "schema": { "type": "object" } }
                }
            })
        );

        let mut bare = json!({ "description": "ok", "schema": { "type": "object" } });
        upgrade_response_content(&mut bare, &[]);
        assert_eq!(bare, json!({ "description": "ok" }));
    }

    #[test]
    fn test_servers_from_schemes() {
        let mut doc = json!({
            "openapi": "3.0.1",
            "schemes": ["https", "http"],
            "host": "api.example.com",
            "basePath": "/v1"
        });
        upgrade_servers(&mut doc);
        assert_eq!(
            doc,
            json!({
                "openapi": "3.0.1",
                "servers": [
                    { "url": "https://api.example.com/v1" },
                    { "url": "http://api.example.com/v1" }
                ]
            })
        );
    }

    #[test]
    fn test_oauth_flow_upgraded() {
        let mut doc = json!({ "components": { "securitySchemes": { "oauth": {
            "type": "oauth2",
            "flow": "accessCode",
            "authorizationUrl": "https://auth/authorize",
            "tokenUrl": "https://auth/token",
            "scopes": { "read": "Read access" }
        } } } });
        upgrade_oauth(&mut doc);
        assert_eq!(
            doc["components"]["securitySchemes"]["oauth"],
            json!({
                "type": "oauth2",
                "flows": { "authorizationCode": {
                    "authorizationUrl": "https://auth/authorize",
                    "tokenUrl": "https://auth/token",
                    "scopes": { "read": "Read access" }
                } }
            })
        );
    }
}
