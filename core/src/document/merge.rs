//! # Deep Merge
//!
//! Objects merge key by key, recursively. Any other value (scalar or array)
//! is replaced by the incoming one; arrays are never concatenated.

use serde_json::{Map, Value};

/// Merges `incoming` into `base` in place.
pub fn deep_merge(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_obj), Value::Object(incoming_obj)) => merge_objects(base_obj, incoming_obj),
        (base, incoming) => *base = incoming.clone(),
    }
}

fn merge_objects(base: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, incoming_val) in incoming {
        match base.get_mut(key) {
            Some(base_val) => deep_merge(base_val, incoming_val),
            None => {
                base.insert(key.clone(), incoming_val.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_sibling_keys_survive() {
        let mut doc = json!({ "paths": { "/blogs": { "get": { "summary": "List" } } } });
        deep_merge(
            &mut doc,
            &json!({ "paths": { "/blogs": { "post": { "summary": "Create" } } } }),
        );
        assert_eq!(
            doc,
            json!({ "paths": { "/blogs": {
                "get": { "summary": "List" },
                "post": { "summary": "Create" }
            } } })
        );
    }

    #[test]
    fn test_arrays_replaced_not_concatenated() {
        let mut doc = json!({ "tags": ["a", "b"], "info": { "version": "1" } });
        deep_merge(&mut doc, &json!({ "tags": ["c"], "info": { "version": "2" } }));
        assert_eq!(doc, json!({ "tags": ["c"], "info": { "version": "2" } }));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let fragment = json!({
            "paths": { "/blogs/{id}": { "get": {
                "parameters": [{ "name": "id", "in": "path" }],
                "responses": { "200": { "description": "ok" } }
            } } }
        });
        let mut once = json!({ "openapi": "3.0.1", "paths": {} });
        deep_merge(&mut once, &fragment);
        let mut twice = once.clone();
        deep_merge(&mut twice, &fragment);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_type_change_replaces() {
        let mut doc = json!({ "example": { "a": 1 } });
        deep_merge(&mut doc, &json!({ "example": "text" }));
        assert_eq!(doc, json!({ "example": "text" }));
    }
}
