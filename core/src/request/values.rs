//! # Bound Example Values
//!
//! The request builder never assumes how the calling test binds values to
//! names; it only asks a `ValueSource`.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Name to value lookup supplied by the calling test.
pub trait ValueSource {
    /// Returns the value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<Value>;

    /// True when `name` is bound.
    fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl ValueSource for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl ValueSource for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl ValueSource for IndexMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl ValueSource for Map<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// A JSON object used as a value source; non-objects bind nothing.
impl ValueSource for Value {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }

    fn has(&self, name: &str) -> bool {
        (**self).has(name)
    }
}

/// Wraps a closure as a value source.
pub struct FnSource<F>(pub F);

impl<F> ValueSource for FnSource<F>
where
    F: Fn(&str) -> Option<Value>,
{
    fn lookup(&self, name: &str) -> Option<Value> {
        (self.0)(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_source() {
        let values = json!({ "id": 42, "q": null });
        assert_eq!(values.lookup("id"), Some(json!(42)));
        assert!(values.has("q"));
        assert!(!values.has("missing"));
    }

    #[test]
    fn test_closure_source() {
        let source = FnSource(|name: &str| (name == "token").then(|| json!("abc")));
        assert_eq!(source.lookup("token"), Some(json!("abc")));
        assert!(!source.has("other"));
    }
}
