//! # HTTP Verbs
//!
//! The closed set of operation verbs an OpenAPI path item may carry.

use crate::error::AppError;
use crate::model::operation::OperationMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An HTTP verb under a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
}

impl Verb {
    /// Every verb, in the order OpenAPI lists them on a path item.
    pub const ALL: [Verb; 8] = [
        Verb::Get,
        Verb::Put,
        Verb::Post,
        Verb::Delete,
        Verb::Options,
        Verb::Head,
        Verb::Patch,
        Verb::Trace,
    ];

    /// The lowercase key used inside a path item (`"get"`, `"post"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::Head => "head",
            Verb::Options => "options",
            Verb::Trace => "trace",
        }
    }

    /// The uppercase request method (`"GET"`, `"POST"`, ...).
    pub fn method(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
            Verb::Trace => "TRACE",
        }
    }

    /// Returns true when `key` names an operation inside a path item.
    pub fn is_verb_key(key: &str) -> bool {
        Verb::ALL.iter().any(|v| v.as_str() == key)
    }

    /// Starts an operation declaration for this verb.
    pub fn operation(self, summary: impl Into<String>) -> OperationMetadata {
        OperationMetadata::new(self, summary)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::Configuration(format!("Unknown HTTP verb '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("GET".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("patch".parse::<Verb>().unwrap(), Verb::Patch);
        assert!("fetch".parse::<Verb>().is_err());
    }

    #[test]
    fn test_verb_keys() {
        assert!(Verb::is_verb_key("delete"));
        assert!(!Verb::is_verb_key("parameters"));
    }

    #[test]
    fn test_dispatch_builds_operation() {
        let op = Verb::Post.operation("Creates a blog");
        assert_eq!(op.verb, Verb::Post);
        assert_eq!(op.summary.as_deref(), Some("Creates a blog"));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Verb::Options).unwrap(), "\"options\"");
    }
}
