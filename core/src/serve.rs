//! # Static Document Resolution
//!
//! Maps a request path onto a document under the configured root and
//! renders it, applying the configured filter. No HTTP server lives here;
//! a `None` result tells the caller to delegate to its next handler.

use crate::config::{is_yaml_path, Config, DocumentFilter, RequestEnv};
use crate::error::AppResult;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A rendered document and its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedDocument {
    /// Resolved file on disk.
    pub path: PathBuf,
    /// Rendered body.
    pub body: String,
    /// `application/json` or `text/yaml`.
    pub content_type: &'static str,
}

/// Serves generated documents from a root directory.
#[derive(Clone)]
pub struct SpecFiles {
    root: PathBuf,
    filter: Option<DocumentFilter>,
}

impl fmt::Debug for SpecFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecFiles")
            .field("root", &self.root)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl SpecFiles {
    /// Serves files under `root` without a filter.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: None,
        }
    }

    /// Serves the configured root with the configured filter.
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.root.clone(),
            filter: config.filter.clone(),
        }
    }

    /// Installs a filter applied to every served document.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&mut Value, &RequestEnv) + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Resolves a request path to an existing file under the root.
    ///
    /// Paths containing `..`, and paths whose canonical form escapes the
    /// root (e.g. through a symlink), resolve to `None`.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
        let relative = Path::new(decoded.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || !relative.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }

        let root = fs::canonicalize(&self.root).ok()?;
        let candidate = fs::canonicalize(root.join(relative)).ok()?;
        (candidate.starts_with(&root) && candidate.is_file()).then_some(candidate)
    }

    /// Loads, filters and renders the document a request asks for.
    ///
    /// Only `.json`, `.yaml` and `.yml` files are served.
    pub fn load(&self, env: &RequestEnv) -> AppResult<Option<ServedDocument>> {
        let Some(path) = self.resolve(&env.path) else {
            return Ok(None);
        };
        let yaml = is_yaml_path(&path);
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if !yaml && !is_json {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)?;
        let mut doc: Value = if yaml {
            serde_yaml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };
        if let Some(filter) = &self.filter {
            filter(&mut doc, env);
        }

        let (body, content_type) = if yaml {
            (serde_yaml::to_string(&doc)?, "text/yaml")
        } else {
            (serde_json::to_string_pretty(&doc)?, "application/json")
        };
        tracing::debug!(path = %path.display(), "serving document");
        Ok(Some(ServedDocument {
            path,
            body,
            content_type,
        }))
    }
}
