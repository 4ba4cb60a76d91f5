//! # Configuration
//!
//! Where documents are written, what they start from, how they are rendered
//! and how strictly payloads are validated.
//!
//! `ConfigFile` is the raw, all-optional shape read from JSON or YAML;
//! `ConfigFile::resolve` turns it into a checked `Config`. Renamed
//! `swagger_*` keys are still accepted with a deprecation warning.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable overriding the dry-run flag (`"0"` disables it).
pub const DRY_RUN_ENV: &str = "SPECGEN_DRY_RUN";

/// Rendering of emitted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(AppError::Configuration(format!("Unknown openapi_format '{}'", s))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

/// The request a served document is being rendered for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestEnv {
    /// Request path, e.g. `/v1/openapi.json`.
    pub path: String,
    /// Request headers.
    pub headers: IndexMap<String, String>,
}

impl RequestEnv {
    /// Creates an environment for `path` with no headers.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: IndexMap::new(),
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Rewrites a document before it is served, e.g. to set `host` from the
/// request or redact internal paths.
pub type DocumentFilter = Arc<dyn Fn(&mut Value, &RequestEnv) + Send + Sync>;

/// Checked configuration.
#[derive(Clone)]
pub struct Config {
    /// Directory documents are written to and served from.
    pub root: PathBuf,
    /// Document name (relative path) to initial document, in declaration order.
    pub specs: IndexMap<String, Value>,
    /// Output rendering.
    pub format: OutputFormat,
    /// Skip writing documents.
    pub dry_run: bool,
    /// Legacy flag implying both validation options below.
    pub strict_schema_validation: bool,
    /// Force every schema property into `required` during validation.
    pub all_properties_required: bool,
    /// Reject properties a schema does not declare during validation.
    pub no_additional_properties: bool,
    /// Optional served-document rewrite.
    pub filter: Option<DocumentFilter>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("root", &self.root)
            .field("specs", &self.specs.keys().collect::<Vec<_>>())
            .field("format", &self.format)
            .field("dry_run", &self.dry_run)
            .field("strict_schema_validation", &self.strict_schema_validation)
            .field("all_properties_required", &self.all_properties_required)
            .field("no_additional_properties", &self.no_additional_properties)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Config {
    /// Creates a configuration writing JSON documents under `root`.
    ///
    /// # Errors
    ///
    /// `Configuration` when `specs` is empty.
    pub fn new(root: impl Into<PathBuf>, specs: IndexMap<String, Value>) -> AppResult<Self> {
        if specs.is_empty() {
            return Err(AppError::Configuration("No openapi_specs defined".into()));
        }
        Ok(Self {
            root: root.into(),
            specs,
            format: OutputFormat::Json,
            dry_run: false,
            strict_schema_validation: false,
            all_properties_required: false,
            no_additional_properties: false,
            filter: None,
        })
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the dry-run flag.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the legacy strict flag.
    pub fn with_strict_schema_validation(mut self, strict: bool) -> Self {
        self.strict_schema_validation = strict;
        self
    }

    /// Sets the all-properties-required option.
    pub fn with_all_properties_required(mut self, value: bool) -> Self {
        self.all_properties_required = value;
        self
    }

    /// Sets the no-additional-properties option.
    pub fn with_no_additional_properties(mut self, value: bool) -> Self {
        self.no_additional_properties = value;
        self
    }

    /// Installs a served-document filter.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&mut Value, &RequestEnv) + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Loads a JSON or YAML configuration file (by extension).
    ///
    /// A relative `openapi_root` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path)?;
        let file: ConfigFile = if is_yaml_path(path) {
            serde_yaml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };

        let mut config = file.resolve()?;
        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Resolves a document name; `None` selects the first configured document.
    pub fn document_name<'a>(&'a self, name: Option<&'a str>) -> AppResult<&'a str> {
        match name {
            Some(name) if self.specs.contains_key(name) => Ok(name),
            Some(name) => Err(AppError::Configuration(format!(
                "Unknown openapi_spec '{}'",
                name
            ))),
            None => self
                .specs
                .keys()
                .next()
                .map(String::as_str)
                .ok_or_else(|| AppError::Configuration("No openapi_specs defined".into())),
        }
    }
}

/// True for `.yaml` / `.yml` paths.
pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("yaml" | "yml")
    )
}

/// Interprets the dry-run environment override.
pub fn parse_dry_run_env(value: &str) -> bool {
    value != "0"
}

/// Raw configuration as written in a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Output directory.
    pub openapi_root: Option<PathBuf>,
    /// Document name to initial document.
    pub openapi_specs: Option<IndexMap<String, Value>>,
    /// `json` or `yaml`.
    pub openapi_format: Option<String>,
    /// Skip writing documents.
    pub openapi_dry_run: Option<bool>,
    /// Legacy strict flag.
    pub openapi_strict_schema_validation: Option<bool>,
    /// Force every schema property into `required`.
    pub openapi_all_properties_required: Option<bool>,
    /// Reject undeclared properties.
    pub openapi_no_additional_properties: Option<bool>,
    /// Renamed to `openapi_root`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger_root: Option<PathBuf>,
    /// Renamed to `openapi_specs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger_docs: Option<IndexMap<String, Value>>,
    /// Renamed to `openapi_format`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger_format: Option<String>,
    /// Renamed to `openapi_dry_run`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger_dry_run: Option<bool>,
    /// Renamed to `openapi_strict_schema_validation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger_strict_schema_validation: Option<bool>,
}

fn renamed<T>(current: Option<T>, legacy: Option<T>, old: &str, new: &str) -> Option<T> {
    if legacy.is_some() {
        tracing::warn!("{} is deprecated and will be removed; rename it to {}", old, new);
    }
    current.or(legacy)
}

impl ConfigFile {
    /// Checks required keys and applies the dry-run environment override.
    ///
    /// # Errors
    ///
    /// `Configuration` for a missing root, a missing or empty document map,
    /// or an unknown format.
    pub fn resolve(self) -> AppResult<Config> {
        let env_dry_run = std::env::var(DRY_RUN_ENV).ok();
        self.resolve_with_env(env_dry_run.as_deref())
    }

    fn resolve_with_env(self, env_dry_run: Option<&str>) -> AppResult<Config> {
        let root = renamed(self.openapi_root, self.swagger_root, "swagger_root", "openapi_root")
            .ok_or_else(|| AppError::Configuration("No openapi_root provided".into()))?;
        let specs = renamed(self.openapi_specs, self.swagger_docs, "swagger_docs", "openapi_specs")
            .unwrap_or_default();
        let format = renamed(
            self.openapi_format,
            self.swagger_format,
            "swagger_format",
            "openapi_format",
        )
        .map(|f| f.parse::<OutputFormat>())
        .transpose()?
        .unwrap_or_default();
        let dry_run = renamed(
            self.openapi_dry_run,
            self.swagger_dry_run,
            "swagger_dry_run",
            "openapi_dry_run",
        );
        let dry_run = match env_dry_run {
            Some(value) => parse_dry_run_env(value),
            None => dry_run.unwrap_or(false),
        };
        let strict = renamed(
            self.openapi_strict_schema_validation,
            self.swagger_strict_schema_validation,
            "swagger_strict_schema_validation",
            "openapi_strict_schema_validation",
        )
        .unwrap_or(false);

        Ok(Config::new(root, specs)?
            .with_format(format)
            .with_dry_run(dry_run)
            .with_strict_schema_validation(strict)
            .with_all_properties_required(self.openapi_all_properties_required.unwrap_or(false))
            .with_no_additional_properties(self.openapi_no_additional_properties.unwrap_or(false)))
    }
}
