//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Configuration and reference errors are fatal for the current request build.
//! `UnexpectedRequest`, `UnexpectedResponse` and `Discriminator` are assertion
//! failures meant to be surfaced by the calling test runner.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors (unwritable output directory, unreadable files).
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Required configuration is missing or malformed.
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Configuration(String),

    /// A `$ref` does not resolve against the document.
    #[from(ignore)]
    #[display("Missing Reference: {_0}")]
    MissingReference(String),

    /// A required parameter has no bound example value.
    #[from(ignore)]
    #[display("Missing Value: {_0}")]
    MissingValue(String),

    /// A schema fragment could not be compiled for validation.
    #[from(ignore)]
    #[display("Invalid Schema: {_0}")]
    InvalidSchema(String),

    /// The request payload does not satisfy its declared schema.
    #[from(ignore)]
    #[display("Unexpected Request: {_0}")]
    UnexpectedRequest(String),

    /// The response code, headers or body do not match expectations.
    #[from(ignore)]
    #[display("Unexpected Response: {_0}")]
    UnexpectedResponse(String),

    /// A discriminated `oneOf` could not select a branch.
    #[from(ignore)]
    #[display("Discriminator Mismatch: {_0}")]
    Discriminator(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Returns true for failures that should be reported as failed assertions
    /// rather than broken configuration.
    pub fn is_assertion_failure(&self) -> bool {
        matches!(
            self,
            AppError::UnexpectedRequest(_)
                | AppError::UnexpectedResponse(_)
                | AppError::Discriminator(_)
        )
    }
}
