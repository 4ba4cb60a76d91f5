#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use specgen_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Failures raised by the core library.
    #[display("{}", _0)]
    Core(AppError),

    /// Malformed JSON input.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// Malformed YAML input.
    #[display("YAML Error: {}", _0)]
    Yaml(serde_yaml::Error),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `General(String)` holds a `String`, which is not an `Error`, so `source()`
/// cannot be derived.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
