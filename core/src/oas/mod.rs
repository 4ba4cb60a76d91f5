//! # OpenAPI Document Helpers
//!
//! - **version**: Swagger 2.0 / OpenAPI 3.x detection.
//! - **refs**: local `$ref` resolution for parameters and schemas.

pub mod refs;
pub mod version;

pub use refs::{resolve_parameter, resolve_pointer, resolve_schema};
pub use version::SpecVersion;
