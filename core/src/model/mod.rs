//! # Metadata Model
//!
//! Typed representation of what the test declarations produce:
//! - **verb**: the closed set of HTTP verbs.
//! - **parameter**: parameter definitions and `$ref` entries.
//! - **response**: expected responses and headers.
//! - **operation**: one verb under one path.
//! - **path_item**: a path template with inherited parameters.
//! - **example**: the per-example-group bundle and its observed response.
//!
//! Vendor extensions (`x-...`) are preserved in a passthrough bag on every node.

pub mod example;
pub mod operation;
pub mod parameter;
pub mod path_item;
pub mod response;
pub mod verb;

pub use example::{ActualResponse, ExampleMetadata, ExampleRunResult};
pub use operation::{OperationMetadata, RequestExample, SecurityRequirement};
pub use parameter::{CollectionFormat, ParameterDef, ParameterIn, ParameterStyle, RefOr};
pub use path_item::PathItem;
pub use response::{HeaderDef, ResponseDef};
pub use verb::Verb;
