//! # Request Construction
//!
//! - **values**: the `ValueSource` capability bound example values come from.
//! - **query**: OAS 3.x / Swagger 2.0 query string serialization.
//! - **builder**: parameter expansion, path interpolation, headers and payload.

pub mod builder;
pub mod query;
pub mod values;

pub use builder::{build_request, expand_parameters, BuiltRequest, RequestPayload};
pub use query::serialize_query_param;
pub use values::{FnSource, ValueSource};
