//! # Payload Validation
//!
//! - **schema**: schema preparation and `jsonschema` compilation.
//! - **request**: request payload checks before sending.
//! - **response**: status code, header and body checks after receiving.

pub mod request;
pub mod response;
pub mod schema;

pub use request::{request_schema, validate_request};
pub use response::validate_response;
pub use schema::{validate_against, ValidationOptions};
