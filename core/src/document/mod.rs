//! # Document Assembly
//!
//! - **merge**: recursive merge of example fragments.
//! - **upgrade**: Swagger 2.0 constructs rewritten for OpenAPI 3 documents.
//! - **normalize**: `body`/`formData` parameters folded into `requestBody`.
//! - **accumulator**: the per-run `SpecContext` holding every document.
//! - **emitter**: finalization, rendering and writing.

pub mod accumulator;
pub mod emitter;
pub mod merge;
pub mod normalize;
pub mod upgrade;

pub use accumulator::{build_fragment, SpecContext};
pub use emitter::{emit_documents, finalize_document, render, write_document};
pub use merge::deep_merge;
pub use normalize::promote_request_body;
