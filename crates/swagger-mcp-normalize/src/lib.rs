//! Specification normalization (component C1).
//!
//! Parses a raw Swagger 2.0 or OpenAPI 3.x document, resolves it against
//! `openapiv3`'s object model, and rewrites it into the project's own
//! dependency-annotated [`model::SpecificationDocument`] — a single uniform
//! shape the categorizer (C2), storage/index builder (C3), and query
//! engine (C4) can all consume regardless of which dialect the source
//! document was written in.
//!
//! The public entry point is [`pipeline::normalize`].

mod dialect;
mod endpoints;
pub mod model;
pub mod pipeline;
pub mod report;
mod schemas;
mod search_fields;
mod security;
mod swagger_convert;
mod validate;

pub use pipeline::normalize;
pub use report::{Counters, Diagnostic, Report, Severity};
