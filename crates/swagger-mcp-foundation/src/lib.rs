//! # swagger-mcp-foundation
//!
//! Shared, dependency-light types used by every `swagger-mcp-server` crate:
//! the error taxonomy (§7 of the design), correlation ids for user-visible
//! failure messages, and the index generation stamp used to make search
//! index rebuilds atomic.
//!
//! This crate sits at the bottom of the workspace dependency graph; every
//! other crate in the workspace depends on it and nothing else.

mod error;
mod generation;
pub mod path_segments;

pub use error::{Error, ErrorKind, Result};
pub use generation::Generation;

use uuid::Uuid;

/// Opaque correlation id attached to every user-visible failure.
///
/// Generated once per request/ingest and threaded through logs so an
/// operator can tie a log line back to the response the caller saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Mint a new correlation id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
