//! Persistence and search-index building (component C3).
//!
//! Projects a [`swagger_mcp_normalize::model::SpecificationDocument`]
//! (already annotated with categories by `swagger-mcp-categorize`) into
//! two persistent artifacts, per design §4.3:
//!
//! - a relational store (SQLite via `sqlx`, WAL mode, foreign keys on,
//!   FTS5 mirrors maintained by triggers) — see [`pool`], [`migrations`],
//!   [`ingest`], [`read`];
//! - a keyword-weighted inverted index (`tantivy`) with per-field boosts,
//!   used by the query engine (C4) for `searchEndpoints` — see
//!   [`search_index`], [`model::SearchDocument`].
//!
//! [`backup`] implements the rolling `backups/` directory named in
//! design §6's persisted-state layout.

pub mod backup;
pub mod ingest;
pub mod migrations;
pub mod model;
pub mod pool;
pub mod read;
pub mod rows;
pub mod search_index;

pub use ingest::ingest_document;
pub use model::{OperationType, SearchDocument};
pub use pool::open_pool;
