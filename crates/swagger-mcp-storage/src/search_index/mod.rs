//! The out-of-database keyword-weighted inverted index (design §4.3.2),
//! separate from the in-database FTS5 mirrors in [`crate::migrations`].
//!
//! - [`schema`] declares the `tantivy` field schema and per-field weights.
//! - [`builder`] writes a generation's worth of [`crate::model::SearchDocument`]s.
//! - [`directory`] manages the `<generation>/` directories and the
//!   `current` symlink atomic swap.
//! - [`reader`] opens a built generation for query-time search.

pub mod builder;
pub mod directory;
pub mod reader;
pub mod schema;

pub use builder::{build_index, BuildStats, DEFAULT_BATCH_SIZE};
pub use reader::{extract_search_document, SearchIndexHandle};
