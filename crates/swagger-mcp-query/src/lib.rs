//! # swagger-mcp-query
//!
//! The query engine (component C4): turns a raw `searchEndpoints` query
//! plus structured filters into a ranked, enriched, clustered, and
//! paginated response over the weighted index `swagger-mcp-storage`
//! builds and maintains (design §4.4).
//!
//! The pipeline is a straight line — parse, normalize, expand, classify,
//! compile, filter, execute, enrich, organize, paginate, assemble,
//! cache — and each stage gets its own module so a reader can follow the
//! request through the crate top to bottom:
//!
//! 1. [`parser`] — query-language parsing (field qualifiers, booleans,
//!    exclusions, wildcards).
//! 2. [`normalize`] — stop-word removal and stemming.
//! 3. [`synonyms`] — bounded API-domain term expansion.
//! 4. [`classify`] — query-shape classification.
//! 5. [`compile`] — `tantivy` query construction.
//! 6. [`filters`] — structured filter application.
//! 7. [`engine`] — execution, enrichment, clustering, pagination,
//!    summary assembly, and the public [`engine::QueryEngine`] entry
//!    point.
//! 8. [`cache`] — the generation-keyed LRU response cache.
//! 9. [`suggest`] — low-result query-improvement suggestions.

pub mod cache;
pub mod classify;
pub mod compile;
pub mod engine;
pub mod filters;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod suggest;
pub mod synonyms;

pub use engine::{EngineSettings, QueryEngine, DEFAULT_MAX_PER_PAGE, DEFAULT_POOL_CEILING};
pub use model::{SearchFilters, SearchRequest, SearchResponse};
