//! `sqlx::FromRow` row types mirroring the relational schema (design
//! §4.3.1). These are the read-side counterpart to [`crate::ingest`]'s
//! writes — JSON-typed columns are read back as raw strings and
//! deserialized by the caller, the same "typed columns + JSON blobs for
//! nested structure" split the migration uses.

use sqlx::FromRow;

/// One row of the `apis` table.
#[derive(Debug, Clone, FromRow)]
pub struct ApiRow {
    /// Primary key.
    pub id: i64,
    /// `info.title`.
    pub title: String,
    /// `info.version`.
    pub version: String,
    /// Spec dialect string (`2.0`, `3.0.x`, `3.1.x`).
    pub dialect: String,
    /// `info.description`.
    pub description: Option<String>,
    /// SHA-256 content hash, unique.
    pub content_hash: String,
    /// Source file path, if loaded from disk.
    pub source_file_path: Option<String>,
    /// Source byte size.
    pub byte_size: i64,
    /// Index generation stamp active for this api row.
    pub generation: i64,
    /// Ingest timestamp (RFC3339 string).
    pub ingested_at: String,
    /// JSON array of `{url, description, variables}` servers, in
    /// document order; `"[]"` when the source declared none.
    pub servers_json: String,
}

/// One row of the `endpoints` table.
#[derive(Debug, Clone, FromRow)]
pub struct EndpointRow {
    /// Primary key.
    pub id: i64,
    /// Owning api row.
    pub api_id: i64,
    /// Path template.
    pub path: String,
    /// Uppercase HTTP method.
    pub method: String,
    /// `operationId` (declared or synthesized).
    pub operation_id: String,
    /// Whether `operation_id` was synthesized.
    pub operation_id_synthesized: bool,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// JSON array of tags.
    pub tags_json: String,
    /// JSON array of parameters.
    pub parameters_json: String,
    /// JSON request body, if any.
    pub request_body_json: Option<String>,
    /// JSON status-code -> response map.
    pub responses_json: String,
    /// JSON security requirement list.
    pub security_json: String,
    /// `deprecated` flag.
    pub deprecated: bool,
    /// JSON `x-*` extensions map.
    pub extensions_json: String,
    /// Category key assigned by C2.
    pub category: Option<String>,
    /// Category group assigned by C2.
    pub category_group: Option<String>,
    /// Concatenated free-text search field.
    pub searchable_text: String,
}

/// One row of the `schemas` table.
#[derive(Debug, Clone, FromRow)]
pub struct SchemaRow {
    /// Primary key.
    pub id: i64,
    /// Owning api row.
    pub api_id: i64,
    /// Schema name, unique within `api_id`.
    pub name: String,
    /// JSON-Schema type tag, if scalar.
    pub schema_type: Option<String>,
    /// JSON-serialized full normalized schema.
    pub definition_json: String,
    /// Whether a reference cycle was detected rooted at this schema.
    pub has_cycle: bool,
    /// Number of distinct entities naming this schema.
    pub reference_count: i64,
    /// Concatenated free-text search field.
    pub searchable_text: String,
}

/// One row of the `security_schemes` table.
#[derive(Debug, Clone, FromRow)]
pub struct SecuritySchemeRow {
    /// Primary key.
    pub id: i64,
    /// Owning api row.
    pub api_id: i64,
    /// Scheme name, unique within `api_id`.
    pub name: String,
    /// Scheme kind (`apiKey`, `http`, `oauth2`, `openIdConnect`, `mutualTLS`).
    pub scheme_type: String,
    /// JSON-serialized full scheme definition.
    pub definition_json: String,
}

/// One row of the `endpoint_categories` table.
#[derive(Debug, Clone, FromRow)]
pub struct EndpointCategoryRow {
    /// Primary key.
    pub id: i64,
    /// Owning api row.
    pub api_id: i64,
    /// Category key.
    pub category_key: String,
    /// Display name.
    pub display_name: String,
    /// Group name.
    pub category_group: String,
    /// Endpoint count tallied at ingest time.
    pub endpoint_count: i64,
}
