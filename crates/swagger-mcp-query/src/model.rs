//! Request/response shapes for the query engine (design §4.4, §6's
//! `searchEndpoints` tool contract, §8 testable properties).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The caller-supplied structured filters (design §4.4 step 6 "Apply
/// external filters").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// HTTP methods, OR-combined. Empty means "no method filter".
    #[serde(default)]
    pub methods: Vec<String>,
    /// `Some(true)` = auth required, `Some(false)` = auth not required,
    /// `None` = don't filter on auth presence.
    #[serde(default)]
    pub requires_auth: Option<bool>,
    /// Specific security scheme names the endpoint must declare.
    #[serde(default)]
    pub security_schemes: Vec<String>,
    /// Only endpoints where every declared parameter is required (no
    /// optional parameters at all).
    #[serde(default)]
    pub required_params_only: bool,
    /// Specific parameter names the endpoint must declare.
    #[serde(default)]
    pub parameter_names: Vec<String>,
    /// Maximum total parameter count.
    #[serde(default)]
    pub max_parameters: Option<usize>,
    /// Only endpoints that accept a file upload.
    #[serde(default)]
    pub has_file_upload: bool,
    /// Response content types the endpoint must declare.
    #[serde(default)]
    pub response_content_types: Vec<String>,
    /// Complexity levels to include.
    #[serde(default)]
    pub complexity_levels: Vec<ComplexityLevel>,
    /// Tags the endpoint must declare (any match).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether to include deprecated endpoints (default: excluded).
    #[serde(default)]
    pub include_deprecated: bool,
}

/// A parsed search request (design §6 `searchEndpoints` input contract,
/// extended with the filters and pagination params the pipeline needs).
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// The raw user query string.
    pub query: String,
    /// Structured filters.
    pub filters: SearchFilters,
    /// 1-indexed page number.
    pub page: u32,
    /// Results per page, clamped to `[1, max_per_page]`.
    pub per_page: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self { query: String::new(), filters: SearchFilters::default(), page: 1, per_page: 10 }
    }
}

/// Complexity classification (design §4.4 step 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    /// Few parameters, simple responses.
    Simple,
    /// A moderate mix of parameters/response shapes.
    Moderate,
    /// Many parameters, deep composition, or many response variants.
    Complex,
}

/// Parameter summary enrichment (design §4.4 step 8).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Total parameter count.
    pub total: usize,
    /// Required parameter count.
    pub required: usize,
    /// Optional parameter count.
    pub optional: usize,
    /// JSON-Schema type name -> count.
    pub type_histogram: BTreeMap<String, usize>,
    /// Whether any parameter/request body implies a file upload.
    pub has_file_upload: bool,
    /// Whether any parameter type is a composite (object/array).
    pub has_complex_types: bool,
    /// The most common parameter names across the pool (not just this hit).
    pub common_names: Vec<String>,
}

/// Authentication summary enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSummary {
    /// Whether any security requirement applies.
    pub required: bool,
    /// Security scheme names in play.
    pub schemes: Vec<String>,
    /// OAuth2 scopes required, if any.
    pub scopes: Vec<String>,
}

/// Response summary enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseSummary {
    /// Status codes declared.
    pub status_codes: Vec<String>,
    /// Content types declared.
    pub content_types: Vec<String>,
    /// Complexity classification of the response shapes.
    pub complexity: ComplexityLevel,
}

impl Default for ComplexityLevel {
    fn default() -> Self {
        Self::Simple
    }
}

/// One enriched, ranked hit (design §4.4 steps 7-8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The endpoint identifier (`"{METHOD} {path}"`).
    pub id: String,
    /// Path template.
    pub path: String,
    /// Uppercase HTTP method.
    pub method: String,
    /// Short summary.
    pub summary: String,
    /// Long description.
    pub description: String,
    /// `operationId`.
    pub operation_id: String,
    /// Declared tags.
    pub tags: Vec<String>,
    /// BM25F-family relevance score.
    pub score: f32,
    /// Resource group (first meaningful path segment).
    pub resource_group: String,
    /// CRUD/upload/action classification.
    pub operation_type: String,
    /// Category assigned by C2.
    pub category: Option<String>,
    /// Category group assigned by C2.
    pub category_group: Option<String>,
    /// Parameter enrichment.
    pub parameters: ParameterSummary,
    /// Auth enrichment.
    pub auth: AuthSummary,
    /// Response enrichment.
    pub response: ResponseSummary,
    /// Overall complexity level.
    pub complexity: ComplexityLevel,
    /// Whether the endpoint is deprecated.
    pub deprecated: bool,
}

/// A named cluster of result identifiers, in rank order (design §4.4 step 9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster label (e.g. a tag, resource group, complexity level).
    pub label: String,
    /// Endpoint identifiers in rank order within this cluster.
    pub endpoint_ids: Vec<String>,
}

/// Clusters grouped by dimension (design §4.4 step 9).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clusters {
    /// Clustered by tag.
    pub by_tag: Vec<Cluster>,
    /// Clustered by resource group.
    pub by_resource_group: Vec<Cluster>,
    /// Clustered by complexity level.
    pub by_complexity: Vec<Cluster>,
    /// Clustered by HTTP method.
    pub by_method: Vec<Cluster>,
    /// Clustered by operation type.
    pub by_operation_type: Vec<Cluster>,
    /// Clustered by whether auth is required.
    pub by_auth_requirement: Vec<Cluster>,
}

/// Pagination metadata (design §4.4 step 10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-indexed current page.
    pub page: u32,
    /// Results per page.
    pub per_page: u32,
    /// Total matching results (before pagination).
    pub total_results: usize,
    /// Total pages, `ceil(total_results / per_page)`.
    pub total_pages: u32,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// The previous page number, if any.
    pub previous_page: Option<u32>,
    /// The next page number, if any.
    pub next_page: Option<u32>,
}

/// Aggregate counts and timing (design §4.4 step 11).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Count of pool results by HTTP method.
    pub results_by_method: BTreeMap<String, usize>,
    /// Count of pool results by auth requirement (`"required"`/`"none"`).
    pub results_by_auth: BTreeMap<String, usize>,
    /// Count of pool results by complexity level.
    pub results_by_complexity: BTreeMap<String, usize>,
    /// Average relevance score across the pool.
    pub average_score: f32,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// One query-improvement suggestion (design §4.4 "Suggestions").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// The suggested query string.
    pub query: String,
    /// The suggestion category.
    pub category: SuggestionCategory,
    /// A relevance/confidence score for ranking suggestions.
    pub score: f32,
}

/// Suggestion category tags (design §4.4 "Suggestions").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    /// A likely spelling correction.
    TypoFix,
    /// A broader version of the query (dropped a specific token).
    BroaderQuery,
    /// A substring-similar vocabulary term.
    SimilarTerm,
    /// A field-scoped rewrite (e.g. `method:GET`).
    FieldScopedRewrite,
    /// A common API search pattern (`path:users`, `auth:bearer`, ...).
    ApiPattern,
}

/// The full `searchEndpoints` response (design §4.4 assembled output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Enriched hits for the requested page only.
    pub hits: Vec<SearchHit>,
    /// Pagination metadata.
    pub pagination: Pagination,
    /// Clusters over the full pool.
    pub clusters: Clusters,
    /// Aggregate summary over the full pool.
    pub summary: ResultSummary,
    /// Suggestions, present when the result count is below threshold.
    pub suggestions: Vec<Suggestion>,
    /// Non-fatal warnings (e.g. query-syntax degradation, design §4.4
    /// "Failure semantics").
    pub warnings: Vec<String>,
}
