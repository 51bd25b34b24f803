//! Parameter shapes and business logic for the three MCP tools (design
//! §6): `searchEndpoints` (delegates straight to the query engine),
//! `getSchema` (delegates to [`crate::definition`]), and `getExample`
//! (delegates to [`crate::examples`]). The `#[tool_router]` impl in
//! [`crate::handler`] is the thin rmcp-facing wrapper around these.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use swagger_mcp_foundation::Error as CoreError;
use swagger_mcp_query::model::{Clusters, Pagination, ResultSummary, SearchHit, Suggestion};
use swagger_mcp_query::{SearchFilters, SearchRequest};
use swagger_mcp_storage::read::{get_endpoint, latest_api};

use crate::definition::build_schema_definition;
use crate::error::ServerError;
use crate::examples::{build_request_example, render, ExampleLanguage};
use crate::state::ServerState;

fn default_limit() -> u32 {
    10
}

fn default_page() -> u32 {
    1
}

const fn default_true() -> bool {
    true
}

/// `searchEndpoints` input (design §6).
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchEndpointsParams {
    /// Free-text query, optionally using `field:term` qualifiers and
    /// boolean/exclusion operators (design §4.4's query language).
    pub query: String,
    /// Restrict to one HTTP method (case-insensitive).
    #[serde(default)]
    pub method: Option<String>,
    /// Results per page, clamped to `[1, 100]`.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// 1-indexed page number.
    #[serde(default = "default_page")]
    pub page: u32,
}

/// One compact hit in a `searchEndpoints` response.
#[derive(Debug, Serialize)]
pub struct EndpointSummary {
    /// `"{METHOD} {path}"`.
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
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Declared tags.
    pub tags: Vec<String>,
    /// Total parameter count.
    pub parameters: usize,
    /// Declared response count.
    pub responses: usize,
}

impl From<&SearchHit> for EndpointSummary {
    fn from(hit: &SearchHit) -> Self {
        Self {
            id: hit.id.clone(),
            path: hit.path.clone(),
            method: hit.method.clone(),
            summary: hit.summary.clone(),
            description: hit.description.clone(),
            operation_id: hit.operation_id.clone(),
            tags: hit.tags.clone(),
            parameters: hit.parameters.total,
            responses: hit.response.status_codes.len(),
        }
    }
}

/// `searchEndpoints` output: the compact hit list plus the full
/// pagination/cluster/summary/suggestion envelope the query engine
/// already assembles (design §4.4 steps 9-12; the testable properties
/// in design §8 read `summary.results_by_method` and `pagination.*`
/// directly, so those ride along rather than getting stripped).
#[derive(Debug, Serialize)]
pub struct SearchEndpointsResponse {
    /// The requested page of results.
    pub results: Vec<EndpointSummary>,
    /// Pagination metadata.
    pub pagination: Pagination,
    /// Clusters over the full pool.
    pub clusters: Clusters,
    /// Aggregate summary over the full pool.
    pub summary: ResultSummary,
    /// Query-improvement suggestions, present when the hit count is low.
    pub suggestions: Vec<Suggestion>,
    /// Non-fatal warnings (degraded query syntax, empty query, ...).
    pub warnings: Vec<String>,
}

/// Run `searchEndpoints` against the currently-published index.
pub async fn search_endpoints(state: &ServerState, params: SearchEndpointsParams) -> Result<SearchEndpointsResponse, ServerError> {
    let index = state.current_index().ok_or_else(|| CoreError::not_found("no specification has been converted yet"))?;

    let mut filters = SearchFilters::default();
    if let Some(method) = &params.method {
        filters.methods.push(method.to_uppercase());
    }

    let request = SearchRequest { query: params.query, filters, page: params.page.max(1), per_page: params.limit.clamp(1, 100) };
    let response = state.query_engine.search(&index, &request)?;

    Ok(SearchEndpointsResponse {
        results: response.hits.iter().map(EndpointSummary::from).collect(),
        pagination: response.pagination,
        clusters: response.clusters,
        summary: response.summary,
        suggestions: response.suggestions,
        warnings: response.warnings,
    })
}

/// `getSchema` input (design §6).
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSchemaParams {
    /// The schema (component) name to look up.
    pub schema_name: String,
    /// Whether to include the schema's declared example, if any.
    #[serde(default = "default_true")]
    pub include_examples: bool,
    /// Whether to inline referenced schemas rather than leave `$ref` pointers.
    #[serde(default = "default_true")]
    pub resolve_refs: bool,
}

/// `getSchema` output (design §6).
#[derive(Debug, Serialize)]
pub struct GetSchemaResponse {
    /// Schema name.
    pub name: String,
    /// JSON-Schema type tag, if scalar.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// The rendered definition.
    pub definition: serde_json::Value,
    /// Schema description.
    pub description: Option<String>,
    /// Required property names.
    pub required_fields: Vec<String>,
    /// Declared property count.
    pub properties_count: usize,
    /// Examples, when requested and present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<serde_json::Value>>,
}

/// Run `getSchema` against the most recently ingested api.
pub async fn get_schema(state: &ServerState, params: GetSchemaParams) -> Result<GetSchemaResponse, ServerError> {
    let api = latest_api(&state.pool).await?.ok_or_else(|| CoreError::not_found("no specification has been converted yet"))?;
    let definition = build_schema_definition(&state.pool, api.id, &params.schema_name, params.resolve_refs, params.include_examples)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("schema '{}' not found", params.schema_name)))?;

    Ok(GetSchemaResponse {
        name: definition.name,
        schema_type: definition.schema_type,
        definition: definition.definition,
        description: definition.description,
        required_fields: definition.required_fields,
        properties_count: definition.properties_count,
        examples: definition.examples,
    })
}

/// `getExample` input (design §6).
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetExampleParams {
    /// The endpoint identifier, `"{METHOD} {path}"` (the same `id` a
    /// `searchEndpoints` hit carries).
    pub endpoint_id: String,
    /// The target language/format.
    #[serde(default)]
    pub language: ExampleLanguage,
    /// Whether to synthesize placeholder authentication headers.
    #[serde(default = "default_true")]
    pub include_auth: bool,
}

/// `getExample` output (design §6).
#[derive(Debug, Serialize)]
pub struct GetExampleResponse {
    /// Echoes the request's `endpoint_id`.
    pub endpoint_id: String,
    /// The rendered language.
    pub language: String,
    /// Uppercase HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// The rendered example snippet.
    pub example: String,
    /// The endpoint's description (empty string when undeclared).
    pub description: String,
}

/// Run `getExample` against the most recently ingested api.
pub async fn get_example(state: &ServerState, params: GetExampleParams) -> Result<GetExampleResponse, ServerError> {
    let api = latest_api(&state.pool).await?.ok_or_else(|| CoreError::not_found("no specification has been converted yet"))?;
    let (method, path) = split_endpoint_id(&params.endpoint_id)?;
    let endpoint = get_endpoint(&state.pool, api.id, &path, &method)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("endpoint '{}' not found", params.endpoint_id)))?;

    let request = build_request_example(&state.pool, &api, &endpoint, params.include_auth).await?;
    let example = render(&request, params.language);

    Ok(GetExampleResponse {
        endpoint_id: params.endpoint_id,
        language: params.language.as_str().to_string(),
        method: endpoint.method,
        path: endpoint.path,
        example,
        description: endpoint.description.unwrap_or_default(),
    })
}

fn split_endpoint_id(id: &str) -> Result<(String, String), CoreError> {
    let mut parts = id.splitn(2, ' ');
    let method = parts.next().filter(|s| !s.is_empty());
    let path = parts.next().filter(|s| !s.is_empty());
    match (method, path) {
        (Some(method), Some(path)) => Ok((method.to_uppercase(), path.to_string())),
        _ => Err(CoreError::input(format!("endpoint_id '{id}' must be formatted as 'METHOD /path'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::convert;

    const SPEC: &str = r#"{
        "openapi": "3.0.3",
        "info": {"title": "Pets", "version": "1.0.0"},
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "responses": {"200": {"description": "ok", "content": {"application/json": {"schema": {"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}}}}}
                }
            }
        },
        "components": {"schemas": {"Pet": {"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}}}
    }"#;

    async fn bootstrap() -> ServerState {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = crate::settings::ServerSettings::default();
        settings.database.path = dir.path().join("mcp_server.db");
        settings.search.index_directory = dir.path().join("search_index");
        let state = ServerState::bootstrap(settings).await.unwrap();
        convert(&state, SPEC.to_string(), Some("pets.json".to_string()), false).await.unwrap();
        state
    }

    #[tokio::test]
    async fn search_endpoints_finds_the_ingested_endpoint() {
        let state = bootstrap().await;
        let response = search_endpoints(&state, SearchEndpointsParams { query: "pet".to_string(), method: None, limit: 10, page: 1 }).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, "GET /pets");
        assert_eq!(response.results[0].responses, 1);
    }

    #[tokio::test]
    async fn get_schema_returns_not_found_for_unknown_name() {
        let state = bootstrap().await;
        let err = get_schema(&state, GetSchemaParams { schema_name: "Ghost".to_string(), include_examples: true, resolve_refs: true }).await.unwrap_err();
        assert!(matches!(err, ServerError::Core(core) if core.kind() == swagger_mcp_foundation::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn get_example_renders_a_curl_command_by_default() {
        let state = bootstrap().await;
        let response = get_example(&state, GetExampleParams { endpoint_id: "GET /pets".to_string(), language: ExampleLanguage::Curl, include_auth: true }).await.unwrap();
        assert_eq!(response.language, "curl");
        assert!(response.example.starts_with("curl -X GET"));
    }

    #[tokio::test]
    async fn get_example_rejects_a_malformed_endpoint_id() {
        let state = bootstrap().await;
        let err = get_example(&state, GetExampleParams { endpoint_id: "not-an-id".to_string(), language: ExampleLanguage::Curl, include_auth: true }).await.unwrap_err();
        assert!(matches!(err, ServerError::Core(core) if core.kind() == swagger_mcp_foundation::ErrorKind::Input));
    }
}
