//! The `rmcp`-facing surface: a thin [`tool_router`] wrapper around
//! [`crate::tools`]'s business logic, plus a manual [`ServerHandler`]
//! impl wiring in the two resources from [`crate::resources`] (design
//! §6).

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::tool::{Parameters, ToolCallContext, ToolRouter};
use rmcp::model::{
    Annotated, CallToolRequestParams, CallToolResult, Content, Implementation, ListResourcesResult,
    ListToolsResult, PaginatedRequestParams, RawResource, ReadResourceRequestParam, ReadResourceResult,
    ResourceContents, ResourcesCapability, ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler};

use crate::resources::{api_info_text, health_text, API_INFO_URI, HEALTH_URI};
use crate::state::ServerState;
use crate::tools::{get_example, get_schema, search_endpoints, GetExampleParams, GetSchemaParams, SearchEndpointsParams};

fn json_content<T: serde::Serialize>(value: &T) -> Result<Vec<Content>, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(format!("failed to serialize response: {e}"), None))?;
    Ok(vec![Content::text(text)])
}

/// The MCP server. Holds the shared pipeline/query state plus the
/// macro-generated tool router.
#[derive(Clone)]
pub struct SwaggerMcpServer {
    state: Arc<ServerState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SwaggerMcpServer {
    /// Build the server over an already-bootstrapped [`ServerState`].
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(
        name = "searchEndpoints",
        description = "Search the most recently converted OpenAPI/Swagger document's endpoints by free-text query, optionally filtered to one HTTP method. Returns a page of matching endpoints plus pagination, per-method/tag clusters, and an aggregate summary."
    )]
    async fn search_endpoints_tool(&self, params: Parameters<SearchEndpointsParams>) -> Result<CallToolResult, McpError> {
        let response = search_endpoints(&self.state, params.0).await.map_err(McpError::from)?;
        Ok(CallToolResult::success(json_content(&response)?))
    }

    #[tool(
        name = "getSchema",
        description = "Look up one named schema (component) from the most recently converted document and render it as JSON-Schema. `resolve_refs` controls whether referenced schemas are inlined or left as `$ref` pointers; `include_examples` controls whether the schema's declared example, if any, is attached."
    )]
    async fn get_schema_tool(&self, params: Parameters<GetSchemaParams>) -> Result<CallToolResult, McpError> {
        let response = get_schema(&self.state, params.0).await.map_err(McpError::from)?;
        Ok(CallToolResult::success(json_content(&response)?))
    }

    #[tool(
        name = "getExample",
        description = "Render a request example for one endpoint of the most recently converted document, in curl, javascript, python, or typescript. `endpoint_id` is the `\"METHOD /path\"` identifier a searchEndpoints hit carries. `include_auth` synthesizes placeholder authentication headers from the endpoint's declared security requirements."
    )]
    async fn get_example_tool(&self, params: Parameters<GetExampleParams>) -> Result<CallToolResult, McpError> {
        let response = get_example(&self.state, params.0).await.map_err(McpError::from)?;
        Ok(CallToolResult::success(json_content(&response)?))
    }
}

impl ServerHandler for SwaggerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "OpenAPI/Swagger ingestion server. Convert a specification with the `convert` \
                 CLI subcommand, then use searchEndpoints, getSchema, and getExample to explore \
                 it. Resources swagger://api-info and swagger://health report what is currently \
                 loaded and store health."
                    .to_string(),
            ),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                resources: Some(ResourcesCapability { list_changed: None, ..ResourcesCapability::default() }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "swagger-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Swagger/OpenAPI MCP Server".to_string()),
                description: Some("Converts OpenAPI/Swagger specifications into a searchable, queryable MCP tool surface".to_string()),
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult { tools: self.tool_router.list_all(), next_cursor: None }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_context = ToolCallContext::new(self, request, context);
        async move { self.tool_router.call(tool_context).await }
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = vec![
            Annotated {
                raw: RawResource {
                    uri: API_INFO_URI.to_string(),
                    name: "api-info".to_string(),
                    description: Some("Title, version, dialect, and category catalog of the most recently converted document.".to_string()),
                    mime_type: Some("text/plain".to_string()),
                    size: None,
                },
                annotations: Default::default(),
            },
            Annotated {
                raw: RawResource {
                    uri: HEALTH_URI.to_string(),
                    name: "health".to_string(),
                    description: Some("Store table row counts and on-disk database size.".to_string()),
                    mime_type: Some("text/plain".to_string()),
                    size: None,
                },
                annotations: Default::default(),
            },
        ];
        std::future::ready(Ok(ListResourcesResult { resources, next_cursor: None }))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        let uri = request.uri;
        let state = Arc::clone(&self.state);
        async move {
            let text = match uri.as_str() {
                API_INFO_URI => api_info_text(&state.pool).await.map_err(|e| McpError::internal_error(e.to_string(), None))?,
                HEALTH_URI => health_text(&state.pool, &state.settings.database.path).await.map_err(|e| McpError::internal_error(e.to_string(), None))?,
                other => return Err(McpError::resource_not_found(format!("unknown resource URI: {other}"), None)),
            };
            Ok(ReadResourceResult { contents: vec![ResourceContents::text(text, uri)] })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"{
        "openapi": "3.0.3",
        "info": {"title": "Pets", "version": "1.0.0"},
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "responses": {"200": {"description": "ok"}}
                }
            }
        }
    }"#;

    async fn bootstrap() -> Arc<ServerState> {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = crate::settings::ServerSettings::default();
        settings.database.path = dir.path().join("mcp_server.db");
        settings.search.index_directory = dir.path().join("search_index");
        let state = ServerState::bootstrap(settings).await.unwrap();
        crate::pipeline::convert(&state, SPEC.to_string(), Some("pets.json".to_string()), false).await.unwrap();
        Arc::new(state)
    }

    #[tokio::test]
    async fn get_info_advertises_tools_and_resources() {
        let server = SwaggerMcpServer::new(bootstrap().await);
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }

    #[tokio::test]
    async fn api_info_resource_reports_the_converted_document() {
        let state = bootstrap().await;
        let text = api_info_text(&state.pool).await.unwrap();
        assert!(text.contains("Pets 1.0.0"));
    }

    #[tokio::test]
    async fn health_resource_reports_the_row_counts() {
        let state = bootstrap().await;
        let text = health_text(&state.pool, &state.settings.database.path).await.unwrap();
        assert!(text.contains("apis: 1"));
        assert!(text.contains("endpoints: 1"));
    }
}
