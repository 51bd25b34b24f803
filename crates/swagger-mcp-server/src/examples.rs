//! Code-example generation for the `getExample` tool (design §6): builds
//! a request shape from the relational store, then renders it in four
//! languages (curl, javascript, python, typescript).

use std::collections::BTreeMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use swagger_mcp_foundation::{Error, Result};
use swagger_mcp_normalize::model::{Parameter, ParameterLocation, RequestBody, Schema, SchemaType, SecurityRequirement, SecurityScheme, Server};
use swagger_mcp_storage::read::{get_schema, get_security_scheme};
use swagger_mcp_storage::rows::{ApiRow, EndpointRow};

/// Recursion cap when walking a schema's property/item graph, guarding
/// against the reference cycles design §3 explicitly allows (`A -> B -> A`).
const MAX_SCHEMA_DEPTH: usize = 6;

/// Fallback base URL when a document declares no `servers`.
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// `getExample`'s `language` parameter (design §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExampleLanguage {
    /// A `curl` command.
    Curl,
    /// A `fetch`-based JavaScript snippet.
    Javascript,
    /// A `requests`-based Python snippet.
    Python,
    /// A `fetch`-based TypeScript snippet with a typed response.
    Typescript,
}

impl Default for ExampleLanguage {
    fn default() -> Self {
        Self::Curl
    }
}

impl ExampleLanguage {
    /// The wire value this variant round-trips to/from (`curl`, `javascript`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Curl => "curl",
            Self::Javascript => "javascript",
            Self::Python => "python",
            Self::Typescript => "typescript",
        }
    }
}

/// A fully-resolved HTTP request shape for one endpoint, assembled from
/// the relational store — the common input every per-language renderer
/// starts from.
#[derive(Debug, Clone)]
pub struct RequestExample {
    /// Uppercase HTTP method.
    pub method: String,
    /// Path template with path parameters substituted.
    pub path: String,
    /// Full URL, including query string.
    pub url: String,
    /// Headers to send, in insertion order (a `BTreeMap` sorts them,
    /// which is fine — example output doesn't need declaration order).
    pub headers: BTreeMap<String, String>,
    /// Query parameters as `(name, value)` pairs, unencoded.
    pub query: Vec<(String, String)>,
    /// Rendered JSON request body, if the operation declares one.
    pub body: Option<String>,
}

/// Assemble a [`RequestExample`] for `endpoint`, resolving parameter and
/// request-body examples from the schema graph and, when `include_auth`
/// is set, synthesizing placeholder authentication headers from the
/// endpoint's declared security requirements.
pub async fn build_request_example(pool: &SqlitePool, api: &ApiRow, endpoint: &EndpointRow, include_auth: bool) -> Result<RequestExample> {
    let parameters: Vec<Parameter> = serde_json::from_str(&endpoint.parameters_json)
        .map_err(|e| Error::storage(format!("failed to deserialize parameters for {}: {e}", endpoint.operation_id)))?;

    let mut path = endpoint.path.clone();
    let mut query = Vec::new();
    let mut headers = BTreeMap::new();
    let mut cookie_pairs = Vec::new();

    for parameter in &parameters {
        let value = resolve_parameter_example(pool, api.id, parameter).await?;
        match parameter.location {
            ParameterLocation::Path => path = path.replace(&format!("{{{}}}", parameter.name), &value),
            ParameterLocation::Query => query.push((parameter.name.clone(), value)),
            ParameterLocation::Header => {
                headers.insert(parameter.name.clone(), value);
            }
            ParameterLocation::Cookie => cookie_pairs.push(format!("{}={value}", parameter.name)),
        }
    }
    if !cookie_pairs.is_empty() {
        headers.insert("Cookie".to_string(), cookie_pairs.join("; "));
    }

    let body = build_request_body(pool, api.id, endpoint, &mut headers).await?;

    if include_auth {
        apply_security_headers(pool, api.id, endpoint, &mut headers, &mut query).await?;
    }

    let base_url = resolve_base_url(api)?;
    let mut url = base_url.trim_end_matches('/').to_string();
    url.push_str(&path);
    if !query.is_empty() {
        let encoded = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(&query).finish();
        url.push('?');
        url.push_str(&encoded);
    }

    Ok(RequestExample { method: endpoint.method.clone(), path, url, headers, query, body })
}

async fn build_request_body(pool: &SqlitePool, api_id: i64, endpoint: &EndpointRow, headers: &mut BTreeMap<String, String>) -> Result<Option<String>> {
    let Some(raw) = &endpoint.request_body_json else { return Ok(None) };
    let request_body: RequestBody = serde_json::from_str(raw)
        .map_err(|e| Error::storage(format!("failed to deserialize request body for {}: {e}", endpoint.operation_id)))?;

    let chosen = request_body
        .content
        .get("application/json")
        .map(|schema_ref| ("application/json", schema_ref))
        .or_else(|| request_body.content.iter().next().map(|(content_type, schema_ref)| (content_type.as_str(), schema_ref)));

    let Some((content_type, schema_ref)) = chosen else { return Ok(None) };
    headers.insert("Content-Type".to_string(), content_type.to_string());

    let mut visiting = Vec::new();
    let value = resolve_schema_example(pool, api_id, &schema_ref.0, 0, &mut visiting).await?;
    let rendered = serde_json::to_string_pretty(&value).map_err(|e| Error::storage(format!("failed to render example body: {e}")))?;
    Ok(Some(rendered))
}

async fn apply_security_headers(
    pool: &SqlitePool,
    api_id: i64,
    endpoint: &EndpointRow,
    headers: &mut BTreeMap<String, String>,
    query: &mut Vec<(String, String)>,
) -> Result<()> {
    let requirements: Vec<SecurityRequirement> = serde_json::from_str(&endpoint.security_json)
        .map_err(|e| Error::storage(format!("failed to deserialize security requirements for {}: {e}", endpoint.operation_id)))?;
    let Some(requirement) = requirements.first() else { return Ok(()) };

    for scheme_name in requirement.keys() {
        let Some(row) = get_security_scheme(pool, api_id, scheme_name).await? else { continue };
        let scheme: SecurityScheme = serde_json::from_str(&row.definition_json)
            .map_err(|e| Error::storage(format!("failed to deserialize security scheme '{scheme_name}': {e}")))?;

        match scheme {
            SecurityScheme::Http { scheme, .. } => {
                let value = match scheme.as_str() {
                    "bearer" => "Bearer YOUR_TOKEN_HERE".to_string(),
                    "basic" => "Basic YOUR_CREDENTIALS_HERE".to_string(),
                    other => format!("{} YOUR_CREDENTIALS_HERE", other.to_uppercase()),
                };
                headers.insert("Authorization".to_string(), value);
            }
            SecurityScheme::ApiKey { name, location } => match location {
                ParameterLocation::Header => {
                    headers.insert(name, "YOUR_API_KEY_HERE".to_string());
                }
                ParameterLocation::Query => query.push((name, "YOUR_API_KEY_HERE".to_string())),
                ParameterLocation::Cookie => {
                    headers.insert("Cookie".to_string(), format!("{name}=YOUR_API_KEY_HERE"));
                }
                ParameterLocation::Path => {}
            },
            SecurityScheme::OAuth2 { .. } => {
                headers.insert("Authorization".to_string(), "Bearer YOUR_OAUTH_TOKEN_HERE".to_string());
            }
            SecurityScheme::OpenIdConnect { .. } => {
                headers.insert("Authorization".to_string(), "Bearer YOUR_OIDC_TOKEN_HERE".to_string());
            }
            SecurityScheme::MutualTls => {}
        }
    }
    Ok(())
}

fn resolve_base_url(api: &ApiRow) -> Result<String> {
    let servers: Vec<Server> =
        serde_json::from_str(&api.servers_json).map_err(|e| Error::storage(format!("failed to deserialize servers for api {}: {e}", api.id)))?;
    let Some(first) = servers.first() else { return Ok(DEFAULT_BASE_URL.to_string()) };

    let mut url = first.url.clone();
    for (variable, values) in &first.variables {
        if let Some(default_value) = values.first() {
            url = url.replace(&format!("{{{variable}}}"), default_value);
        }
    }
    Ok(url)
}

async fn resolve_parameter_example(pool: &SqlitePool, api_id: i64, parameter: &Parameter) -> Result<String> {
    if let Some((_, value)) = parameter.examples.iter().next() {
        return Ok(plain_string(value));
    }
    let mut visiting = Vec::new();
    let value = resolve_schema_example(pool, api_id, &parameter.schema.0, 0, &mut visiting).await?;
    Ok(plain_string(&value))
}

fn plain_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Synthesize a JSON example value for the named schema, recursing into
/// object properties and array items. `visiting` tracks the names on the
/// current path so a cycle (design §3's `A -> B -> A`) degrades to a
/// placeholder string rather than recursing forever; `MAX_SCHEMA_DEPTH`
/// is a second, depth-based backstop for long but acyclic chains.
fn resolve_schema_example<'a>(
    pool: &'a SqlitePool,
    api_id: i64,
    schema_name: &'a str,
    depth: usize,
    visiting: &'a mut Vec<String>,
) -> BoxFuture<'a, Result<serde_json::Value>> {
    async move {
        if depth >= MAX_SCHEMA_DEPTH || visiting.iter().any(|name| name == schema_name) {
            return Ok(serde_json::Value::String(format!("<{schema_name}>")));
        }

        let Some(row) = get_schema(pool, api_id, schema_name).await? else {
            return Ok(serde_json::Value::String("example".to_string()));
        };
        let schema: Schema = serde_json::from_str(&row.definition_json)
            .map_err(|e| Error::storage(format!("failed to deserialize schema '{schema_name}': {e}")))?;

        if let Some(example) = &schema.example {
            return Ok(example.clone());
        }
        if let Some(first) = schema.enum_values.first() {
            return Ok(first.clone());
        }

        visiting.push(schema_name.to_string());
        let value = if let Some(items_ref) = &schema.items {
            let item_value = resolve_schema_example(pool, api_id, &items_ref.0, depth + 1, visiting).await?;
            serde_json::Value::Array(vec![item_value])
        } else {
            match schema.schema_type {
                Some(SchemaType::String) => serde_json::Value::String(primitive_string_example(&schema)),
                Some(SchemaType::Integer) => serde_json::json!(42),
                Some(SchemaType::Number) => serde_json::json!(3.14),
                Some(SchemaType::Boolean) => serde_json::json!(true),
                Some(SchemaType::Null) => serde_json::Value::Null,
                Some(SchemaType::Array) => serde_json::Value::Array(Vec::new()),
                Some(SchemaType::Object) | None => {
                    let mut map = serde_json::Map::new();
                    for (name, prop_ref) in &schema.properties {
                        let value = resolve_schema_example(pool, api_id, &prop_ref.0, depth + 1, visiting).await?;
                        map.insert(name.clone(), value);
                    }
                    serde_json::Value::Object(map)
                }
            }
        };
        visiting.pop();
        Ok(value)
    }
    .boxed()
}

fn primitive_string_example(schema: &Schema) -> String {
    match schema.format.as_deref() {
        Some("date-time") => "2024-01-01T00:00:00Z".to_string(),
        Some("date") => "2024-01-01".to_string(),
        Some("email") => "user@example.com".to_string(),
        Some("uuid") => "00000000-0000-0000-0000-000000000000".to_string(),
        _ => "example_string".to_string(),
    }
}

/// Render `request` as a runnable snippet in `language`.
#[must_use]
pub fn render(request: &RequestExample, language: ExampleLanguage) -> String {
    match language {
        ExampleLanguage::Curl => render_curl(request),
        ExampleLanguage::Javascript => render_javascript(request),
        ExampleLanguage::Python => render_python(request),
        ExampleLanguage::Typescript => render_typescript(request),
    }
}

fn render_curl(request: &RequestExample) -> String {
    let mut cmd = format!("curl -X {} '{}'", request.method, request.url);
    for (key, value) in &request.headers {
        cmd.push_str(&format!(" \\\n  -H '{key}: {value}'"));
    }
    if let Some(body) = &request.body {
        cmd.push_str(&format!(" \\\n  -d '{}'", body.replace('\'', "\\'")));
    }
    cmd
}

fn render_javascript(request: &RequestExample) -> String {
    let headers_literal = headers_object_literal(request, 2);
    let mut lines = vec![format!("fetch('{}', {{", request.url), format!("  method: '{}',", request.method), format!("  headers: {headers_literal},")];
    if let Some(body) = &request.body {
        lines.push(format!("  body: JSON.stringify({body}),"));
    }
    lines.push("})".to_string());
    lines.push("  .then((response) => response.json())".to_string());
    lines.push("  .then((data) => console.log(data));".to_string());
    lines.join("\n")
}

fn render_typescript(request: &RequestExample) -> String {
    let headers_literal = headers_object_literal(request, 2);
    let mut lines = vec![
        "interface ApiResponse {".to_string(),
        "  [key: string]: unknown;".to_string(),
        "}".to_string(),
        String::new(),
        format!("const response = await fetch('{}', {{", request.url),
        format!("  method: '{}',", request.method),
        format!("  headers: {headers_literal},"),
    ];
    if let Some(body) = &request.body {
        lines.push(format!("  body: JSON.stringify({body}),"));
    }
    lines.push("});".to_string());
    lines.push("const data: ApiResponse = await response.json();".to_string());
    lines.join("\n")
}

fn render_python(request: &RequestExample) -> String {
    let mut lines = vec!["import requests".to_string(), String::new()];
    if request.headers.is_empty() {
        lines.push(format!("response = requests.{}('{}')", request.method.to_lowercase(), request.url));
    } else {
        lines.push("headers = {".to_string());
        for (key, value) in &request.headers {
            lines.push(format!("    '{key}': '{value}',"));
        }
        lines.push("}".to_string());
        if let Some(body) = &request.body {
            lines.push(format!("payload = {body}"));
            lines.push(format!("response = requests.{}('{}', headers=headers, json=payload)", request.method.to_lowercase(), request.url));
        } else {
            lines.push(format!("response = requests.{}('{}', headers=headers)", request.method.to_lowercase(), request.url));
        }
    }
    lines.push("print(response.json())".to_string());
    lines.join("\n")
}

fn headers_object_literal(request: &RequestExample, indent: usize) -> String {
    if request.headers.is_empty() {
        return "{}".to_string();
    }
    let pad = " ".repeat(indent);
    let mut out = String::from("{\n");
    for (key, value) in &request.headers {
        out.push_str(&format!("{pad}  '{key}': '{value}',\n"));
    }
    out.push_str(&pad);
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_mcp_categorize::categorize;
    use swagger_mcp_storage::ingest::ingest_document;
    use swagger_mcp_storage::migrations::run_migrations;
    use swagger_mcp_storage::pool::open_in_memory_pool;
    use swagger_mcp_storage::read::{get_endpoint, latest_api};

    const SPEC: &str = r#"{
        "openapi": "3.0.3",
        "info": {"title": "Pets", "version": "1.0.0"},
        "servers": [{"url": "https://{env}.example.com/v1", "variables": {"env": {"default": "api", "enum": ["api", "staging"]}}}],
        "paths": {
            "/pets/{petId}": {
                "get": {
                    "operationId": "getPet",
                    "parameters": [{"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}}],
                    "security": [{"bearerAuth": []}],
                    "responses": {"200": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}}}
                }
            }
        },
        "components": {
            "schemas": {"Pet": {"type": "object", "properties": {"id": {"type": "string"}, "name": {"type": "string"}}, "required": ["id", "name"]}},
            "securitySchemes": {"bearerAuth": {"type": "http", "scheme": "bearer"}}
        }
    }"#;

    async fn seed() -> (SqlitePool, ApiRow, EndpointRow) {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let mut doc = swagger_mcp_normalize::normalize(SPEC, None, true).unwrap().0;
        let catalog = categorize(&mut doc);
        ingest_document(&pool, &doc, &catalog, 1).await.unwrap();
        let api = latest_api(&pool).await.unwrap().unwrap();
        let endpoint = get_endpoint(&pool, api.id, "/pets/{petId}", "GET").await.unwrap().unwrap();
        (pool, api, endpoint)
    }

    #[tokio::test]
    async fn substitutes_path_parameter_and_resolves_server_variable() {
        let (pool, api, endpoint) = seed().await;
        let request = build_request_example(&pool, &api, &endpoint, true).await.unwrap();
        assert_eq!(request.path, "/pets/example_string");
        assert!(request.url.starts_with("https://api.example.com/v1/pets/"));
        assert_eq!(request.headers.get("Authorization").unwrap(), "Bearer YOUR_TOKEN_HERE");
    }

    #[tokio::test]
    async fn omits_auth_header_when_include_auth_is_false() {
        let (pool, api, endpoint) = seed().await;
        let request = build_request_example(&pool, &api, &endpoint, false).await.unwrap();
        assert!(!request.headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn renders_every_language_without_panicking() {
        let (pool, api, endpoint) = seed().await;
        let request = build_request_example(&pool, &api, &endpoint, true).await.unwrap();
        for language in [ExampleLanguage::Curl, ExampleLanguage::Javascript, ExampleLanguage::Python, ExampleLanguage::Typescript] {
            let rendered = render(&request, language);
            assert!(rendered.contains("example_string") || rendered.contains(&request.url));
        }
    }

    #[tokio::test]
    async fn falls_back_to_localhost_when_no_servers_declared() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let raw = r#"{
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {"/x": {"get": {"operationId": "x", "responses": {"200": {"description": "ok"}}}}}
        }"#;
        let mut doc = swagger_mcp_normalize::normalize(raw, None, true).unwrap().0;
        let catalog = categorize(&mut doc);
        ingest_document(&pool, &doc, &catalog, 1).await.unwrap();
        let api = latest_api(&pool).await.unwrap().unwrap();
        let endpoint = get_endpoint(&pool, api.id, "/x", "GET").await.unwrap().unwrap();

        let request = build_request_example(&pool, &api, &endpoint, true).await.unwrap();
        assert!(request.url.starts_with(DEFAULT_BASE_URL));
    }
}
