//! Read-side queries against the relational store: entity lookups for the
//! `getSchema` MCP tool, health/info resource data, and the consistency
//! check the index builder runs after a rebuild (design §4.3.2 "Validation
//! compares the relational endpoint count to the index document count").

use sqlx::SqlitePool;
use swagger_mcp_foundation::{Error, Result};

use crate::rows::{ApiRow, EndpointCategoryRow, EndpointRow, SchemaRow, SecuritySchemeRow};

/// Fetch the most recently ingested `apis` row, if any have been ingested.
pub async fn latest_api(pool: &SqlitePool) -> Result<Option<ApiRow>> {
    sqlx::query_as::<_, ApiRow>("SELECT * FROM apis ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::storage(format!("failed to load latest api row: {e}")))
}

/// Fetch every ingested `apis` row, most recent first (`swagger://api-info`).
pub async fn list_apis(pool: &SqlitePool) -> Result<Vec<ApiRow>> {
    sqlx::query_as::<_, ApiRow>("SELECT * FROM apis ORDER BY id DESC")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::storage(format!("failed to list api rows: {e}")))
}

/// Look up one named schema within the given api, used by `getSchema`.
/// Returns `Ok(None)` when absent — the caller maps that to a typed
/// `NotFound` MCP tool error, per design §6.
pub async fn get_schema(pool: &SqlitePool, api_id: i64, name: &str) -> Result<Option<SchemaRow>> {
    sqlx::query_as::<_, SchemaRow>("SELECT * FROM schemas WHERE api_id = ? AND name = ?")
        .bind(api_id)
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::storage(format!("failed to look up schema '{name}': {e}")))
}

/// Look up one endpoint by `(path, method)`, used by `getExample`.
pub async fn get_endpoint(pool: &SqlitePool, api_id: i64, path: &str, method: &str) -> Result<Option<EndpointRow>> {
    sqlx::query_as::<_, EndpointRow>("SELECT * FROM endpoints WHERE api_id = ? AND path = ? AND method = ?")
        .bind(api_id)
        .bind(path)
        .bind(method)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::storage(format!("failed to look up endpoint {method} {path}: {e}")))
}

/// Look up one named security scheme within the given api, used to
/// render authentication headers for `getExample`.
pub async fn get_security_scheme(pool: &SqlitePool, api_id: i64, name: &str) -> Result<Option<SecuritySchemeRow>> {
    sqlx::query_as::<_, SecuritySchemeRow>("SELECT * FROM security_schemes WHERE api_id = ? AND name = ?")
        .bind(api_id)
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::storage(format!("failed to look up security scheme '{name}': {e}")))
}

/// Count of endpoint rows for the given api, used for the index-document
/// count cross-check (design §4.3.2 "Validation").
pub async fn endpoint_count(pool: &SqlitePool, api_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM endpoints WHERE api_id = ?")
        .bind(api_id)
        .fetch_one(pool)
        .await
        .map_err(|e| Error::storage(format!("failed to count endpoints: {e}")))?;
    Ok(row.0)
}

/// Category catalog rows for the given api, in display order (endpoint
/// count descending, then key ascending — the order already baked into
/// the ingest write, see design §4.2).
pub async fn list_categories(pool: &SqlitePool, api_id: i64) -> Result<Vec<EndpointCategoryRow>> {
    sqlx::query_as::<_, EndpointCategoryRow>(
        "SELECT * FROM endpoint_categories WHERE api_id = ? ORDER BY endpoint_count DESC, category_key ASC",
    )
    .bind(api_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::storage(format!("failed to list categories: {e}")))
}

/// Table-row counts for `swagger://health` (design §6's two MCP resources).
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct HealthCounts {
    /// Row count of `apis`.
    pub apis: i64,
    /// Row count of `endpoints`.
    pub endpoints: i64,
    /// Row count of `schemas`.
    pub schemas: i64,
    /// Row count of `security_schemes`.
    pub security_schemes: i64,
}

/// Gather table row counts for the health resource.
pub async fn health_counts(pool: &SqlitePool) -> Result<HealthCounts> {
    async fn count(pool: &SqlitePool, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let row: (i64,) = sqlx::query_as(&sql)
            .fetch_one(pool)
            .await
            .map_err(|e| Error::storage(format!("failed to count {table}: {e}")))?;
        Ok(row.0)
    }

    Ok(HealthCounts {
        apis: count(pool, "apis").await?,
        endpoints: count(pool, "endpoints").await?,
        schemas: count(pool, "schemas").await?,
        security_schemes: count(pool, "security_schemes").await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_document;
    use crate::migrations::run_migrations;
    use crate::pool::open_in_memory_pool;
    use swagger_mcp_categorize::categorize;

    #[tokio::test]
    async fn get_schema_round_trips_a_named_schema() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let raw = r#"{
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "components": {"schemas": {"Pet": {"type": "object"}}}
        }"#;
        let mut doc = swagger_mcp_normalize::normalize(raw, None, true).unwrap().0;
        let catalog = categorize(&mut doc);
        let result = ingest_document(&pool, &doc, &catalog, 1).await.unwrap();

        let schema = get_schema(&pool, result.api_id, "Pet").await.unwrap();
        assert!(schema.is_some());
        assert!(get_schema(&pool, result.api_id, "Ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_security_scheme_round_trips_a_named_scheme() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let raw = r#"{
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "components": {"securitySchemes": {"bearerAuth": {"type": "http", "scheme": "bearer"}}}
        }"#;
        let mut doc = swagger_mcp_normalize::normalize(raw, None, true).unwrap().0;
        let catalog = categorize(&mut doc);
        let result = ingest_document(&pool, &doc, &catalog, 1).await.unwrap();

        let scheme = get_security_scheme(&pool, result.api_id, "bearerAuth").await.unwrap();
        assert!(scheme.is_some());
        assert_eq!(scheme.unwrap().scheme_type, "http");
        assert!(get_security_scheme(&pool, result.api_id, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn health_counts_reflect_ingested_rows() {
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

        let counts = health_counts(&pool).await.unwrap();
        assert_eq!(counts.apis, 1);
        assert_eq!(counts.endpoints, 1);
    }
}
