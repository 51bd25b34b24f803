//! Content builders for the two MCP resources (design §6):
//! `swagger://api-info` and `swagger://health`. Kept free of any `rmcp`
//! types, the same split [`crate::tools`] uses — [`crate::handler`] is
//! the only place that wraps these strings in `rmcp`'s resource types.

use std::path::Path;

use sqlx::SqlitePool;

use swagger_mcp_foundation::Result;
use swagger_mcp_storage::read::{health_counts, list_apis, list_categories};

/// The `swagger://api-info` URI.
pub const API_INFO_URI: &str = "swagger://api-info";
/// The `swagger://health` URI.
pub const HEALTH_URI: &str = "swagger://health";

/// A human-readable text summary of every ingested api, most recent
/// first, with its category catalog.
pub async fn api_info_text(pool: &SqlitePool) -> Result<String> {
    let apis = list_apis(pool).await?;
    if apis.is_empty() {
        return Ok("No specification has been converted yet.".to_string());
    }

    let mut out = String::new();
    for api in &apis {
        out.push_str(&format!("# {} {}\n", api.title, api.version));
        out.push_str(&format!("dialect: {}\n", api.dialect));
        if let Some(description) = &api.description {
            out.push_str(&format!("description: {description}\n"));
        }
        out.push_str(&format!("generation: {}\n", api.generation));
        out.push_str(&format!("ingested_at: {}\n", api.ingested_at));

        let categories = list_categories(pool, api.id).await?;
        if categories.is_empty() {
            out.push_str("categories: none\n");
        } else {
            out.push_str("categories:\n");
            for category in &categories {
                out.push_str(&format!("  - {} ({}) — {} endpoint(s) in group '{}'\n", category.display_name, category.category_key, category.endpoint_count, category.category_group));
            }
        }
        out.push('\n');
    }
    Ok(out)
}

/// A human-readable text summary of store health: table row counts and
/// the on-disk database file size.
pub async fn health_text(pool: &SqlitePool, database_path: &Path) -> Result<String> {
    let counts = health_counts(pool).await?;
    let byte_size = tokio::fs::metadata(database_path).await.map(|metadata| metadata.len()).unwrap_or(0);

    Ok(format!(
        "status: ok\napis: {}\nendpoints: {}\nschemas: {}\nsecurity_schemes: {}\ndatabase_bytes: {byte_size}\n",
        counts.apis, counts.endpoints, counts.schemas, counts.security_schemes
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_mcp_categorize::categorize;
    use swagger_mcp_storage::ingest::ingest_document;
    use swagger_mcp_storage::migrations::run_migrations;
    use swagger_mcp_storage::pool::open_in_memory_pool;

    #[tokio::test]
    async fn api_info_text_reports_no_specification_before_any_ingest() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let text = api_info_text(&pool).await.unwrap();
        assert!(text.contains("No specification"));
    }

    #[tokio::test]
    async fn api_info_text_lists_an_ingested_api_and_its_categories() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let raw = r#"{
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "1.0.0"},
            "paths": {"/pets": {"get": {"operationId": "listPets", "responses": {"200": {"description": "ok"}}}}}
        }"#;
        let mut doc = swagger_mcp_normalize::normalize(raw, None, true).unwrap().0;
        let catalog = categorize(&mut doc);
        ingest_document(&pool, &doc, &catalog, 1).await.unwrap();

        let text = api_info_text(&pool).await.unwrap();
        assert!(text.contains("Pets 1.0.0"));
    }

    #[tokio::test]
    async fn health_text_reports_zero_rows_before_any_ingest() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("missing.db");
        let text = health_text(&pool, &db_path).await.unwrap();
        assert!(text.contains("apis: 0"));
    }
}
