//! The single-transaction write pipeline (design §4.3.1 "Write
//! pipeline"): apis -> schemas -> security_schemes -> endpoints ->
//! endpoint_dependencies -> endpoint_categories, all inside one
//! transaction so a failure anywhere rolls the whole ingest back. The
//! FTS5 triggers on `endpoints`/`schemas` fire during those inserts,
//! same transaction, so a reader observing after commit sees a
//! consistent base-row/FTS-row pair (design §5 "Ordering guarantees").

use sqlx::{Sqlite, SqlitePool, Transaction};
use swagger_mcp_categorize::model::CategoryCatalog;
use swagger_mcp_foundation::{Error, Result};
use swagger_mcp_normalize::model::{DependencyRole, SpecificationDocument};

/// Re-ingest outcome: whether a prior document with the same content
/// hash already existed (design §3 "Lifecycle": re-ingest with the same
/// hash is a no-op).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No prior row with this `(title, version)` existed; freshly inserted.
    Inserted,
    /// A prior row with the same content hash already existed; untouched.
    Unchanged,
    /// A prior row with a different content hash existed under the same
    /// `(title, version)` and was replaced.
    Replaced,
}

/// Result of one ingest call.
#[derive(Debug, Clone, Copy)]
pub struct IngestResult {
    /// The `apis.id` row now current for this document.
    pub api_id: i64,
    /// What happened relative to any prior row.
    pub outcome: IngestOutcome,
}

/// Write one normalized, categorized document into the relational store,
/// in a single transaction, per design §4.3.1's statement order.
pub async fn ingest_document(
    pool: &SqlitePool,
    document: &SpecificationDocument,
    catalog: &CategoryCatalog,
    generation: u64,
) -> Result<IngestResult> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| Error::storage(format!("failed to begin ingest transaction: {e}")))?;

    let existing: Option<(i64, String)> =
        sqlx::query_as("SELECT id, content_hash FROM apis WHERE title = ? AND version = ?")
            .bind(&document.title)
            .bind(&document.version)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| Error::storage(format!("failed to look up existing api row: {e}")))?;

    if let Some((api_id, existing_hash)) = &existing {
        if existing_hash == &document.content_hash {
            tx.commit().await.map_err(|e| Error::storage(format!("failed to commit no-op ingest: {e}")))?;
            return Ok(IngestResult { api_id: *api_id, outcome: IngestOutcome::Unchanged });
        }
        sqlx::query("DELETE FROM apis WHERE id = ?")
            .bind(api_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::storage(format!("failed to delete superseded api row: {e}")))?;
    }

    let api_id = insert_api(&mut tx, document, generation).await?;
    let schema_ids = insert_schemas(&mut tx, api_id, document).await?;
    insert_security_schemes(&mut tx, api_id, document).await?;
    let endpoint_ids = insert_endpoints(&mut tx, api_id, document).await?;
    insert_dependencies(&mut tx, document, &endpoint_ids, &schema_ids).await?;
    insert_categories(&mut tx, api_id, catalog).await?;

    tx.commit().await.map_err(|e| Error::storage(format!("failed to commit ingest transaction: {e}")))?;

    let outcome = if existing.is_some() { IngestOutcome::Replaced } else { IngestOutcome::Inserted };
    Ok(IngestResult { api_id, outcome })
}

async fn insert_api(
    tx: &mut Transaction<'_, Sqlite>,
    document: &SpecificationDocument,
    generation: u64,
) -> Result<i64> {
    let servers_json = serde_json::to_string(&document.servers)
        .map_err(|e| Error::storage(format!("failed to serialize servers: {e}")))?;

    let result = sqlx::query(
        "INSERT INTO apis (title, version, dialect, description, content_hash, source_file_path,
            byte_size, generation, ingested_at, servers_json)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&document.title)
    .bind(&document.version)
    .bind(document.dialect.as_str())
    .bind(&document.description)
    .bind(&document.content_hash)
    .bind(&document.source_file_path)
    .bind(document.byte_size as i64)
    .bind(generation as i64)
    .bind(document.ingested_at.to_rfc3339())
    .bind(servers_json)
    .execute(&mut **tx)
    .await
    .map_err(|e| Error::storage(format!("failed to insert api row: {e}")))?;

    Ok(result.last_insert_rowid())
}

async fn insert_schemas(
    tx: &mut Transaction<'_, Sqlite>,
    api_id: i64,
    document: &SpecificationDocument,
) -> Result<std::collections::HashMap<String, i64>> {
    let mut ids = std::collections::HashMap::new();
    for (name, schema) in &document.schemas {
        let definition_json = serde_json::to_string(schema)
            .map_err(|e| Error::storage(format!("failed to serialize schema '{name}': {e}")))?;
        let schema_type = schema.schema_type.map(|t| format!("{t:?}").to_lowercase());

        let result = sqlx::query(
            "INSERT INTO schemas (api_id, name, schema_type, definition_json, has_cycle,
                reference_count, searchable_text)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(api_id)
        .bind(name)
        .bind(&schema_type)
        .bind(&definition_json)
        .bind(schema.has_cycle)
        .bind(schema.reference_count as i64)
        .bind(&schema.searchable_text)
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::storage(format!("failed to insert schema '{name}': {e}")))?;

        ids.insert(name.clone(), result.last_insert_rowid());
    }
    Ok(ids)
}

async fn insert_security_schemes(
    tx: &mut Transaction<'_, Sqlite>,
    api_id: i64,
    document: &SpecificationDocument,
) -> Result<()> {
    for (name, scheme) in &document.security_schemes {
        let definition_json = serde_json::to_string(scheme)
            .map_err(|e| Error::storage(format!("failed to serialize security scheme '{name}': {e}")))?;

        sqlx::query(
            "INSERT INTO security_schemes (api_id, name, scheme_type, definition_json)
             VALUES (?, ?, ?, ?)",
        )
        .bind(api_id)
        .bind(name)
        .bind(scheme.kind())
        .bind(&definition_json)
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::storage(format!("failed to insert security scheme '{name}': {e}")))?;
    }
    Ok(())
}

async fn insert_endpoints(
    tx: &mut Transaction<'_, Sqlite>,
    api_id: i64,
    document: &SpecificationDocument,
) -> Result<std::collections::HashMap<(String, String), i64>> {
    let mut ids = std::collections::HashMap::new();
    for endpoint in &document.endpoints {
        let tags_json = serde_json::to_string(&endpoint.tags)?;
        let parameters_json = serde_json::to_string(&endpoint.parameters)?;
        let request_body_json = endpoint
            .request_body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::storage(format!("failed to serialize request body: {e}")))?;
        let responses_json = serde_json::to_string(&endpoint.responses)?;
        let security_json = serde_json::to_string(&endpoint.security)?;
        let extensions_json = serde_json::to_string(&endpoint.extensions)?;

        let result = sqlx::query(
            "INSERT INTO endpoints (api_id, path, method, operation_id, operation_id_synthesized,
                summary, description, tags_json, parameters_json, request_body_json,
                responses_json, security_json, deprecated, extensions_json, category,
                category_group, searchable_text)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(api_id)
        .bind(&endpoint.path)
        .bind(&endpoint.method)
        .bind(&endpoint.operation_id)
        .bind(endpoint.operation_id_synthesized)
        .bind(&endpoint.summary)
        .bind(&endpoint.description)
        .bind(&tags_json)
        .bind(&parameters_json)
        .bind(&request_body_json)
        .bind(&responses_json)
        .bind(&security_json)
        .bind(endpoint.deprecated)
        .bind(&extensions_json)
        .bind(&endpoint.category)
        .bind(&endpoint.category_group)
        .bind(&endpoint.searchable_text)
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::storage(format!("failed to insert endpoint {} {}: {e}", endpoint.method, endpoint.path)))?;

        ids.insert((endpoint.path.clone(), endpoint.method.clone()), result.last_insert_rowid());
    }
    Ok(ids)
}

async fn insert_dependencies(
    tx: &mut Transaction<'_, Sqlite>,
    document: &SpecificationDocument,
    endpoint_ids: &std::collections::HashMap<(String, String), i64>,
    schema_ids: &std::collections::HashMap<String, i64>,
) -> Result<()> {
    for edge in &document.dependency_edges {
        let Some(&endpoint_id) = endpoint_ids.get(&(edge.endpoint_path.clone(), edge.endpoint_method.clone())) else {
            continue;
        };
        let Some(&schema_id) = schema_ids.get(&edge.schema_name) else { continue };

        let (role, response_code) = match &edge.role {
            DependencyRole::Parameter => ("parameter", None),
            DependencyRole::RequestBody => ("requestBody", None),
            DependencyRole::Response(code) => ("response", Some(code.clone())),
            DependencyRole::Callback => ("callback", None),
        };

        sqlx::query(
            "INSERT OR IGNORE INTO endpoint_dependencies (endpoint_id, schema_id, role, response_code)
             VALUES (?, ?, ?, ?)",
        )
        .bind(endpoint_id)
        .bind(schema_id)
        .bind(role)
        .bind(&response_code)
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::storage(format!("failed to insert dependency edge: {e}")))?;
    }
    Ok(())
}

async fn insert_categories(tx: &mut Transaction<'_, Sqlite>, api_id: i64, catalog: &CategoryCatalog) -> Result<()> {
    for category in &catalog.categories {
        sqlx::query(
            "INSERT INTO endpoint_categories (api_id, category_key, display_name, category_group, endpoint_count)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(api_id)
        .bind(&category.key)
        .bind(&category.display_name)
        .bind(&category.group)
        .bind(category.endpoint_count as i64)
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::storage(format!("failed to insert category '{}': {e}", category.key)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::pool::open_in_memory_pool;
    use swagger_mcp_categorize::categorize;

    fn petstore() -> SpecificationDocument {
        let raw = r#"{
            "openapi": "3.0.3",
            "info": {"title": "Petstore", "version": "1.0.0"},
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "tags": ["pets"],
                        "responses": {
                            "200": {"description": "ok", "content": {"application/json":
                                {"schema": {"$ref": "#/components/schemas/Pet"}}}}
                        }
                    }
                }
            },
            "components": {"schemas": {"Pet": {"type": "object",
                "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}}}}
        }"#;
        swagger_mcp_normalize::normalize(raw, None, true).unwrap().0
    }

    #[tokio::test]
    async fn ingests_a_fresh_document() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let mut doc = petstore();
        let catalog = categorize(&mut doc);

        let result = ingest_document(&pool, &doc, &catalog, 1).await.unwrap();
        assert_eq!(result.outcome, IngestOutcome::Inserted);

        let endpoint_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM endpoints")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(endpoint_count.0, 1);

        let schema_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schemas").fetch_one(&pool).await.unwrap();
        assert_eq!(schema_count.0, 1);
    }

    #[tokio::test]
    async fn re_ingesting_the_same_content_hash_is_a_no_op() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let mut doc = petstore();
        let catalog = categorize(&mut doc);

        ingest_document(&pool, &doc, &catalog, 1).await.unwrap();
        let second = ingest_document(&pool, &doc, &catalog, 2).await.unwrap();
        assert_eq!(second.outcome, IngestOutcome::Unchanged);

        let api_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM apis").fetch_one(&pool).await.unwrap();
        assert_eq!(api_count.0, 1);
    }

    #[tokio::test]
    async fn re_ingesting_a_changed_document_replaces_the_old_rows() {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let mut doc = petstore();
        let catalog = categorize(&mut doc);
        ingest_document(&pool, &doc, &catalog, 1).await.unwrap();

        let raw_v2 = r#"{
            "openapi": "3.0.3",
            "info": {"title": "Petstore", "version": "1.0.0"},
            "paths": {
                "/pets": {"get": {"operationId": "listPets", "responses": {"200": {"description": "ok"}}}},
                "/pets/{id}": {"get": {"operationId": "getPet", "responses": {"200": {"description": "ok"}}}}
            }
        }"#;
        let mut doc2 = swagger_mcp_normalize::normalize(raw_v2, None, true).unwrap().0;
        let catalog2 = categorize(&mut doc2);
        let result = ingest_document(&pool, &doc2, &catalog2, 2).await.unwrap();
        assert_eq!(result.outcome, IngestOutcome::Replaced);

        let endpoint_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM endpoints").fetch_one(&pool).await.unwrap();
        assert_eq!(endpoint_count.0, 2);
    }
}
