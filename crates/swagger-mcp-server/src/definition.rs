//! Schema-definition rendering for the `getSchema` tool (design §6).
//! Renders a stored [`Schema`] into the JSON-Schema-shaped `definition`
//! the tool returns, honoring `resolve_refs` by either inlining the
//! referenced schema graph (cycle/depth-guarded the same way
//! [`crate::examples`] guards its example graph) or leaving `$ref`
//! pointers in place — the name-handle representation design §9 asks
//! the rest of the system to preserve.

use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::SqlitePool;

use swagger_mcp_foundation::{Error, Result};
use swagger_mcp_normalize::model::{Composition, Schema, SchemaRef, SchemaType, ValidationConstraints};
use swagger_mcp_storage::read::get_schema;
use swagger_mcp_storage::rows::SchemaRow;

/// Recursion cap when inlining referenced schemas under `resolve_refs: true`.
const MAX_SCHEMA_DEPTH: usize = 6;

/// The `getSchema` tool's rendered response body.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    /// Schema name.
    pub name: String,
    /// JSON-Schema type tag, if the schema has a single scalar type.
    pub schema_type: Option<String>,
    /// The rendered definition (JSON-Schema-shaped).
    pub definition: serde_json::Value,
    /// Schema description.
    pub description: Option<String>,
    /// Required property names, alphabetical (the model stores them as a set).
    pub required_fields: Vec<String>,
    /// Declared property count.
    pub properties_count: usize,
    /// Examples, when requested and present.
    pub examples: Option<Vec<serde_json::Value>>,
}

/// Look up and render `name`, or `Ok(None)` when the api has no such schema.
pub async fn build_schema_definition(
    pool: &SqlitePool,
    api_id: i64,
    name: &str,
    resolve_refs: bool,
    include_examples: bool,
) -> Result<Option<SchemaDefinition>> {
    let Some(row) = get_schema(pool, api_id, name).await? else { return Ok(None) };
    let schema = deserialize_schema(&row)?;

    let mut visiting = vec![name.to_string()];
    let definition = render_schema(pool, api_id, &schema, resolve_refs, 0, &mut visiting).await?;

    let examples = include_examples.then(|| schema.example.clone()).flatten().map(|example| vec![example]);

    Ok(Some(SchemaDefinition {
        name: schema.name.clone(),
        schema_type: schema.schema_type.map(schema_type_name),
        definition,
        description: schema.description.clone(),
        required_fields: schema.required.iter().cloned().collect(),
        properties_count: schema.properties.len(),
        examples,
    }))
}

fn deserialize_schema(row: &SchemaRow) -> Result<Schema> {
    serde_json::from_str(&row.definition_json).map_err(|e| Error::storage(format!("failed to deserialize schema '{}': {e}", row.name)))
}

fn render_schema<'a>(
    pool: &'a SqlitePool,
    api_id: i64,
    schema: &'a Schema,
    resolve_refs: bool,
    depth: usize,
    visiting: &'a mut Vec<String>,
) -> BoxFuture<'a, Result<serde_json::Value>> {
    async move {
        let mut object = serde_json::Map::new();

        if let Some(schema_type) = schema.schema_type {
            object.insert("type".to_string(), serde_json::Value::String(schema_type_name(schema_type).to_string()));
        }
        if let Some(format) = &schema.format {
            object.insert("format".to_string(), serde_json::Value::String(format.clone()));
        }
        if let Some(title) = &schema.title {
            object.insert("title".to_string(), serde_json::Value::String(title.clone()));
        }
        if let Some(description) = &schema.description {
            object.insert("description".to_string(), serde_json::Value::String(description.clone()));
        }
        if !schema.enum_values.is_empty() {
            object.insert("enum".to_string(), serde_json::Value::Array(schema.enum_values.clone()));
        }
        if schema.read_only {
            object.insert("readOnly".to_string(), serde_json::Value::Bool(true));
        }
        if schema.write_only {
            object.insert("writeOnly".to_string(), serde_json::Value::Bool(true));
        }
        if schema.deprecated {
            object.insert("deprecated".to_string(), serde_json::Value::Bool(true));
        }
        if let Some(discriminator) = &schema.discriminator {
            object.insert("discriminator".to_string(), serde_json::Value::String(discriminator.clone()));
        }
        if let Some(constraints) = render_constraints(&schema.constraints) {
            object.insert("constraints".to_string(), constraints);
        }

        if !schema.properties.is_empty() {
            let mut properties = serde_json::Map::new();
            for (property_name, schema_ref) in &schema.properties {
                let value = render_schema_ref(pool, api_id, schema_ref, resolve_refs, depth, visiting).await?;
                properties.insert(property_name.clone(), value);
            }
            object.insert("properties".to_string(), serde_json::Value::Object(properties));
        }
        if !schema.required.is_empty() {
            object.insert("required".to_string(), serde_json::Value::Array(schema.required.iter().cloned().map(serde_json::Value::String).collect()));
        }
        if let Some(items) = &schema.items {
            let value = render_schema_ref(pool, api_id, items, resolve_refs, depth, visiting).await?;
            object.insert("items".to_string(), value);
        }
        if let Some(composition) = render_composition(&schema.composition) {
            object.insert("composition".to_string(), composition);
        }
        if !schema.unknown_keywords.is_empty() {
            for (key, value) in &schema.unknown_keywords {
                object.insert(key.clone(), value.clone());
            }
        }

        Ok(serde_json::Value::Object(object))
    }
    .boxed()
}

/// Render one `SchemaRef`: either a `$ref` pointer (design §9's
/// name-handle representation, `resolve_refs: false`) or the referenced
/// schema inlined in place (`resolve_refs: true`), guarded against cycles
/// and unbounded depth the same way examples.rs guards its walk.
fn render_schema_ref<'a>(
    pool: &'a SqlitePool,
    api_id: i64,
    schema_ref: &'a SchemaRef,
    resolve_refs: bool,
    depth: usize,
    visiting: &'a mut Vec<String>,
) -> BoxFuture<'a, Result<serde_json::Value>> {
    async move {
        let pointer = serde_json::json!({ "$ref": format!("#/components/schemas/{}", schema_ref.0) });
        if !resolve_refs {
            return Ok(pointer);
        }
        if depth >= MAX_SCHEMA_DEPTH || visiting.iter().any(|name| name == &schema_ref.0) {
            return Ok(pointer);
        }
        let Some(row) = get_schema(pool, api_id, &schema_ref.0).await? else { return Ok(pointer) };
        let referenced = deserialize_schema(&row)?;

        visiting.push(schema_ref.0.clone());
        let rendered = render_schema(pool, api_id, &referenced, resolve_refs, depth + 1, visiting).await?;
        visiting.pop();
        Ok(rendered)
    }
    .boxed()
}

fn render_composition(composition: &Composition) -> Option<serde_json::Value> {
    let mut object = serde_json::Map::new();
    let ref_list = |refs: &[SchemaRef]| -> serde_json::Value {
        serde_json::Value::Array(refs.iter().map(|r| serde_json::json!({ "$ref": format!("#/components/schemas/{}", r.0) })).collect())
    };
    if !composition.all_of.is_empty() {
        object.insert("allOf".to_string(), ref_list(&composition.all_of));
    }
    if !composition.one_of.is_empty() {
        object.insert("oneOf".to_string(), ref_list(&composition.one_of));
    }
    if !composition.any_of.is_empty() {
        object.insert("anyOf".to_string(), ref_list(&composition.any_of));
    }
    if let Some(not) = &composition.not {
        object.insert("not".to_string(), serde_json::json!({ "$ref": format!("#/components/schemas/{}", not.0) }));
    }
    (!object.is_empty()).then_some(serde_json::Value::Object(object))
}

const fn schema_type_name(schema_type: SchemaType) -> &'static str {
    match schema_type {
        SchemaType::Object => "object",
        SchemaType::Array => "array",
        SchemaType::String => "string",
        SchemaType::Number => "number",
        SchemaType::Integer => "integer",
        SchemaType::Boolean => "boolean",
        SchemaType::Null => "null",
    }
}

fn render_constraints(constraints: &ValidationConstraints) -> Option<serde_json::Value> {
    let mut object = serde_json::Map::new();
    if let Some(minimum) = constraints.minimum {
        object.insert("minimum".to_string(), serde_json::json!(minimum));
    }
    if let Some(maximum) = constraints.maximum {
        object.insert("maximum".to_string(), serde_json::json!(maximum));
    }
    if let Some(min_length) = constraints.min_length {
        object.insert("minLength".to_string(), serde_json::json!(min_length));
    }
    if let Some(max_length) = constraints.max_length {
        object.insert("maxLength".to_string(), serde_json::json!(max_length));
    }
    if let Some(pattern) = &constraints.pattern {
        object.insert("pattern".to_string(), serde_json::Value::String(pattern.clone()));
    }
    if let Some(min_items) = constraints.min_items {
        object.insert("minItems".to_string(), serde_json::json!(min_items));
    }
    if let Some(max_items) = constraints.max_items {
        object.insert("maxItems".to_string(), serde_json::json!(max_items));
    }
    if constraints.unique_items {
        object.insert("uniqueItems".to_string(), serde_json::Value::Bool(true));
    }
    (!object.is_empty()).then_some(serde_json::Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_mcp_categorize::categorize;
    use swagger_mcp_storage::ingest::ingest_document;
    use swagger_mcp_storage::migrations::run_migrations;
    use swagger_mcp_storage::pool::open_in_memory_pool;
    use swagger_mcp_storage::read::latest_api;

    const SPEC: &str = r#"{
        "openapi": "3.0.3",
        "info": {"title": "t", "version": "1"},
        "paths": {},
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "properties": {"id": {"type": "string"}, "owner": {"$ref": "#/components/schemas/Owner"}},
                    "required": ["id"]
                },
                "Owner": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}, "pet": {"$ref": "#/components/schemas/Pet"}}
                }
            }
        }
    }"#;

    async fn seed() -> (sqlx::SqlitePool, i64) {
        let pool = open_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let mut doc = swagger_mcp_normalize::normalize(SPEC, None, true).unwrap().0;
        let catalog = categorize(&mut doc);
        ingest_document(&pool, &doc, &catalog, 1).await.unwrap();
        let api = latest_api(&pool).await.unwrap().unwrap();
        (pool, api.id)
    }

    #[tokio::test]
    async fn unresolved_refs_stay_as_ref_pointers() {
        let (pool, api_id) = seed().await;
        let definition = build_schema_definition(&pool, api_id, "Pet", false, true).await.unwrap().unwrap();
        assert_eq!(definition.required_fields, vec!["id".to_string()]);
        assert_eq!(definition.properties_count, 2);
        let owner = definition.definition.get("properties").unwrap().get("owner").unwrap();
        assert_eq!(owner.get("$ref").unwrap(), "#/components/schemas/Owner");
    }

    #[tokio::test]
    async fn resolved_refs_inline_the_referenced_schema_and_tolerate_a_cycle() {
        let (pool, api_id) = seed().await;
        let definition = build_schema_definition(&pool, api_id, "Pet", true, true).await.unwrap().unwrap();
        let owner = definition.definition.get("properties").unwrap().get("owner").unwrap();
        assert_eq!(owner.get("type").unwrap(), "object");
        let owner_name = owner.get("properties").unwrap().get("name").unwrap();
        assert_eq!(owner_name.get("type").unwrap(), "string");
    }

    #[tokio::test]
    async fn absent_schema_returns_none() {
        let (pool, api_id) = seed().await;
        assert!(build_schema_definition(&pool, api_id, "Ghost", true, true).await.unwrap().is_none());
    }
}
