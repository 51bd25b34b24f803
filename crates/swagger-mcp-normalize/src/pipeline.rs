//! The top-level `Normalize(raw) -> (NormalizedAPI, Report)` orchestrator
//! (design §4.1 "Public contract"), wiring: dialect gate -> Swagger 2.0
//! lift (if needed) -> `openapiv3` parse -> schema graph + endpoint
//! extraction -> security normalization -> cross-reference validation ->
//! search-field derivation.
//!
//! Failure semantics (design §4.1 "Error policy" / error-handling design
//! §7): document parsing is always fatal; reference errors raised during
//! cross-reference validation are always fatal; everything else is
//! collected into the [`Report`] and is only fatal when `strict` is set.

use std::collections::BTreeMap;

use chrono::Utc;
use indexmap::IndexMap;
use openapiv3::ReferenceOr;
use sha2::{Digest, Sha256};
use swagger_mcp_foundation::{Error, Result};

use crate::dialect::detect_dialect;
use crate::endpoints::extract_endpoints;
use crate::model::{Dialect, Server, SpecificationDocument, TagDefinition, TagGroup};
use crate::report::Report;
use crate::schemas::SchemaCollector;
use crate::search_fields::{derive_endpoint_search_fields, derive_schema_search_fields};
use crate::security::normalize_security_schemes;
use crate::swagger_convert::lift_swagger2_to_openapi3;
use crate::validate::validate_cross_references;

/// Parse and normalize a raw OpenAPI/Swagger document (JSON or YAML text)
/// into a [`SpecificationDocument`], alongside a [`Report`] of diagnostics
/// and counters.
///
/// Reference errors (an unresolvable `$ref`) always escalate to a
/// returned `Err`, independent of `strict`. `strict` only controls
/// whether other `Error`-severity diagnostics escalate too.
pub fn normalize(
    raw_text: &str,
    source_file_path: Option<String>,
    strict: bool,
) -> Result<(SpecificationDocument, Report)> {
    let mut report = Report::default();

    let raw_value = parse_document_text(raw_text)?;
    let dialect = detect_dialect(&raw_value)?;

    let openapi_value = match dialect {
        Dialect::Swagger2 => lift_swagger2_to_openapi3(raw_value)?,
        Dialect::OpenApi30 | Dialect::OpenApi31 => raw_value,
    };

    let doc: openapiv3::OpenAPI = serde_json::from_value(openapi_value)
        .map_err(|e| Error::input(format!("failed to parse OpenAPI document: {e}")))?;

    let empty_schemas: IndexMap<String, ReferenceOr<openapiv3::Schema>> = IndexMap::new();
    let schemas_src = doc.components.as_ref().map_or(&empty_schemas, |c| &c.schemas);

    let mut collector = SchemaCollector::new(schemas_src, &mut report);
    collector.collect_named();
    let extracted = extract_endpoints(&doc, &mut collector);
    let mut schemas = collector.into_schemas();

    let mut endpoints = extracted.endpoints;
    for endpoint in &mut endpoints {
        derive_endpoint_search_fields(endpoint);
    }
    for schema in schemas.values_mut() {
        derive_schema_search_fields(schema);
    }

    validate_cross_references(&endpoints, &mut schemas, &mut report);
    if report.has_reference_errors() {
        return Err(Error::unresolvable_reference(format!(
            "normalization produced {} unresolvable reference(s)",
            report.diagnostics.iter().filter(|d| d.severity == crate::report::Severity::Reference).count()
        )));
    }
    if strict && report.has_errors() {
        return Err(Error::spec_invariant(format!(
            "normalization produced {} error-severity diagnostic(s) in strict mode",
            report.diagnostics.iter().filter(|d| d.severity == crate::report::Severity::Error).count()
        )));
    }

    let security_schemes = normalize_security_schemes(&doc, &mut report);

    let tag_groups = doc
        .extensions
        .get("x-tagGroups")
        .and_then(|v| v.as_array())
        .map(|groups| {
            groups
                .iter()
                .filter_map(|g| {
                    let name = g.get("name")?.as_str()?.to_string();
                    let tags = g
                        .get("tags")?
                        .as_array()?
                        .iter()
                        .filter_map(|t| t.as_str().map(str::to_string))
                        .collect();
                    Some(TagGroup { name, tags })
                })
                .collect()
        })
        .unwrap_or_default();

    let tags = doc
        .tags
        .iter()
        .map(|t| TagDefinition { name: t.name.clone(), description: t.description.clone() })
        .collect();

    let servers = doc
        .servers
        .iter()
        .map(|s| Server {
            url: s.url.clone(),
            description: s.description.clone(),
            variables: s
                .variables
                .iter()
                .map(|(name, var)| {
                    let mut values = var.enum_values.clone();
                    if values.is_empty() {
                        values.push(var.default.clone());
                    }
                    (name.clone(), values)
                })
                .collect(),
        })
        .collect();

    let extensions: BTreeMap<String, serde_json::Value> = doc
        .extensions
        .iter()
        .filter(|(k, _)| k.as_str() != "x-tagGroups")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let byte_size = raw_text.len() as u64;
    let mut hasher = Sha256::new();
    hasher.update(raw_text.as_bytes());
    let content_hash = format!("{:x}", hasher.finalize());

    let document = SpecificationDocument {
        title: doc.info.title.clone(),
        version: doc.info.version.clone(),
        dialect,
        description: doc.info.description.clone(),
        servers,
        contact: doc.info.contact.as_ref().map(render_contact),
        license: doc.info.license.as_ref().map(|l| l.name.clone()),
        content_hash,
        source_file_path,
        byte_size,
        endpoints,
        schemas,
        security_schemes,
        dependency_edges: extracted.dependency_edges,
        extensions,
        tag_groups,
        tags,
        ingested_at: Utc::now(),
    };

    Ok((document, report))
}

fn render_contact(contact: &openapiv3::Contact) -> String {
    let mut parts = Vec::new();
    if let Some(name) = &contact.name {
        parts.push(name.clone());
    }
    if let Some(email) = &contact.email {
        parts.push(email.clone());
    }
    if let Some(url) = &contact.url {
        parts.push(url.clone());
    }
    parts.join(" ")
}

fn parse_document_text(raw_text: &str) -> Result<serde_json::Value> {
    let trimmed = raw_text.trim_start();
    if trimmed.starts_with('{') {
        serde_json::from_str(raw_text)
            .map_err(|e| Error::input(format!("failed to parse document as JSON: {e}")))
    } else {
        serde_yaml::from_str(raw_text)
            .map_err(|e| Error::input(format!("failed to parse document as YAML: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE_LITE: &str = r#"{
        "openapi": "3.0.3",
        "info": {"title": "Petstore", "version": "1.0.0"},
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "tags": ["pets"],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/PetList"}
                                }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
                },
                "PetList": {
                    "type": "array",
                    "items": {"$ref": "#/components/schemas/Pet"}
                }
            }
        }
    }"#;

    #[test]
    fn normalizes_a_minimal_petstore_document() {
        let (document, report) = normalize(PETSTORE_LITE, None, true).unwrap();
        assert_eq!(document.title, "Petstore");
        assert_eq!(document.endpoints.len(), 1);
        assert!(document.schemas.contains_key("Pet"));
        assert!(document.schemas.contains_key("PetList"));
        assert!(!report.has_errors());
        assert_eq!(document.endpoints[0].operation_id, "listPets");
        assert!(document.endpoints[0].schema_dependencies.contains("PetList"));
    }

    #[test]
    fn rejects_malformed_json_as_fatal() {
        let result = normalize("{ not json", None, false);
        assert!(result.is_err());
    }

    #[test]
    fn non_strict_mode_still_rejects_dangling_references() {
        let broken = r#"{
            "openapi": "3.0.3",
            "info": {"title": "Broken", "version": "1.0.0"},
            "paths": {
                "/widgets": {
                    "get": {
                        "operationId": "getWidget",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Missing"}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }"#;
        let result = normalize(broken, None, false);
        assert!(result.is_err());
    }

    #[test]
    fn strict_mode_rejects_dangling_references() {
        let broken = r#"{
            "openapi": "3.0.3",
            "info": {"title": "Broken", "version": "1.0.0"},
            "paths": {
                "/widgets": {
                    "get": {
                        "operationId": "getWidget",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Missing"}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }"#;
        let result = normalize(broken, None, true);
        assert!(result.is_err());
    }
}
