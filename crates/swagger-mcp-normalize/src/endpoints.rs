//! Endpoint extraction (design §4.1 step 3): walks `openapiv3::Paths` into
//! `(path, method)` [`crate::model::Endpoint`] values, merging path-item and
//! operation-level parameters by `(name, location)` shadowing, synthesizing
//! missing `operationId`s, and resolving the security requirement each
//! endpoint actually runs under.

use std::collections::{BTreeMap, BTreeSet};

use openapiv3::ReferenceOr;

use crate::model::{
    DependencyEdge, DependencyRole, Endpoint, Parameter, ParameterLocation, RequestBody, Response,
    SchemaRef, SecurityRequirement,
};
use crate::schemas::SchemaCollector;

/// Endpoints plus the dependency edges discovered while extracting them.
pub struct ExtractedEndpoints {
    /// One entry per `(path, method)` operation.
    pub endpoints: Vec<Endpoint>,
    /// Endpoint -> schema edges, tagged with where the reference came from.
    pub dependency_edges: Vec<DependencyEdge>,
}

/// Walk every path item's operations into normalized endpoints.
pub fn extract_endpoints(
    doc: &openapiv3::OpenAPI,
    collector: &mut SchemaCollector<'_>,
) -> ExtractedEndpoints {
    let mut endpoints = Vec::new();
    let mut dependency_edges = Vec::new();

    for (path, path_item_ref) in &doc.paths.paths {
        let Some(path_item) = path_item_ref.as_item() else {
            collector
                .report_mut()
                .warn(format!("external path item reference not supported: {path}"), None);
            continue;
        };

        let operations: [(&str, &Option<openapiv3::Operation>); 8] = [
            ("GET", &path_item.get),
            ("PUT", &path_item.put),
            ("POST", &path_item.post),
            ("DELETE", &path_item.delete),
            ("OPTIONS", &path_item.options),
            ("HEAD", &path_item.head),
            ("PATCH", &path_item.patch),
            ("TRACE", &path_item.trace),
        ];

        for (method, operation) in operations {
            let Some(operation) = operation else { continue };

            let (operation_id, operation_id_synthesized) = match &operation.operation_id {
                Some(id) if !id.is_empty() => (id.clone(), false),
                _ => {
                    collector.report_mut().counters.operation_ids_synthesized += 1;
                    (synthesize_operation_id(method, path), true)
                }
            };

            let mut dependencies = BTreeSet::new();

            let parameters: Vec<Parameter> =
                merged_parameters(doc, &path_item.parameters, &operation.parameters)
                    .into_iter()
                    .map(|p| convert_parameter(p, &operation_id, collector))
                    .collect();
            for param in &parameters {
                dependencies.insert(param.schema.0.clone());
                dependency_edges.push(DependencyEdge {
                    endpoint_path: path.clone(),
                    endpoint_method: method.to_string(),
                    schema_name: param.schema.0.clone(),
                    role: DependencyRole::Parameter,
                });
            }

            let request_body = operation.request_body.as_ref().and_then(|refor| {
                convert_request_body(doc, refor, &format!("{operation_id}.requestBody"), collector)
            });
            if let Some(body) = &request_body {
                for schema_ref in body.content.values() {
                    dependencies.insert(schema_ref.0.clone());
                    dependency_edges.push(DependencyEdge {
                        endpoint_path: path.clone(),
                        endpoint_method: method.to_string(),
                        schema_name: schema_ref.0.clone(),
                        role: DependencyRole::RequestBody,
                    });
                }
            }

            let responses = convert_responses(
                doc,
                &operation.responses,
                &format!("{operation_id}.response"),
                collector,
            );
            for (code, response) in &responses {
                for schema_ref in response.content.values() {
                    dependencies.insert(schema_ref.0.clone());
                    dependency_edges.push(DependencyEdge {
                        endpoint_path: path.clone(),
                        endpoint_method: method.to_string(),
                        schema_name: schema_ref.0.clone(),
                        role: DependencyRole::Response(code.clone()),
                    });
                }
            }

            let security = resolve_security(&operation.security, &doc.security);

            let extensions = operation
                .extensions
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            endpoints.push(Endpoint {
                path: path.clone(),
                method: method.to_string(),
                operation_id,
                operation_id_synthesized,
                summary: operation.summary.clone(),
                description: operation.description.clone(),
                tags: operation.tags.clone(),
                parameters,
                request_body,
                responses,
                security,
                deprecated: operation.deprecated,
                extensions,
                category: None,
                category_group: None,
                schema_dependencies: dependencies,
                searchable_text: String::new(),
                parameter_names: Vec::new(),
                response_codes: Vec::new(),
                content_types: Vec::new(),
            });
        }
    }

    collector.report_mut().counters.endpoints = endpoints.len() as u64;
    ExtractedEndpoints { endpoints, dependency_edges }
}

/// `{method}_{path-with-placeholders-replaced}`, e.g. `GET /pets/{petId}` ->
/// `get_pets_petId` (design §4.1 step 3).
fn synthesize_operation_id(method: &str, path: &str) -> String {
    let mut slug = String::new();
    for segment in path.split('/') {
        if segment.is_empty() {
            continue;
        }
        if !slug.is_empty() {
            slug.push('_');
        }
        if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            slug.push_str(inner);
        } else {
            slug.push_str(segment);
        }
    }
    format!("{}_{slug}", method.to_lowercase())
}

fn parameter_key(p: &openapiv3::Parameter) -> (String, &'static str) {
    match p {
        openapiv3::Parameter::Query { parameter_data, .. } => {
            (parameter_data.name.clone(), "query")
        }
        openapiv3::Parameter::Header { parameter_data, .. } => {
            (parameter_data.name.clone(), "header")
        }
        openapiv3::Parameter::Path { parameter_data, .. } => (parameter_data.name.clone(), "path"),
        openapiv3::Parameter::Cookie { parameter_data, .. } => {
            (parameter_data.name.clone(), "cookie")
        }
    }
}

fn resolve_parameter<'a>(
    doc: &'a openapiv3::OpenAPI,
    refor: &'a ReferenceOr<openapiv3::Parameter>,
) -> Option<&'a openapiv3::Parameter> {
    match refor {
        ReferenceOr::Item(p) => Some(p),
        ReferenceOr::Reference { reference } => {
            let name = reference.strip_prefix("#/components/parameters/")?;
            doc.components.as_ref()?.parameters.get(name)?.as_item()
        }
    }
}

/// Merge path-item parameters with operation parameters, the operation's
/// entry winning on `(name, location)` collisions (design §3 "shadowing").
fn merged_parameters<'a>(
    doc: &'a openapiv3::OpenAPI,
    path_params: &'a [ReferenceOr<openapiv3::Parameter>],
    op_params: &'a [ReferenceOr<openapiv3::Parameter>],
) -> Vec<&'a openapiv3::Parameter> {
    let mut by_key: BTreeMap<(String, &'static str), &openapiv3::Parameter> = BTreeMap::new();
    for p in path_params.iter().chain(op_params.iter()) {
        if let Some(resolved) = resolve_parameter(doc, p) {
            by_key.insert(parameter_key(resolved), resolved);
        }
    }
    by_key.into_values().collect()
}

fn convert_parameter(
    raw: &openapiv3::Parameter,
    name_hint: &str,
    collector: &mut SchemaCollector<'_>,
) -> Parameter {
    let (location, data) = match raw {
        openapiv3::Parameter::Query { parameter_data, .. } => {
            (ParameterLocation::Query, parameter_data)
        }
        openapiv3::Parameter::Header { parameter_data, .. } => {
            (ParameterLocation::Header, parameter_data)
        }
        openapiv3::Parameter::Path { parameter_data, .. } => {
            (ParameterLocation::Path, parameter_data)
        }
        openapiv3::Parameter::Cookie { parameter_data, .. } => {
            (ParameterLocation::Cookie, parameter_data)
        }
    };

    let child_hint = format!("{name_hint}.{}", data.name);
    let schema = match &data.format {
        openapiv3::ParameterSchemaOrContent::Schema(s) => {
            collector.resolve_external(&child_hint, s)
        }
        openapiv3::ParameterSchemaOrContent::Content(content) => content
            .values()
            .next()
            .and_then(|mt| mt.schema.as_ref())
            .map(|s| collector.resolve_external(&child_hint, s))
            .unwrap_or_else(|| empty_object_ref(collector, &child_hint)),
    };

    let examples = data
        .examples
        .iter()
        .filter_map(|(k, v)| v.as_item().map(|ex| (k.clone(), ex.value.clone().unwrap_or(serde_json::Value::Null))))
        .collect();

    Parameter {
        name: data.name.clone(),
        location,
        required: matches!(location, ParameterLocation::Path) || data.required,
        schema,
        description: data.description.clone(),
        examples,
    }
}

fn resolve_request_body<'a>(
    doc: &'a openapiv3::OpenAPI,
    refor: &'a ReferenceOr<openapiv3::RequestBody>,
) -> Option<&'a openapiv3::RequestBody> {
    match refor {
        ReferenceOr::Item(b) => Some(b),
        ReferenceOr::Reference { reference } => {
            let name = reference.strip_prefix("#/components/requestBodies/")?;
            doc.components.as_ref()?.request_bodies.get(name)?.as_item()
        }
    }
}

fn convert_request_body(
    doc: &openapiv3::OpenAPI,
    refor: &ReferenceOr<openapiv3::RequestBody>,
    name_hint: &str,
    collector: &mut SchemaCollector<'_>,
) -> Option<RequestBody> {
    let body = resolve_request_body(doc, refor)?;
    let mut content = BTreeMap::new();
    for (content_type, media) in &body.content {
        let child_hint = format!("{name_hint}.{content_type}");
        let schema_ref = match &media.schema {
            Some(s) => collector.resolve_external(&child_hint, s),
            None => empty_object_ref(collector, &child_hint),
        };
        content.insert(content_type.clone(), schema_ref);
    }
    Some(RequestBody { required: body.required, content, description: body.description.clone() })
}

fn resolve_response<'a>(
    doc: &'a openapiv3::OpenAPI,
    refor: &'a ReferenceOr<openapiv3::Response>,
) -> Option<&'a openapiv3::Response> {
    match refor {
        ReferenceOr::Item(r) => Some(r),
        ReferenceOr::Reference { reference } => {
            let name = reference.strip_prefix("#/components/responses/")?;
            doc.components.as_ref()?.responses.get(name)?.as_item()
        }
    }
}

fn status_code_to_string(code: &openapiv3::StatusCode) -> String {
    match code {
        openapiv3::StatusCode::Code(n) => n.to_string(),
        openapiv3::StatusCode::Range(n) => format!("{n}XX"),
    }
}

fn convert_response(
    raw: &openapiv3::Response,
    name_hint: &str,
    collector: &mut SchemaCollector<'_>,
) -> Response {
    let mut content = BTreeMap::new();
    for (content_type, media) in &raw.content {
        let child_hint = format!("{name_hint}.{content_type}");
        let schema_ref = match &media.schema {
            Some(s) => collector.resolve_external(&child_hint, s),
            None => empty_object_ref(collector, &child_hint),
        };
        content.insert(content_type.clone(), schema_ref);
    }
    Response { description: raw.description.clone(), content }
}

fn convert_responses(
    doc: &openapiv3::OpenAPI,
    responses: &openapiv3::Responses,
    name_hint: &str,
    collector: &mut SchemaCollector<'_>,
) -> BTreeMap<String, Response> {
    let mut out = BTreeMap::new();
    for (code, refor) in &responses.responses {
        let key = status_code_to_string(code);
        if let Some(resp) = resolve_response(doc, refor) {
            let child_hint = format!("{name_hint}.{key}");
            out.insert(key, convert_response(resp, &child_hint, collector));
        }
    }
    if let Some(default) = &responses.default {
        if let Some(resp) = resolve_response(doc, default) {
            out.insert(
                "default".to_string(),
                convert_response(resp, &format!("{name_hint}.default"), collector),
            );
        }
    }
    out
}

/// A synthesized `type: object` schema, used wherever the raw document has
/// a body/response/parameter slot with no schema attached.
fn empty_object_ref(collector: &mut SchemaCollector<'_>, name_hint: &str) -> SchemaRef {
    let placeholder = ReferenceOr::Item(openapiv3::Schema {
        schema_data: openapiv3::SchemaData::default(),
        schema_kind: openapiv3::SchemaKind::Type(openapiv3::Type::Object(
            openapiv3::ObjectType::default(),
        )),
    });
    collector.resolve_external(name_hint, &placeholder)
}

/// An absent `security` on an operation inherits the document's global
/// requirement; an explicit empty list means "no auth" (design §3
/// invariant — these two states must stay distinguishable).
fn resolve_security(
    operation_security: &Option<Vec<openapiv3::SecurityRequirement>>,
    global_security: &Option<Vec<openapiv3::SecurityRequirement>>,
) -> Vec<SecurityRequirement> {
    let raw = operation_security.as_ref().or(global_security.as_ref());
    raw.map(|reqs| {
        reqs.iter()
            .map(|req| req.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Report;
    use indexmap::IndexMap;
    use openapiv3::{Components, Info, OpenAPI, Operation, PathItem, Paths, Responses};

    fn minimal_doc_with_operation(op: Operation) -> OpenAPI {
        let mut paths = IndexMap::new();
        paths.insert(
            "/pets/{petId}".to_string(),
            ReferenceOr::Item(PathItem { get: Some(op), ..PathItem::default() }),
        );
        OpenAPI {
            openapi: "3.0.3".to_string(),
            info: Info { title: "t".to_string(), version: "1".to_string(), ..Info::default() },
            paths: Paths { paths, extensions: IndexMap::new() },
            components: Some(Components::default()),
            ..OpenAPI::default()
        }
    }

    #[test]
    fn synthesizes_operation_id_from_method_and_path() {
        assert_eq!(synthesize_operation_id("GET", "/pets/{petId}"), "get_pets_petId");
        assert_eq!(synthesize_operation_id("POST", "/pets"), "post_pets");
    }

    #[test]
    fn extracts_one_endpoint_per_declared_method() {
        let doc = minimal_doc_with_operation(Operation {
            operation_id: Some("getPet".to_string()),
            responses: Responses::default(),
            ..Operation::default()
        });
        let mut report = Report::default();
        let schemas_map = IndexMap::new();
        let mut collector = SchemaCollector::new(&schemas_map, &mut report);
        let extracted = extract_endpoints(&doc, &mut collector);
        assert_eq!(extracted.endpoints.len(), 1);
        assert_eq!(extracted.endpoints[0].operation_id, "getPet");
        assert!(!extracted.endpoints[0].operation_id_synthesized);
    }

    #[test]
    fn missing_operation_id_is_synthesized_and_counted() {
        let doc = minimal_doc_with_operation(Operation {
            responses: Responses::default(),
            ..Operation::default()
        });
        let mut report = Report::default();
        let schemas_map = IndexMap::new();
        let mut collector = SchemaCollector::new(&schemas_map, &mut report);
        let extracted = extract_endpoints(&doc, &mut collector);
        assert!(extracted.endpoints[0].operation_id_synthesized);
        assert_eq!(extracted.endpoints[0].operation_id, "get_pets_petId");
        assert_eq!(report.counters.operation_ids_synthesized, 1);
    }

    #[test]
    fn explicit_empty_security_means_no_auth() {
        let doc_with_global = {
            let mut doc = minimal_doc_with_operation(Operation {
                security: Some(vec![]),
                responses: Responses::default(),
                ..Operation::default()
            });
            let mut req = IndexMap::new();
            req.insert("apiKey".to_string(), Vec::new());
            doc.security = Some(vec![req]);
            doc
        };
        let mut report = Report::default();
        let schemas_map = IndexMap::new();
        let mut collector = SchemaCollector::new(&schemas_map, &mut report);
        let extracted = extract_endpoints(&doc_with_global, &mut collector, &mut report);
        assert!(extracted.endpoints[0].security.is_empty());
    }

    #[test]
    fn absent_security_inherits_global_requirement() {
        let mut doc = minimal_doc_with_operation(Operation {
            responses: Responses::default(),
            ..Operation::default()
        });
        let mut req = IndexMap::new();
        req.insert("apiKey".to_string(), Vec::new());
        doc.security = Some(vec![req]);
        let mut report = Report::default();
        let schemas_map = IndexMap::new();
        let mut collector = SchemaCollector::new(&schemas_map, &mut report);
        let extracted = extract_endpoints(&doc, &mut collector);
        assert_eq!(extracted.endpoints[0].security.len(), 1);
        assert!(extracted.endpoints[0].security[0].contains_key("apiKey"));
    }
}
