//! [`SearchDocument`] (design §3): the flat, denormalized record derived
//! from one [`Endpoint`], stored in the keyword-weighted index (and
//! mirrored back out by `getSchema`/`searchEndpoints` responses). Pure
//! function of the normalized entity, per the design's "SearchDocument
//! fields are pure functions of the normalized entity" invariant — no
//! randomness, no wall-clock reads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use swagger_mcp_foundation::path_segments::meaningful_path_segments;
use swagger_mcp_normalize::model::{Endpoint, SpecificationDocument};

/// Operation-type classification for a [`SearchDocument`] (design §3's
/// SearchDocument field; see [`classify_operation_type`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// A new resource is created.
    Create,
    /// A single resource is read.
    Read,
    /// An existing resource is updated.
    Update,
    /// A resource is deleted.
    Delete,
    /// A collection is listed.
    List,
    /// A collection is searched/filtered.
    Search,
    /// A file/binary payload is uploaded.
    Upload,
    /// A non-CRUD action is invoked (e.g. `/orders/{id}/cancel`).
    Action,
    /// None of the above rules matched.
    Unknown,
}

impl OperationType {
    /// The lowercase string stored in the index's `operation_type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Search => "search",
            Self::Upload => "upload",
            Self::Action => "action",
            Self::Unknown => "unknown",
        }
    }
}

/// A flat, derived record optimized for ranked retrieval (design §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Stable endpoint identifier: `"{METHOD} {path}"`.
    pub endpoint_id: String,
    /// The endpoint's path template.
    pub path: String,
    /// Uppercase HTTP method.
    pub method: String,
    /// `operationId` (declared or synthesized).
    pub operation_id: String,
    /// Short summary.
    pub summary: String,
    /// Long description.
    pub description: String,
    /// Path segments exploded into ordered tokens, minus version prefixes
    /// (`v1`..`v9`) and the literal `api` segment.
    pub path_segments: Vec<String>,
    /// The first meaningful path segment.
    pub resource_name: String,
    /// CRUD/upload/action classification.
    pub operation_type: OperationType,
    /// Parameter names, in declaration order.
    pub parameter_names: Vec<String>,
    /// Parameter JSON-Schema type names, aligned by index with `parameter_names`.
    pub parameter_types: Vec<String>,
    /// Parameter descriptions, aligned by index with `parameter_names`.
    pub parameter_descriptions: Vec<String>,
    /// Names of required parameters.
    pub required_parameters: Vec<String>,
    /// Names of optional parameters.
    pub optional_parameters: Vec<String>,
    /// Response content types, deduplicated.
    pub response_content_types: Vec<String>,
    /// Response status codes.
    pub response_status_codes: Vec<String>,
    /// Security scheme names this endpoint requires.
    pub security_scheme_names: Vec<String>,
    /// OAuth2 scopes required across all security requirements.
    pub security_scopes: Vec<String>,
    /// Declared tags.
    pub tags: Vec<String>,
    /// Concatenated free-text search field (composite, weight 1.0 per
    /// design §4.3.2's field-weight table).
    pub searchable_text: String,
    /// Extracted keyword set (lowercased, deduplicated tokens drawn from
    /// summary/description/tags/operationId).
    pub keywords: BTreeSet<String>,
    /// `deprecated` flag.
    pub deprecated: bool,
    /// Whether the endpoint declares a request body.
    pub has_request_body: bool,
    /// Whether any parameter or response declares an example.
    pub has_examples: bool,
    /// Category key assigned by C2, if categorization has run.
    pub category: Option<String>,
    /// Category group assigned by C2.
    pub category_group: Option<String>,
}

/// Classify the endpoint's operation type (design §4.4). Upload and
/// action are checked before the summary-keyword pass since they're the
/// most specific signals.
#[must_use]
pub fn classify_operation_type(endpoint: &Endpoint) -> OperationType {
    let has_upload_content_type = endpoint
        .request_body
        .as_ref()
        .is_some_and(|body| {
            body.content
                .keys()
                .any(|ct| ct.starts_with("multipart/form-data") || ct.starts_with("application/octet-stream"))
        });
    if has_upload_content_type {
        return OperationType::Upload;
    }

    if is_action_path(&endpoint.path) {
        return OperationType::Action;
    }

    let summary_lower = endpoint.summary.clone().unwrap_or_default().to_lowercase();
    if contains_any(&summary_lower, &["create", "add", "new"]) {
        return OperationType::Create;
    }
    if contains_any(&summary_lower, &["update", "modify", "change", "edit"]) {
        return OperationType::Update;
    }
    if contains_any(&summary_lower, &["delete", "remove"]) {
        return OperationType::Delete;
    }
    if contains_any(&summary_lower, &["search", "find", "query"]) {
        return OperationType::Search;
    }
    if contains_any(&summary_lower, &["list", "get all"]) {
        return OperationType::List;
    }

    let has_path_param = endpoint.path.contains('{') || endpoint.path.contains(':');
    let method = endpoint.method.as_str();
    if has_path_param {
        return match method {
            "GET" => OperationType::Read,
            "PUT" | "PATCH" => OperationType::Update,
            "DELETE" => OperationType::Delete,
            _ => static_method_fallback(method),
        };
    }

    match method {
        "GET" => OperationType::List,
        "POST" => OperationType::Create,
        _ => static_method_fallback(method),
    }
}

fn static_method_fallback(method: &str) -> OperationType {
    match method {
        "POST" | "PUT" => OperationType::Create,
        "GET" => OperationType::Read,
        "DELETE" => OperationType::Delete,
        _ => OperationType::Unknown,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Whether the path's last non-parameter segment reads as a verb (i.e.
/// not a recognized resource noun) — action-style endpoints like
/// `/orders/{id}/cancel`.
fn is_action_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.last() else { return false };
    if last.starts_with('{') {
        return false;
    }
    // An action segment only makes sense following a path parameter
    // (the resource instance the action applies to).
    let preceded_by_param = segments.len() >= 2 && segments[segments.len() - 2].starts_with('{');
    preceded_by_param && !swagger_mcp_categorize::is_resource_noun(&last.to_lowercase())
}

/// Derive the [`SearchDocument`] for one endpoint (design §3, §4.3.2).
#[must_use]
pub fn derive_search_document(endpoint: &Endpoint, document: &SpecificationDocument) -> SearchDocument {
    let path_segments = meaningful_path_segments(&endpoint.path);
    let resource_name = path_segments.first().cloned().unwrap_or_default();

    let mut parameter_types = Vec::with_capacity(endpoint.parameters.len());
    let mut parameter_descriptions = Vec::with_capacity(endpoint.parameters.len());
    let mut required_parameters = Vec::new();
    let mut optional_parameters = Vec::new();
    let mut has_examples = !endpoint
        .parameters
        .iter()
        .all(|p| p.examples.is_empty());

    for param in &endpoint.parameters {
        let schema_type = document
            .schemas
            .get(&param.schema.0)
            .and_then(|s| s.schema_type)
            .map_or_else(|| "unknown".to_string(), |t| format!("{t:?}").to_lowercase());
        parameter_types.push(schema_type);
        parameter_descriptions.push(param.description.clone().unwrap_or_default());
        if param.required {
            required_parameters.push(param.name.clone());
        } else {
            optional_parameters.push(param.name.clone());
        }
    }

    if !has_examples {
        has_examples = endpoint.responses.values().any(|r| {
            r.content.values().any(|schema_ref| {
                document
                    .schemas
                    .get(&schema_ref.0)
                    .is_some_and(|s| s.example.is_some())
            })
        });
    }

    let mut security_scheme_names = Vec::new();
    let mut security_scopes = Vec::new();
    for requirement in &endpoint.security {
        for (scheme_name, scopes) in requirement {
            security_scheme_names.push(scheme_name.clone());
            security_scopes.extend(scopes.iter().cloned());
        }
    }
    security_scheme_names.sort();
    security_scheme_names.dedup();
    security_scopes.sort();
    security_scopes.dedup();

    let mut keywords: BTreeSet<String> = BTreeSet::new();
    for text in [endpoint.operation_id.as_str(), endpoint.summary.as_deref().unwrap_or("")] {
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| w.len() > 2) {
            keywords.insert(word.to_lowercase());
        }
    }
    for tag in &endpoint.tags {
        keywords.insert(tag.to_lowercase());
    }

    SearchDocument {
        endpoint_id: format!("{} {}", endpoint.method, endpoint.path),
        path: endpoint.path.clone(),
        method: endpoint.method.clone(),
        operation_id: endpoint.operation_id.clone(),
        summary: endpoint.summary.clone().unwrap_or_default(),
        description: endpoint.description.clone().unwrap_or_default(),
        path_segments,
        resource_name,
        operation_type: classify_operation_type(endpoint),
        parameter_names: endpoint.parameter_names.clone(),
        parameter_types,
        parameter_descriptions,
        required_parameters,
        optional_parameters,
        response_content_types: endpoint.content_types.clone(),
        response_status_codes: endpoint.response_codes.clone(),
        security_scheme_names,
        security_scopes,
        tags: endpoint.tags.clone(),
        searchable_text: endpoint.searchable_text.clone(),
        keywords,
        deprecated: endpoint.deprecated,
        has_request_body: endpoint.request_body.is_some(),
        has_examples,
        category: endpoint.category.clone(),
        category_group: endpoint.category_group.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet as Set};
    use swagger_mcp_normalize::model::{Dialect, ParameterLocation, SchemaRef};

    fn base_endpoint(path: &str, method: &str) -> Endpoint {
        Endpoint {
            path: path.to_string(),
            method: method.to_string(),
            operation_id: "op".to_string(),
            operation_id_synthesized: false,
            summary: None,
            description: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
            security: Vec::new(),
            deprecated: false,
            extensions: BTreeMap::new(),
            category: None,
            category_group: None,
            schema_dependencies: Set::new(),
            searchable_text: String::new(),
            parameter_names: Vec::new(),
            response_codes: Vec::new(),
            content_types: Vec::new(),
        }
    }

    fn base_document(endpoints: Vec<Endpoint>) -> SpecificationDocument {
        SpecificationDocument {
            title: "t".to_string(),
            version: "1".to_string(),
            dialect: Dialect::OpenApi30,
            description: None,
            servers: Vec::new(),
            contact: None,
            license: None,
            content_hash: "h".to_string(),
            source_file_path: None,
            byte_size: 0,
            endpoints,
            schemas: BTreeMap::new(),
            security_schemes: BTreeMap::new(),
            dependency_edges: Vec::new(),
            extensions: BTreeMap::new(),
            tag_groups: Vec::new(),
            tags: Vec::new(),
            ingested_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn path_segments_strip_version_and_api_prefixes() {
        assert_eq!(meaningful_path_segments("/api/v1/users/{id}"), vec!["users".to_string()]);
        assert_eq!(meaningful_path_segments("/v2/orders"), vec!["orders".to_string()]);
    }

    #[test]
    fn classifies_create_from_summary_keyword() {
        let mut e = base_endpoint("/widgets", "POST");
        e.summary = Some("Create a new widget".to_string());
        assert_eq!(classify_operation_type(&e), OperationType::Create);
    }

    #[test]
    fn classifies_read_from_get_with_path_param() {
        let e = base_endpoint("/widgets/{id}", "GET");
        assert_eq!(classify_operation_type(&e), OperationType::Read);
    }

    #[test]
    fn classifies_list_from_get_without_path_param() {
        let e = base_endpoint("/widgets", "GET");
        assert_eq!(classify_operation_type(&e), OperationType::List);
    }

    #[test]
    fn classifies_action_for_verb_segment_after_instance_param() {
        let e = base_endpoint("/orders/{id}/cancel", "POST");
        assert_eq!(classify_operation_type(&e), OperationType::Action);
    }

    #[test]
    fn classifies_upload_from_multipart_request_body() {
        use swagger_mcp_normalize::model::RequestBody;
        let mut e = base_endpoint("/files", "POST");
        let mut content = BTreeMap::new();
        content.insert("multipart/form-data".to_string(), SchemaRef("File".to_string()));
        e.request_body = Some(RequestBody { required: true, content, description: None });
        assert_eq!(classify_operation_type(&e), OperationType::Upload);
    }

    #[test]
    fn derives_required_and_optional_parameter_lists() {
        use swagger_mcp_normalize::model::Parameter;
        let mut e = base_endpoint("/widgets", "GET");
        e.parameters.push(Parameter {
            name: "id".to_string(),
            location: ParameterLocation::Path,
            required: true,
            schema: SchemaRef("x".to_string()),
            description: None,
            examples: BTreeMap::new(),
        });
        e.parameters.push(Parameter {
            name: "limit".to_string(),
            location: ParameterLocation::Query,
            required: false,
            schema: SchemaRef("y".to_string()),
            description: None,
            examples: BTreeMap::new(),
        });
        let doc = base_document(vec![e.clone()]);
        let sd = derive_search_document(&e, &doc);
        assert_eq!(sd.required_parameters, vec!["id".to_string()]);
        assert_eq!(sd.optional_parameters, vec!["limit".to_string()]);
    }

    #[test]
    fn endpoint_id_is_method_and_path() {
        let e = base_endpoint("/widgets", "GET");
        let doc = base_document(vec![e.clone()]);
        let sd = derive_search_document(&e, &doc);
        assert_eq!(sd.endpoint_id, "GET /widgets");
    }
}
