//! Search-field derivation (design §4.1 step 8): folds each endpoint's and
//! schema's structured fields into the free-text and list fields the query
//! engine (C4) indexes over. Purely derived from already-normalized data —
//! this step never touches the raw `openapiv3` tree.

use std::collections::BTreeSet;

use crate::model::{Endpoint, Schema};

/// Derive `searchable_text`, `parameter_names`, `response_codes`, and
/// `content_types` for one endpoint.
pub fn derive_endpoint_search_fields(endpoint: &mut Endpoint) {
    endpoint.parameter_names = endpoint.parameters.iter().map(|p| p.name.clone()).collect();
    endpoint.response_codes = endpoint.responses.keys().cloned().collect();

    let mut content_types: BTreeSet<String> = BTreeSet::new();
    if let Some(body) = &endpoint.request_body {
        content_types.extend(body.content.keys().cloned());
    }
    for response in endpoint.responses.values() {
        content_types.extend(response.content.keys().cloned());
    }
    endpoint.content_types = content_types.into_iter().collect();

    let mut parts = vec![endpoint.operation_id.clone(), endpoint.path.clone(), endpoint.method.clone()];
    parts.extend(endpoint.summary.clone());
    parts.extend(endpoint.description.clone());
    parts.extend(endpoint.tags.iter().cloned());
    parts.extend(endpoint.parameter_names.iter().cloned());
    endpoint.searchable_text = parts.join(" ");
}

/// Derive `searchable_text` and `property_names` for one schema.
pub fn derive_schema_search_fields(schema: &mut Schema) {
    schema.property_names = schema.properties.keys().cloned().collect();

    let mut parts = vec![schema.name.clone()];
    parts.extend(schema.title.clone());
    parts.extend(schema.description.clone());
    parts.extend(schema.property_names.iter().cloned());
    schema.searchable_text = parts.join(" ");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Composition, ParameterLocation, SchemaRef, SchemaType, ValidationConstraints,
    };
    use std::collections::BTreeMap;

    fn empty_schema(name: &str) -> Schema {
        Schema {
            name: name.to_string(),
            schema_type: Some(SchemaType::Object),
            format: None,
            title: None,
            description: None,
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
            items: None,
            enum_values: Vec::new(),
            composition: Composition::default(),
            constraints: ValidationConstraints::default(),
            read_only: false,
            write_only: false,
            deprecated: false,
            discriminator: None,
            example: None,
            extensions: BTreeMap::new(),
            unknown_keywords: BTreeMap::new(),
            dependencies: BTreeSet::new(),
            reference_count: 0,
            has_cycle: false,
            searchable_text: String::new(),
            property_names: Vec::new(),
        }
    }

    fn empty_endpoint() -> Endpoint {
        Endpoint {
            path: "/pets".to_string(),
            method: "GET".to_string(),
            operation_id: "get_pets".to_string(),
            operation_id_synthesized: true,
            summary: Some("List pets".to_string()),
            description: None,
            tags: vec!["pets".to_string()],
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
            security: Vec::new(),
            deprecated: false,
            extensions: BTreeMap::new(),
            category: None,
            category_group: None,
            schema_dependencies: BTreeSet::new(),
            searchable_text: String::new(),
            parameter_names: Vec::new(),
            response_codes: Vec::new(),
            content_types: Vec::new(),
        }
    }

    #[test]
    fn endpoint_searchable_text_includes_summary_and_tags() {
        let mut endpoint = empty_endpoint();
        derive_endpoint_search_fields(&mut endpoint);
        assert!(endpoint.searchable_text.contains("List pets"));
        assert!(endpoint.searchable_text.contains("pets"));
        assert!(endpoint.searchable_text.contains("get_pets"));
    }

    #[test]
    fn schema_property_names_come_from_properties_map() {
        let mut schema = empty_schema("Pet");
        schema.properties.insert("id".to_string(), SchemaRef("Pet.id".to_string()));
        schema.properties.insert("name".to_string(), SchemaRef("Pet.name".to_string()));
        derive_schema_search_fields(&mut schema);
        assert_eq!(schema.property_names, vec!["id".to_string(), "name".to_string()]);
        assert!(schema.searchable_text.contains("Pet"));
    }

    #[test]
    fn parameter_names_reflect_declared_parameters() {
        let mut endpoint = empty_endpoint();
        endpoint.parameters.push(crate::model::Parameter {
            name: "limit".to_string(),
            location: ParameterLocation::Query,
            required: false,
            schema: SchemaRef("get_pets.limit".to_string()),
            description: None,
            examples: BTreeMap::new(),
        });
        derive_endpoint_search_fields(&mut endpoint);
        assert_eq!(endpoint.parameter_names, vec!["limit".to_string()]);
        assert!(endpoint.searchable_text.contains("limit"));
    }
}
