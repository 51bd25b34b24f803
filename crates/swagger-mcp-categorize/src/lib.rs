//! Endpoint categorization and category catalog construction (component C2).
//!
//! Assigns every endpoint a category and group, then tallies those
//! assignments into a [`model::CategoryCatalog`]. Classification never
//! fails outright — an endpoint that matches no rule lands in a synthetic
//! `"Uncategorized"` category rather than raising an error, and an
//! unmatched tag group lands endpoints in a synthetic `"Other"` group.

mod catalog;
mod classify;
mod group;
pub mod model;

use swagger_mcp_normalize::model::SpecificationDocument;

pub use classify::{classify_endpoint, is_resource_noun};
pub use group::{assign_group, build_tag_to_group_map, OTHER_GROUP};
pub use model::{Category, CategoryCatalog};
pub use slug::slugify;

mod slug;

/// Classify and group every endpoint in `document`, writing
/// `endpoint.category`/`endpoint.category_group` in place, and return the
/// resulting catalog.
pub fn categorize(document: &mut SpecificationDocument) -> CategoryCatalog {
    let tag_to_group = build_tag_to_group_map(&document.tag_groups);
    let mut assignments = Vec::with_capacity(document.endpoints.len());

    for endpoint in &mut document.endpoints {
        let display_name = classify_endpoint(endpoint);
        let key = slugify(&display_name);
        let group = assign_group(endpoint.tags.first().map(String::as_str), &tag_to_group);

        endpoint.category = Some(key.clone());
        endpoint.category_group = Some(group.clone());

        assignments.push(catalog::Assignment { key, display_name, group, method: endpoint.method.clone() });
    }

    catalog::build_catalog(&assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use swagger_mcp_normalize::model::{Dialect, Endpoint};

    fn endpoint(path: &str, operation_id: &str, tags: Vec<&str>) -> Endpoint {
        Endpoint {
            path: path.to_string(),
            method: "GET".to_string(),
            operation_id: operation_id.to_string(),
            operation_id_synthesized: false,
            summary: None,
            description: None,
            tags: tags.into_iter().map(str::to_string).collect(),
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

    fn document(endpoints: Vec<Endpoint>) -> SpecificationDocument {
        SpecificationDocument {
            title: "t".to_string(),
            version: "1".to_string(),
            dialect: Dialect::OpenApi30,
            description: None,
            servers: Vec::new(),
            contact: None,
            license: None,
            content_hash: "abc".to_string(),
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
    fn assigns_category_and_group_to_every_endpoint() {
        let mut doc = document(vec![endpoint("/orders", "listOrders", vec!["Orders"])]);
        let catalog = categorize(&mut doc);
        assert_eq!(doc.endpoints[0].category.as_deref(), Some("orders"));
        assert_eq!(doc.endpoints[0].category_group.as_deref(), Some("Other"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.categories[0].endpoint_count, 1);
    }

    #[test]
    fn groups_categories_sharing_a_tag_group() {
        let mut doc = document(vec![endpoint("/orders", "listOrders", vec!["Orders"])]);
        doc.tag_groups = vec![swagger_mcp_normalize::model::TagGroup {
            name: "Commerce".to_string(),
            tags: vec!["Orders".to_string()],
        }];
        categorize(&mut doc);
        assert_eq!(doc.endpoints[0].category_group.as_deref(), Some("Commerce"));
    }
}
