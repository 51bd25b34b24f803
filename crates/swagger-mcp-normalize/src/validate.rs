//! Cross-reference validation (design §4.1 step 7): counts how many
//! endpoints and schemas reference each named schema, and flags any
//! dependency that points at a name absent from the schema graph. A
//! dangling reference this late means a parameter/body/response slot
//! resolved to a `SchemaRef` whose name was never inserted into the graph
//! (an unsupported external `$ref`, typically) — it is always recorded as
//! a `Reference`-severity diagnostic, which the pipeline treats as fatal
//! independent of `strict`.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Endpoint, Schema};
use crate::report::Report;

/// Populate `Schema::reference_count` and report any dangling dependency.
pub fn validate_cross_references(
    endpoints: &[Endpoint],
    schemas: &mut BTreeMap<String, Schema>,
    report: &mut Report,
) {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for endpoint in endpoints {
        for name in &endpoint.schema_dependencies {
            *counts.entry(name.clone()).or_insert(0) += 1;
        }
    }
    let schema_deps: Vec<(String, Vec<String>)> = schemas
        .iter()
        .map(|(name, schema)| (name.clone(), schema.dependencies.iter().cloned().collect()))
        .collect();
    for (_, deps) in &schema_deps {
        for dep in deps {
            *counts.entry(dep.clone()).or_insert(0) += 1;
        }
    }
    for (name, schema) in schemas.iter_mut() {
        schema.reference_count = counts.get(name).copied().unwrap_or(0);
    }

    let known: BTreeSet<String> = schemas.keys().cloned().collect();
    for endpoint in endpoints {
        for name in &endpoint.schema_dependencies {
            if !known.contains(name) {
                report.reference_error(
                    format!(
                        "endpoint {} {} depends on unknown schema '{name}'",
                        endpoint.method, endpoint.path
                    ),
                    Some(format!("{} {}", endpoint.method, endpoint.path)),
                );
            }
        }
    }
    for (name, deps) in &schema_deps {
        for dep in deps {
            if !known.contains(dep) {
                report.reference_error(
                    format!("schema '{name}' depends on unknown schema '{dep}'"),
                    Some(format!("components.schemas.{name}")),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Composition, SchemaType, ValidationConstraints};

    fn leaf_schema(name: &str) -> Schema {
        Schema {
            name: name.to_string(),
            schema_type: Some(SchemaType::String),
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

    #[test]
    fn counts_references_across_schemas_and_endpoints() {
        let mut schemas = BTreeMap::new();
        let mut parent = leaf_schema("Parent");
        parent.dependencies.insert("Child".to_string());
        schemas.insert("Parent".to_string(), parent);
        schemas.insert("Child".to_string(), leaf_schema("Child"));

        let mut report = Report::default();
        validate_cross_references(&[], &mut schemas, &mut report);
        assert_eq!(schemas["Child"].reference_count, 1);
        assert_eq!(schemas["Parent"].reference_count, 0);
        assert!(!report.has_errors());
    }

    #[test]
    fn reports_dangling_schema_dependency() {
        let mut schemas = BTreeMap::new();
        let mut parent = leaf_schema("Parent");
        parent.dependencies.insert("Ghost".to_string());
        schemas.insert("Parent".to_string(), parent);

        let mut report = Report::default();
        validate_cross_references(&[], &mut schemas, &mut report);
        assert!(report.has_errors());
    }
}
