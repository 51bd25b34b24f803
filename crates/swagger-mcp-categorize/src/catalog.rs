//! Catalog assembly (design §4.2 step 5): tally classified endpoints into
//! a [`CategoryCatalog`], ordered by endpoint count descending and then by
//! key ascending so the most populous categories surface first and ties
//! are deterministic.

use std::collections::BTreeMap;

use crate::model::{Category, CategoryCatalog};

/// One classified endpoint's category assignment, prior to tallying.
pub struct Assignment {
    /// The slugged category key.
    pub key: String,
    /// The display name as classified (pre-slug).
    pub display_name: String,
    /// The resolved group name.
    pub group: String,
    /// The endpoint's uppercase HTTP method.
    pub method: String,
}

/// Fold per-endpoint assignments into an ordered catalog.
#[must_use]
pub fn build_catalog(assignments: &[Assignment]) -> CategoryCatalog {
    let mut tallied: BTreeMap<String, Category> = BTreeMap::new();
    for assignment in assignments {
        let category = tallied.entry(assignment.key.clone()).or_insert_with(|| Category {
            key: assignment.key.clone(),
            display_name: assignment.display_name.clone(),
            group: assignment.group.clone(),
            endpoint_count: 0,
            method_distribution: BTreeMap::new(),
        });
        category.endpoint_count += 1;
        *category.method_distribution.entry(assignment.method.clone()).or_insert(0) += 1;
    }

    let mut categories: Vec<Category> = tallied.into_values().collect();
    categories.sort_by(|a, b| b.endpoint_count.cmp(&a.endpoint_count).then_with(|| a.key.cmp(&b.key)));
    CategoryCatalog { categories }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_endpoint_count_descending_then_key() {
        let assignments = vec![
            Assignment { key: "orders".to_string(), display_name: "Orders".to_string(), group: "Commerce".to_string(), method: "GET".to_string() },
            Assignment { key: "users".to_string(), display_name: "Users".to_string(), group: "Other".to_string(), method: "GET".to_string() },
            Assignment { key: "users".to_string(), display_name: "Users".to_string(), group: "Other".to_string(), method: "POST".to_string() },
        ];
        let catalog = build_catalog(&assignments);
        assert_eq!(catalog.categories[0].key, "users");
        assert_eq!(catalog.categories[0].endpoint_count, 2);
        assert_eq!(catalog.categories[1].key, "orders");
    }

    #[test]
    fn ties_break_alphabetically_by_key() {
        let assignments = vec![
            Assignment { key: "b".to_string(), display_name: "B".to_string(), group: "Other".to_string(), method: "GET".to_string() },
            Assignment { key: "a".to_string(), display_name: "A".to_string(), group: "Other".to_string(), method: "GET".to_string() },
        ];
        let catalog = build_catalog(&assignments);
        assert_eq!(catalog.categories[0].key, "a");
        assert_eq!(catalog.categories[1].key, "b");
    }
}
