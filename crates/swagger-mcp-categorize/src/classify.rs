//! Endpoint classification (design §4.2 steps 1-3): decide each endpoint's
//! category display name, never failing outright — an endpoint that
//! matches nothing falls back to `"Uncategorized"` rather than raising an
//! error (design §4.2 "never-fatal fallback semantics").
//!
//! Rule order:
//! 1. The endpoint's first declared tag, verbatim.
//! 2. A resource noun recognized inside the `operationId`, title-cased
//!    (design §4.2 Open Question: "resource-noun heuristic" — pinned to a
//!    fixed lexicon since the upstream categorization engine wasn't
//!    available to pin the heuristic against).
//! 3. The first non-parameter path segment, title-cased.
//! 4. `"Uncategorized"`.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use swagger_mcp_foundation::path_segments::meaningful_path_segments;
use swagger_mcp_normalize::model::Endpoint;

/// Common REST resource nouns, used to recognize a resource name embedded
/// in an `operationId` like `listActiveOrders` or `order_create`.
static RESOURCE_NOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "account", "address", "article", "asset", "attachment", "auth", "cart", "category",
        "comment", "contact", "customer", "device", "document", "event", "file", "group",
        "image", "invoice", "item", "job", "label", "message", "notification", "order",
        "organization", "page", "payment", "permission", "post", "product", "profile",
        "project", "report", "review", "role", "session", "subscription", "tag", "task",
        "team", "ticket", "token", "transaction", "user", "webhook",
    ]
    .into_iter()
    .collect()
});

/// Decide the display-name category for one endpoint, per the rule order
/// above. Does not touch `endpoint.category` itself — callers assign it.
#[must_use]
pub fn classify_endpoint(endpoint: &Endpoint) -> String {
    if let Some(tag) = endpoint.tags.first() {
        if !tag.trim().is_empty() {
            return tag.clone();
        }
    }

    if let Some(noun) = resource_noun_from_operation_id(&endpoint.operation_id) {
        return title_case(&noun);
    }

    if let Some(segment) = first_static_path_segment(&endpoint.path) {
        return title_case(&segment);
    }

    "Uncategorized".to_string()
}

/// Whether `word` (already lowercased) is in the fixed resource-noun
/// lexicon. Exposed so the query engine's operation-type classifier
/// (design §4.4's "action" detection) can reuse the same lexicon rather
/// than maintaining a second copy.
#[must_use]
pub fn is_resource_noun(word: &str) -> bool {
    RESOURCE_NOUNS.contains(word)
}

fn resource_noun_from_operation_id(operation_id: &str) -> Option<String> {
    split_words(operation_id)
        .into_iter()
        .find(|word| RESOURCE_NOUNS.contains(word.to_lowercase().as_str()))
}

/// The first meaningful path segment (`api`, version markers, parameters,
/// and single-character tokens stripped), so this matches the resource
/// name C3 derives for the same endpoint's `SearchDocument`.
fn first_static_path_segment(path: &str) -> Option<String> {
    meaningful_path_segments(path).into_iter().next()
}

/// Split an identifier into lowercase words on `_`, `-`, and camelCase
/// boundaries (`listActiveOrders` -> `["list", "active", "orders"]`).
fn split_words(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in identifier.chars() {
        if ch == '_' || ch == '-' || ch == '.' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch.to_ascii_lowercase());
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

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

    #[test]
    fn tag_wins_over_everything_else() {
        let e = endpoint("/orders", "listActiveOrders", vec!["Commerce"]);
        assert_eq!(classify_endpoint(&e), "Commerce");
    }

    #[test]
    fn falls_back_to_resource_noun_in_operation_id() {
        let e = endpoint("/v1/resource/{id}", "listActiveOrders", vec![]);
        assert_eq!(classify_endpoint(&e), "Order");
    }

    #[test]
    fn falls_back_to_first_static_path_segment() {
        let e = endpoint("/widgets/{widgetId}/details", "opaqueName123", vec![]);
        assert_eq!(classify_endpoint(&e), "Widgets");
    }

    #[test]
    fn path_segment_fallback_skips_api_and_version_prefixes() {
        let e = endpoint("/api/v1/users", "get_api_v1_users", vec![]);
        assert_eq!(classify_endpoint(&e), "Users");
    }

    #[test]
    fn falls_back_to_uncategorized() {
        let e = endpoint("/{id}", "xyz", vec![]);
        assert_eq!(classify_endpoint(&e), "Uncategorized");
    }

    #[test]
    fn splits_camel_case_and_snake_case_identifiers() {
        assert_eq!(split_words("listActiveOrders"), vec!["list", "active", "orders"]);
        assert_eq!(split_words("order_create"), vec!["order", "create"]);
    }
}
