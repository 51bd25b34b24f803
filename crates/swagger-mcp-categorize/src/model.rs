//! The categorizer's own output types (design §3 "Category" / "CategoryCatalog").
//!
//! These live here rather than in `swagger-mcp-normalize::model` because
//! they're C2's output, not part of the document C1 parses — the catalog
//! is built *after* normalization, from the category labels C2 assigns to
//! each endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of the category catalog: a distinct category key with its
/// display name, owning group, and how many endpoints fall under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// The stable, slugged category key (design §4.2 "category-key slugging").
    pub key: String,
    /// Human-readable display name (usually the tag or resource noun verbatim).
    pub display_name: String,
    /// The `x-tagGroups` group this category belongs to, or `"Other"`.
    pub group: String,
    /// Number of endpoints classified under this category.
    pub endpoint_count: u64,
    /// Uppercase HTTP method -> count of endpoints using it, within this
    /// category. Methods with zero endpoints are omitted (design §3
    /// "Catalog invariants").
    pub method_distribution: BTreeMap<String, u64>,
}

/// The full set of categories discovered across one document, ordered by
/// endpoint count descending and then by key ascending (design §4.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCatalog {
    /// Categories in catalog display order.
    pub categories: Vec<Category>,
}

impl CategoryCatalog {
    /// Total number of categories in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalog has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
