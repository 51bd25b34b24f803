//! The weighted index's `tantivy` schema (design §4.3.2 "Index shape").
//!
//! Free-text fields get `tantivy`'s default Porter-stemmed tokenizer
//! (`TEXT`); identifier-ish fields that should still substring/term match
//! but not stem (`operation_id`, `resource_name`) use a whitespace +
//! lowercase custom tokenizer registered by [`register_tokenizers`];
//! filter-only fields (`method`, `status_codes`, ...) are `STRING` —
//! exact-match, untokenized.

use once_cell::sync::Lazy;
use tantivy::schema::{Schema, FAST, INDEXED, STORED, STRING, TEXT};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenizerManager};

/// Tokenizer name used for identifier fields (lowercased, whitespace/
/// punctuation-split, not stemmed).
pub const IDENTIFIER_TOKENIZER: &str = "identifier";

/// Register the custom identifier tokenizer on a `tantivy` index's
/// tokenizer manager. Free-text fields use the built-in `"default"`
/// (Porter-stemmed) tokenizer and need no registration.
pub fn register_tokenizers(manager: &TokenizerManager) {
    let analyzer = TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build();
    manager.register(IDENTIFIER_TOKENIZER, analyzer);
}

/// Field names, as constants so the builder, the query compiler, and the
/// enrichment step all agree on spelling.
pub mod fields {
    /// Stable endpoint identifier (`"METHOD /path"`), the document key.
    pub const ENDPOINT_ID: &str = "endpoint_id";
    /// Path template (weight 1.8).
    pub const ENDPOINT_PATH: &str = "endpoint_path";
    /// First meaningful path segment (weight 1.4).
    pub const RESOURCE_NAME: &str = "resource_name";
    /// Short summary (weight 1.5).
    pub const OPERATION_SUMMARY: &str = "operation_summary";
    /// Long description (weight 1.2).
    pub const OPERATION_DESCRIPTION: &str = "operation_description";
    /// Parameter names (weight 0.9).
    pub const PARAMETER_NAMES: &str = "parameter_names";
    /// Parameter descriptions (weight 0.8).
    pub const PARAMETER_DESCRIPTIONS: &str = "parameter_descriptions";
    /// Extracted keyword set (weight 0.8).
    pub const KEYWORDS: &str = "keywords";
    /// Tags (weight 0.7).
    pub const TAGS: &str = "tags";
    /// `operationId` (weight 0.6).
    pub const OPERATION_ID: &str = "operation_id";
    /// Composite searchable text (weight 1.0).
    pub const SEARCHABLE_TEXT: &str = "searchable_text";

    /// Uppercase HTTP method (exact-match filter field).
    pub const METHOD: &str = "method";
    /// Response/request content types (exact-match filter field, multi-valued).
    pub const CONTENT_TYPES: &str = "content_types";
    /// Response status codes (exact-match filter field, multi-valued).
    pub const STATUS_CODES: &str = "status_codes";
    /// Security scheme names (exact-match filter field, multi-valued).
    pub const SECURITY_SCHEMES: &str = "security_schemes";
    /// Required parameter names (exact-match filter field, multi-valued).
    pub const REQUIRED_PARAMETERS: &str = "required_parameters";
    /// Operation type classification (exact-match filter field).
    pub const OPERATION_TYPE: &str = "operation_type";
    /// Category key (exact-match filter field).
    pub const CATEGORY: &str = "category";
    /// Category group (exact-match filter field).
    pub const CATEGORY_GROUP: &str = "category_group";
    /// `1` when deprecated, `0` otherwise (fast field for filtering).
    pub const DEPRECATED: &str = "deprecated";
    /// `1` when a request body is declared, `0` otherwise.
    pub const HAS_REQUEST_BODY: &str = "has_request_body";
    /// `1` when any example is declared, `0` otherwise.
    pub const HAS_EXAMPLES: &str = "has_examples";
    /// `1` when at least one security scheme is required, `0` otherwise.
    pub const REQUIRES_AUTH: &str = "requires_auth";
    /// Total parameter count (required + optional), a fast field so the
    /// query engine's `max_parameters` filter can range-query it.
    pub const PARAMETER_COUNT: &str = "parameter_count";
    /// Optional parameter count; `0` means every declared parameter is
    /// required, which is what the `required_params_only` filter tests.
    pub const OPTIONAL_PARAMETER_COUNT: &str = "optional_parameter_count";
    /// The full [`crate::model::SearchDocument`], JSON-serialized and
    /// stored (not indexed) for retrieval on hit.
    pub const DOC_JSON: &str = "doc_json";
}

/// Per-field relevance boosts (design §4.3.2's weight table), keyed by the
/// same field-name constants as [`fields`]. Consulted by the query
/// engine's compile step when building the free-text OR-group query.
pub static FIELD_WEIGHTS: Lazy<Vec<(&'static str, f32)>> = Lazy::new(|| {
    vec![
        (fields::ENDPOINT_PATH, 1.8),
        (fields::RESOURCE_NAME, 1.4),
        (fields::OPERATION_SUMMARY, 1.5),
        (fields::OPERATION_DESCRIPTION, 1.2),
        (fields::PARAMETER_NAMES, 0.9),
        (fields::PARAMETER_DESCRIPTIONS, 0.8),
        (fields::KEYWORDS, 0.8),
        (fields::TAGS, 0.7),
        (fields::OPERATION_ID, 0.6),
        (fields::SEARCHABLE_TEXT, 1.0),
    ]
});

/// Build the `tantivy` schema described by design §4.3.2's field table.
#[must_use]
pub fn build_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field(fields::ENDPOINT_ID, STRING | STORED);
    builder.add_text_field(fields::ENDPOINT_PATH, TEXT | STORED);
    builder.add_text_field(fields::RESOURCE_NAME, TEXT | STORED);
    builder.add_text_field(fields::OPERATION_SUMMARY, TEXT | STORED);
    builder.add_text_field(fields::OPERATION_DESCRIPTION, TEXT);
    builder.add_text_field(fields::PARAMETER_NAMES, TEXT);
    builder.add_text_field(fields::PARAMETER_DESCRIPTIONS, TEXT);
    builder.add_text_field(fields::KEYWORDS, TEXT | STORED);
    builder.add_text_field(fields::TAGS, TEXT | STORED);
    builder.add_text_field(fields::OPERATION_ID, TEXT | STORED);
    builder.add_text_field(fields::SEARCHABLE_TEXT, TEXT);

    builder.add_text_field(fields::METHOD, STRING | STORED);
    builder.add_text_field(fields::CONTENT_TYPES, STRING | STORED);
    builder.add_text_field(fields::STATUS_CODES, STRING | STORED);
    builder.add_text_field(fields::SECURITY_SCHEMES, STRING | STORED);
    builder.add_text_field(fields::REQUIRED_PARAMETERS, STRING | STORED);
    builder.add_text_field(fields::OPERATION_TYPE, STRING | STORED);
    builder.add_text_field(fields::CATEGORY, STRING | STORED);
    builder.add_text_field(fields::CATEGORY_GROUP, STRING | STORED);

    builder.add_u64_field(fields::DEPRECATED, INDEXED | STORED | FAST);
    builder.add_u64_field(fields::HAS_REQUEST_BODY, INDEXED | STORED | FAST);
    builder.add_u64_field(fields::HAS_EXAMPLES, INDEXED | STORED | FAST);
    builder.add_u64_field(fields::REQUIRES_AUTH, INDEXED | STORED | FAST);
    builder.add_u64_field(fields::PARAMETER_COUNT, INDEXED | STORED | FAST);
    builder.add_u64_field(fields::OPTIONAL_PARAMETER_COUNT, INDEXED | STORED | FAST);

    builder.add_text_field(fields::DOC_JSON, STORED);

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_every_weighted_field() {
        let schema = build_schema();
        for (name, _) in FIELD_WEIGHTS.iter() {
            assert!(schema.get_field(name).is_ok(), "missing weighted field {name}");
        }
    }
}
