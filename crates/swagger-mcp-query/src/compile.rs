//! Query compilation (design §4.4 step 5 "Compile"): turns the parsed,
//! normalized, and expanded query into a `tantivy` [`Query`].
//!
//! Field-specific terms become exact-match [`TermQuery`]s on their bound
//! field. Free-text terms form an OR-group: one boosted [`TermQuery`] per
//! `(term, weighted field)` pair, using the same per-field weights the
//! index was built with (design §4.3.2's weight table), combined in a
//! single [`BooleanQuery`] — the standard way to approximate BM25F
//! (per-field BM25 plus linear field-weight combination) on top of
//! `tantivy`'s single-field BM25 scorer. Excluded terms become `MustNot`
//! clauses; wildcards become [`RegexQuery`]s converted from glob syntax.

use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{IndexRecordOption, Schema};
use tantivy::Term;

use swagger_mcp_foundation::{Error, Result};
use swagger_mcp_storage::search_index::schema::{fields, FIELD_WEIGHTS};

use crate::parser::{FieldQualifier, ParsedQuery};

/// Map a recognized query-language field name (design §4.4 "Recognized
/// fields") to the weighted index field it binds to.
fn resolve_field_qualifier_target(name: &str) -> &'static str {
    match name {
        "path" => fields::ENDPOINT_PATH,
        "method" => fields::METHOD,
        "tag" => fields::TAGS,
        "status" => fields::STATUS_CODES,
        "param" => fields::PARAMETER_NAMES,
        "auth" => fields::SECURITY_SCHEMES,
        "type" => fields::OPERATION_TYPE,
        "response" => fields::CONTENT_TYPES,
        _ => fields::SEARCHABLE_TEXT, // "format" and anything unrecognized: best-effort
    }
}

/// Build the compiled query for one pass (design §4.4 steps 5-6, minus
/// the fuzzy fallback which [`crate::engine`] adds conditionally after
/// seeing the first pass's hit count).
///
/// `expanded_free_terms` is the synonym/plural-expanded term set per
/// original free-text term (design §4.4 step 3); each inner `Vec` is
/// OR-combined with the others before the outer OR-group across fields.
pub fn compile(schema: &Schema, parsed: &ParsedQuery, expanded_free_terms: &[Vec<String>]) -> Result<Box<dyn Query>> {
    let mut must: Vec<(Occur, Box<dyn Query>)> = Vec::new();
    let mut should: Vec<(Occur, Box<dyn Query>)> = Vec::new();

    for qualifier in &parsed.field_qualifiers {
        must.push((Occur::Must, build_field_term_query(schema, qualifier)?));
    }

    for variants in expanded_free_terms {
        for (field_name, weight) in FIELD_WEIGHTS.iter() {
            let field = schema
                .get_field(field_name)
                .map_err(|e| Error::internal(format!("weighted index missing field '{field_name}': {e}")))?;
            for term_text in variants {
                let term = Term::from_field_text(field, term_text);
                let term_query: Box<dyn Query> = Box::new(TermQuery::new(term, IndexRecordOption::WithFreqsAndPositions));
                should.push((Occur::Should, Box::new(BoostQuery::new(term_query, *weight))));
            }
        }
    }

    for wildcard in &parsed.wildcard_terms {
        let pattern = glob_to_regex(wildcard);
        let field = schema
            .get_field(fields::SEARCHABLE_TEXT)
            .map_err(|e| Error::internal(format!("weighted index missing searchable_text field: {e}")))?;
        let query = RegexQuery::from_pattern(&pattern, field)
            .map_err(|e| Error::query_syntax(format!("invalid wildcard pattern '{wildcard}': {e}")))?;
        should.push((Occur::Should, Box::new(query)));
    }

    for excluded in &parsed.excluded_terms {
        let field = schema
            .get_field(fields::SEARCHABLE_TEXT)
            .map_err(|e| Error::internal(format!("weighted index missing searchable_text field: {e}")))?;
        let term = Term::from_field_text(field, excluded);
        must.push((Occur::MustNot, Box::new(TermQuery::new(term, IndexRecordOption::Basic))));
    }

    if !should.is_empty() {
        must.push((Occur::Must, Box::new(BooleanQuery::new(should))));
    }

    if must.is_empty() {
        return Ok(Box::new(tantivy::query::AllQuery));
    }

    Ok(Box::new(BooleanQuery::new(must)))
}

/// Add a fuzzy (edit-distance <= 2) variant of `term` against the
/// composite searchable-text field, OR-combined into `base` (design
/// §4.4 step 5 "short-result fallback adds a fuzzy variant per long term").
pub fn with_fuzzy_fallback(schema: &Schema, base: Box<dyn Query>, long_terms: &[String]) -> Result<Box<dyn Query>> {
    if long_terms.is_empty() {
        return Ok(base);
    }
    let field = schema
        .get_field(fields::SEARCHABLE_TEXT)
        .map_err(|e| Error::internal(format!("weighted index missing searchable_text field: {e}")))?;

    let mut should: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Should, base)];
    for term_text in long_terms {
        let term = Term::from_field_text(field, term_text);
        should.push((Occur::Should, Box::new(tantivy::query::FuzzyTermQuery::new(term, 2, true))));
    }
    Ok(Box::new(BooleanQuery::new(should)))
}

fn build_field_term_query(schema: &Schema, qualifier: &FieldQualifier) -> Result<Box<dyn Query>> {
    let target = resolve_field_qualifier_target(&qualifier.field);
    let field = schema
        .get_field(target)
        .map_err(|e| Error::internal(format!("weighted index missing field '{target}': {e}")))?;
    let value = if target == fields::METHOD { qualifier.value.to_uppercase() } else { qualifier.value.to_lowercase() };
    let term = Term::from_field_text(field, &value);
    Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
}

/// Convert a `*`/`?` glob pattern into an anchored regex for
/// [`RegexQuery`]. `*` -> `.*`, `?` -> `.`, everything else is escaped.
fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::with_capacity(glob.len() + 2);
    pattern.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c if "\\.+^$()[]{}|".contains(c) => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }
    pattern.push('$');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_translates_wildcards_to_regex() {
        assert_eq!(glob_to_regex("us?r*"), "^us.r.*$");
    }

    #[test]
    fn resolves_known_field_qualifiers() {
        assert_eq!(resolve_field_qualifier_target("method"), fields::METHOD);
        assert_eq!(resolve_field_qualifier_target("tag"), fields::TAGS);
        assert_eq!(resolve_field_qualifier_target("unknown"), fields::SEARCHABLE_TEXT);
    }
}
