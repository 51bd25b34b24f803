//! Structured filter application (design §4.4 step 6 "Apply filters"):
//! [`SearchFilters`] become additional `Must`/`MustNot` clauses layered on
//! top of the compiled free-text query, not a second ranking signal —
//! filters narrow the candidate set, they never affect score (design §8
//! "Monotone filtering: adding any filter never increases the result set").

use tantivy::query::{BooleanQuery, Occur, Query, RangeQuery, TermQuery};
use tantivy::schema::{IndexRecordOption, Schema};
use tantivy::Term;

use swagger_mcp_foundation::{Error, Result};
use swagger_mcp_storage::search_index::schema::fields;

use crate::model::SearchFilters;

/// Wrap `base` with `filters`' constraints. Returns `base` unchanged when
/// `filters` is empty (the default), so an unfiltered search pays no cost.
pub fn apply(schema: &Schema, base: Box<dyn Query>, filters: &SearchFilters) -> Result<Box<dyn Query>> {
    if is_empty(filters) {
        return Ok(base);
    }

    let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, base)];

    if !filters.methods.is_empty() {
        clauses.push((Occur::Must, any_of(schema, fields::METHOD, &uppercase_all(&filters.methods))?));
    }

    if let Some(requires_auth) = filters.requires_auth {
        clauses.push((Occur::Must, u64_term_query(schema, fields::REQUIRES_AUTH, u64::from(requires_auth))?));
    }

    if !filters.security_schemes.is_empty() {
        clauses.push((Occur::Must, any_of(schema, fields::SECURITY_SCHEMES, &filters.security_schemes)?));
    }

    if filters.required_params_only {
        clauses.push((Occur::Must, u64_term_query(schema, fields::OPTIONAL_PARAMETER_COUNT, 0)?));
    }

    if !filters.parameter_names.is_empty() {
        clauses.push((Occur::Must, any_of(schema, fields::PARAMETER_NAMES, &lowercase_all(&filters.parameter_names))?));
    }

    if let Some(max_parameters) = filters.max_parameters {
        clauses.push((Occur::Must, u64_range_query(schema, fields::PARAMETER_COUNT, 0, u64::from(max_parameters))?));
    }

    if filters.has_file_upload {
        clauses.push((Occur::Must, term_query(schema, fields::OPERATION_TYPE, "upload")?));
    }

    if !filters.response_content_types.is_empty() {
        clauses.push((Occur::Must, any_of(schema, fields::CONTENT_TYPES, &filters.response_content_types)?));
    }

    // `complexity_levels` filters on a value computed at enrichment time
    // (step 8), not stored in the index; `crate::engine` applies it as a
    // post-enrichment, pre-pagination filter instead of an index query.

    if !filters.tags.is_empty() {
        clauses.push((Occur::Must, any_of(schema, fields::TAGS, &lowercase_all(&filters.tags))?));
    }

    if !filters.include_deprecated {
        clauses.push((Occur::MustNot, u64_term_query(schema, fields::DEPRECATED, 1)?));
    }

    Ok(Box::new(BooleanQuery::new(clauses)))
}

fn is_empty(filters: &SearchFilters) -> bool {
    filters.methods.is_empty()
        && filters.requires_auth.is_none()
        && filters.security_schemes.is_empty()
        && !filters.required_params_only
        && filters.parameter_names.is_empty()
        && filters.max_parameters.is_none()
        && !filters.has_file_upload
        && filters.response_content_types.is_empty()
        && filters.complexity_levels.is_empty()
        && filters.tags.is_empty()
        && filters.include_deprecated
}

fn any_of(schema: &Schema, field_name: &str, values: &[String]) -> Result<Box<dyn Query>> {
    let field = schema
        .get_field(field_name)
        .map_err(|e| Error::internal(format!("weighted index missing field '{field_name}': {e}")))?;
    let clauses: Vec<(Occur, Box<dyn Query>)> = values
        .iter()
        .map(|value| {
            let term = Term::from_field_text(field, value);
            (Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::Basic)) as Box<dyn Query>)
        })
        .collect();
    Ok(Box::new(BooleanQuery::new(clauses)))
}

fn term_query(schema: &Schema, field_name: &str, value: &str) -> Result<Box<dyn Query>> {
    let field = schema
        .get_field(field_name)
        .map_err(|e| Error::internal(format!("weighted index missing field '{field_name}': {e}")))?;
    let term = Term::from_field_text(field, value);
    Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
}

fn u64_term_query(schema: &Schema, field_name: &str, value: u64) -> Result<Box<dyn Query>> {
    let field = schema
        .get_field(field_name)
        .map_err(|e| Error::internal(format!("weighted index missing field '{field_name}': {e}")))?;
    let term = Term::from_field_u64(field, value);
    Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
}

fn u64_range_query(schema: &Schema, field_name: &str, min: u64, max_inclusive: u64) -> Result<Box<dyn Query>> {
    let field = schema
        .get_field(field_name)
        .map_err(|e| Error::internal(format!("weighted index missing field '{field_name}': {e}")))?;
    Ok(Box::new(RangeQuery::new_u64(field, min..max_inclusive.saturating_add(1))))
}

fn uppercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_uppercase()).collect()
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_mcp_storage::search_index::schema::build_schema;
    use tantivy::query::AllQuery;

    #[test]
    fn empty_filters_pass_base_query_through() {
        let schema = build_schema();
        let filters = SearchFilters::default();
        let compiled = apply(&schema, Box::new(AllQuery), &filters).expect("apply");
        assert_eq!(format!("{compiled:?}"), format!("{:?}", Box::new(AllQuery) as Box<dyn Query>));
    }

    #[test]
    fn method_filter_wraps_the_base_query() {
        let schema = build_schema();
        let filters = SearchFilters { methods: vec!["get".to_string()], ..Default::default() };
        let compiled = apply(&schema, Box::new(AllQuery), &filters).expect("apply");
        assert_ne!(format!("{compiled:?}"), format!("{:?}", Box::new(AllQuery) as Box<dyn Query>));
    }

    #[test]
    fn max_parameters_compiles_a_range_query() {
        let schema = build_schema();
        let filters = SearchFilters { max_parameters: Some(3), ..Default::default() };
        assert!(apply(&schema, Box::new(AllQuery), &filters).is_ok());
    }
}
