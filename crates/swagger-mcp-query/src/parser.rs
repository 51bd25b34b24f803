//! Query-language parsing (design §4.4 step 1 "Parse"): field qualifiers,
//! boolean operators, excluded terms, and wildcards, extracted from the
//! raw query string before the free-text remainder is normalized.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Index fields the `field:value` qualifier syntax may bind to (design
/// §4.4 "Recognized fields").
pub static RECOGNIZED_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["path", "method", "auth", "param", "response", "status", "tag", "type", "format"].into_iter().collect()
});

/// One `field:value` qualifier extracted from the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldQualifier {
    /// The recognized field name.
    pub field: String,
    /// The value bound to it.
    pub value: String,
}

/// The boolean connective joining two free-text terms (design §4.4
/// "Boolean operators `AND`, `OR`, `NOT`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Explicit `AND` (also the implicit default between bare terms).
    And,
    /// Explicit `OR`.
    Or,
}

/// The result of parsing a raw query string (design §4.4 step 1).
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    /// Free-text terms remaining after qualifiers/operators are stripped.
    pub free_terms: Vec<String>,
    /// The connective to use between free-text terms (`OR` if any
    /// explicit `OR` appeared, `AND` otherwise).
    pub connective: Option<BooleanOp>,
    /// Terms explicitly excluded via `NOT term` or a leading `-term`.
    pub excluded_terms: Vec<String>,
    /// `field:value` qualifiers.
    pub field_qualifiers: Vec<FieldQualifier>,
    /// Free-text terms containing `*` or `?` wildcard characters.
    pub wildcard_terms: Vec<String>,
    /// Whether the raw query was empty or contained only stop-words-like
    /// noise (populated later by the normalize step; `false` here).
    pub was_malformed: bool,
}

/// Parse `raw` into a [`ParsedQuery`]. Never fails: anything that doesn't
/// parse as a qualifier or operator is treated as a plain free-text term,
/// per design §4.4's "Failure semantics" (invalid syntax degrades to
/// best-effort free text, it never errors out of this step).
#[must_use]
pub fn parse(raw: &str) -> ParsedQuery {
    let mut result = ParsedQuery::default();
    let mut saw_or = false;

    for token in raw.split_whitespace() {
        if token.eq_ignore_ascii_case("AND") && token == "AND" {
            continue; // redundant connective, default behavior already AND
        }
        if token == "OR" {
            saw_or = true;
            continue;
        }
        if token == "NOT" {
            continue; // the following token is excluded, handled by '-'-prefix form below
        }

        if let Some(rest) = token.strip_prefix('-') {
            if !rest.is_empty() {
                result.excluded_terms.push(rest.to_lowercase());
                continue;
            }
        }

        if let Some((field, value)) = token.split_once(':') {
            let field_lower = field.to_lowercase();
            if RECOGNIZED_FIELDS.contains(field_lower.as_str()) && !value.is_empty() {
                result.field_qualifiers.push(FieldQualifier { field: field_lower, value: value.to_string() });
                continue;
            }
        }

        if token.contains('*') || token.contains('?') {
            result.wildcard_terms.push(token.to_lowercase());
            continue;
        }

        result.free_terms.push(token.to_lowercase());
    }

    // NOT <term> form: a bare NOT keyword followed immediately by a term
    // already landed that term in `free_terms` above (NOT was skipped as
    // a no-op token); re-scan the raw token stream to catch that case.
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    for window in tokens.windows(2) {
        if window[0] == "NOT" {
            let candidate = window[1].to_lowercase();
            if let Some(pos) = result.free_terms.iter().position(|t| *t == candidate) {
                result.free_terms.remove(pos);
                result.excluded_terms.push(candidate);
            }
        }
    }

    result.connective = if saw_or { Some(BooleanOp::Or) } else { Some(BooleanOp::And) };
    result.was_malformed = result.free_terms.is_empty()
        && result.excluded_terms.is_empty()
        && result.field_qualifiers.is_empty()
        && result.wildcard_terms.is_empty();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_terms_with_implicit_and() {
        let parsed = parse("user account");
        assert_eq!(parsed.free_terms, vec!["user".to_string(), "account".to_string()]);
        assert_eq!(parsed.connective, Some(BooleanOp::And));
    }

    #[test]
    fn recognizes_or_and_not() {
        let parsed = parse("cat OR dog NOT fish");
        assert_eq!(parsed.connective, Some(BooleanOp::Or));
        assert!(parsed.excluded_terms.contains(&"fish".to_string()));
        assert!(!parsed.free_terms.contains(&"fish".to_string()));
    }

    #[test]
    fn extracts_recognized_field_qualifiers() {
        let parsed = parse("method:GET users");
        assert_eq!(parsed.field_qualifiers, vec![FieldQualifier { field: "method".to_string(), value: "GET".to_string() }]);
        assert_eq!(parsed.free_terms, vec!["users".to_string()]);
    }

    #[test]
    fn unrecognized_field_like_token_falls_back_to_free_text() {
        let parsed = parse("notafield:value");
        assert!(parsed.field_qualifiers.is_empty());
        assert_eq!(parsed.free_terms, vec!["notafield:value".to_string()]);
    }

    #[test]
    fn extracts_wildcard_terms() {
        let parsed = parse("us?r acc*");
        assert_eq!(parsed.wildcard_terms, vec!["us?r".to_string(), "acc*".to_string()]);
    }

    #[test]
    fn dash_prefixed_term_is_excluded() {
        let parsed = parse("user -admin");
        assert_eq!(parsed.excluded_terms, vec!["admin".to_string()]);
    }

    #[test]
    fn empty_query_is_malformed() {
        assert!(parse("").was_malformed);
        assert!(parse("   ").was_malformed);
    }
}
