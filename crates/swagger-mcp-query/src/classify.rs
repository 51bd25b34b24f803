//! Query-type classification (design §4.4 step 4), consulted by
//! enrichment/suggestion heuristics that behave differently for a bare
//! keyword search versus a field-scoped or boolean one.

use serde::{Deserialize, Serialize};

use crate::parser::ParsedQuery;

/// The classified shape of a query (design §4.4 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// A single free-text term, no operators or qualifiers.
    Simple,
    /// Explicit boolean operators or excluded terms are present.
    Boolean,
    /// One or more `field:value` qualifiers are present.
    FieldSpecific,
    /// Multiple free-text terms with no operators or qualifiers — read as
    /// a natural-language phrase.
    NaturalLanguage,
}

/// Classify a parsed query (design §4.4 step 4). Field-specific wins over
/// boolean, which wins over the free-text term-count distinction, since a
/// qualifier is the strongest signal of user intent.
#[must_use]
pub fn classify(parsed: &ParsedQuery) -> QueryType {
    if !parsed.field_qualifiers.is_empty() {
        return QueryType::FieldSpecific;
    }
    if !parsed.excluded_terms.is_empty() || matches!(parsed.connective, Some(crate::parser::BooleanOp::Or)) {
        return QueryType::Boolean;
    }
    if parsed.free_terms.len() + parsed.wildcard_terms.len() <= 1 {
        QueryType::Simple
    } else {
        QueryType::NaturalLanguage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn single_term_is_simple() {
        assert_eq!(classify(&parse("widget")), QueryType::Simple);
    }

    #[test]
    fn multi_term_is_natural_language() {
        assert_eq!(classify(&parse("list all widgets")), QueryType::NaturalLanguage);
    }

    #[test]
    fn field_qualifier_wins() {
        assert_eq!(classify(&parse("method:GET widgets")), QueryType::FieldSpecific);
    }

    #[test]
    fn or_and_not_are_boolean() {
        assert_eq!(classify(&parse("cat OR dog")), QueryType::Boolean);
        assert_eq!(classify(&parse("cat NOT dog")), QueryType::Boolean);
    }
}
