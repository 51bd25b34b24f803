//! Term expansion (design §4.4 step 3): a small API-domain synonym table
//! plus simple plural/singular pairing, bounded to at most 3 variants per
//! token so fanout stays capped.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Maximum expansion variants added per input token (design §4.4
/// "bounded (at most 3 variants per token)").
pub const MAX_VARIANTS_PER_TOKEN: usize = 3;

/// API-domain synonym pairs (design §4.4 "e.g. user<->customer,
/// get<->retrieve, list<->index"). Stored as an undirected adjacency map:
/// looking up either side of a pair yields the other.
static SYNONYMS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let pairs: &[(&str, &[&str])] = &[
        ("user", &["customer", "account"]),
        ("customer", &["user", "account"]),
        ("get", &["retrieve", "fetch"]),
        ("retrieve", &["get", "fetch"]),
        ("list", &["index", "all"]),
        ("index", &["list"]),
        ("create", &["add", "new"]),
        ("add", &["create", "new"]),
        ("delete", &["remove", "destroy"]),
        ("remove", &["delete", "destroy"]),
        ("update", &["modify", "edit"]),
        ("modify", &["update", "edit"]),
        ("order", &["purchase", "transaction"]),
        ("product", &["item", "good"]),
        ("item", &["product"]),
        ("auth", &["authentication", "login"]),
        ("authentication", &["auth", "login"]),
    ];
    pairs.iter().map(|(k, v)| (*k, v.to_vec())).collect()
});

/// Expand one normalized term into itself plus up to
/// [`MAX_VARIANTS_PER_TOKEN`] synonym/plural variants (design §4.4 step 3).
#[must_use]
pub fn expand_term(term: &str) -> Vec<String> {
    let mut variants = vec![term.to_string()];

    if let Some(synonyms) = SYNONYMS.get(term) {
        for syn in synonyms {
            if variants.len() > MAX_VARIANTS_PER_TOKEN {
                break;
            }
            variants.push((*syn).to_string());
        }
    }

    if variants.len() <= MAX_VARIANTS_PER_TOKEN {
        if let Some(plural_pair) = plural_singular_pair(term) {
            if !variants.contains(&plural_pair) {
                variants.push(plural_pair);
            }
        }
    }

    variants.truncate(MAX_VARIANTS_PER_TOKEN + 1); // +1 for the term itself
    variants
}

/// A naive plural<->singular pairing: strip a trailing `s` or `es`, or add
/// one. Not linguistically complete — good enough for the common REST
/// noun case this query language targets (`orders` <-> `order`).
fn plural_singular_pair(term: &str) -> Option<String> {
    if let Some(stripped) = term.strip_suffix("es") {
        if stripped.len() >= 2 {
            return Some(stripped.to_string());
        }
    }
    if let Some(stripped) = term.strip_suffix('s') {
        if stripped.len() >= 2 {
            return Some(stripped.to_string());
        }
    }
    if !term.is_empty() {
        Some(format!("{term}s"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_a_known_synonym_pair() {
        let variants = expand_term("user");
        assert!(variants.contains(&"customer".to_string()));
    }

    #[test]
    fn expands_plural_to_singular() {
        let variants = expand_term("orders");
        assert!(variants.contains(&"order".to_string()));
    }

    #[test]
    fn caps_total_variants() {
        let variants = expand_term("user");
        assert!(variants.len() <= MAX_VARIANTS_PER_TOKEN + 1);
    }

    #[test]
    fn unknown_term_still_gets_a_plural_variant() {
        let variants = expand_term("widget");
        assert!(variants.contains(&"widgets".to_string()));
    }
}
