//! Query-improvement suggestions (design §4.4's final "Suggestions"
//! stage), generated once a search comes back below the low-result
//! threshold: typo fixes, a broader rewrite, substring-similar vocabulary
//! terms, a field-scoped rewrite, and a couple of common API search
//! patterns. At most 5, ranked by confidence.

use std::collections::BTreeMap;

use crate::classify::QueryType;
use crate::model::{Suggestion, SuggestionCategory};
use crate::parser::ParsedQuery;

/// Maximum suggestions returned (design §4.4 "up to 5").
const MAX_SUGGESTIONS: usize = 5;

/// Terms shorter than this are not worth typo-correcting — too many
/// short vocabulary words sit within edit distance 2 of each other.
const MIN_TYPO_CANDIDATE_LEN: usize = 4;

/// Build suggestions for a low-result query. `vocabulary` is a bounded
/// sample of index term frequencies (design-internal: engine.rs draws
/// this from a small unfiltered sample search, not a full term dump).
#[must_use]
pub fn suggest(parsed: &ParsedQuery, query_type: QueryType, vocabulary: &BTreeMap<String, usize>) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    suggestions.extend(typo_fixes(parsed, vocabulary));
    suggestions.extend(broader_query(parsed));
    suggestions.extend(similar_terms(parsed, vocabulary));
    suggestions.extend(field_scoped_rewrites(parsed, query_type));
    suggestions.extend(api_patterns(parsed));

    suggestions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

fn typo_fixes(parsed: &ParsedQuery, vocabulary: &BTreeMap<String, usize>) -> Vec<Suggestion> {
    let mut out = Vec::new();
    for term in &parsed.free_terms {
        if term.len() < MIN_TYPO_CANDIDATE_LEN || vocabulary.contains_key(term) {
            continue;
        }
        let Some((closest, distance)) = vocabulary
            .keys()
            .map(|candidate| (candidate, levenshtein(term, candidate)))
            .filter(|(_, distance)| *distance > 0 && *distance <= 2)
            .min_by_key(|(candidate, distance)| (*distance, candidate.len()))
        else {
            continue;
        };
        let rewritten = replace_term(parsed, term, closest);
        out.push(Suggestion { query: rewritten, category: SuggestionCategory::TypoFix, score: 1.0 / (1.0 + distance as f32) });
    }
    out
}

fn broader_query(parsed: &ParsedQuery) -> Vec<Suggestion> {
    if parsed.free_terms.len() < 2 {
        return Vec::new();
    }
    // Drop the longest term: usually the most specific one, per design
    // §4.4's "broader version of the query (dropped a specific token)".
    let Some(dropped) = parsed.free_terms.iter().max_by_key(|t| t.len()) else { return Vec::new() };
    let remaining: Vec<&String> = parsed.free_terms.iter().filter(|t| *t != dropped).collect();
    if remaining.is_empty() {
        return Vec::new();
    }
    let query = remaining.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" ");
    vec![Suggestion { query, category: SuggestionCategory::BroaderQuery, score: 0.5 }]
}

fn similar_terms(parsed: &ParsedQuery, vocabulary: &BTreeMap<String, usize>) -> Vec<Suggestion> {
    let mut out = Vec::new();
    for term in &parsed.free_terms {
        if term.len() < MIN_TYPO_CANDIDATE_LEN {
            continue;
        }
        let mut matches: Vec<(&String, &usize)> =
            vocabulary.iter().filter(|(candidate, _)| *candidate != term && (candidate.contains(term.as_str()) || term.contains(candidate.as_str()))).collect();
        matches.sort_by(|a, b| b.1.cmp(a.1));
        if let Some((candidate, frequency)) = matches.first() {
            let rewritten = replace_term(parsed, term, candidate);
            let score = 0.3 + (**frequency as f32).min(10.0) / 50.0;
            out.push(Suggestion { query: rewritten, category: SuggestionCategory::SimilarTerm, score });
        }
    }
    out
}

fn field_scoped_rewrites(parsed: &ParsedQuery, query_type: QueryType) -> Vec<Suggestion> {
    if query_type == QueryType::FieldSpecific {
        return Vec::new();
    }
    parsed
        .free_terms
        .first()
        .map(|term| Suggestion { query: format!("path:{term}"), category: SuggestionCategory::FieldScopedRewrite, score: 0.4 })
        .into_iter()
        .collect()
}

fn api_patterns(parsed: &ParsedQuery) -> Vec<Suggestion> {
    let Some(term) = parsed.free_terms.first() else { return Vec::new() };
    vec![
        Suggestion { query: format!("method:GET {term}"), category: SuggestionCategory::ApiPattern, score: 0.25 },
        Suggestion { query: format!("tag:{term}"), category: SuggestionCategory::ApiPattern, score: 0.2 },
    ]
}

/// Rewrite `parsed`'s surface query, substituting `from` with `to`, by
/// reassembling its free terms (qualifiers/exclusions/wildcards carry
/// over unchanged).
fn replace_term(parsed: &ParsedQuery, from: &str, to: &str) -> String {
    let mut parts: Vec<String> = parsed.free_terms.iter().map(|t| if t == from { to.to_string() } else { t.clone() }).collect();
    for qualifier in &parsed.field_qualifiers {
        parts.push(format!("{}:{}", qualifier.field, qualifier.value));
    }
    for excluded in &parsed.excluded_terms {
        parts.push(format!("-{excluded}"));
    }
    parts.join(" ")
}

/// Classic Levenshtein edit distance, used for typo suggestions against
/// the sampled index vocabulary.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for i in 1..=a.len() {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j - 1])
            };
            prev_diag = temp;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn levenshtein_matches_known_distances() {
        assert_eq!(levenshtein("widget", "widget"), 0);
        assert_eq!(levenshtein("widget", "widgetz"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn suggests_a_typo_fix_within_edit_distance_two() {
        let parsed = parse("widgetz");
        let mut vocab = BTreeMap::new();
        vocab.insert("widget".to_string(), 5);
        let suggestions = suggest(&parsed, QueryType::Simple, &vocab);
        assert!(suggestions.iter().any(|s| s.category == SuggestionCategory::TypoFix && s.query == "widget"));
    }

    #[test]
    fn suggests_broader_query_by_dropping_longest_term() {
        let parsed = parse("list all widgets");
        let suggestions = suggest(&parsed, QueryType::NaturalLanguage, &BTreeMap::new());
        assert!(suggestions.iter().any(|s| s.category == SuggestionCategory::BroaderQuery));
    }

    #[test]
    fn caps_total_suggestions() {
        let parsed = parse("widget");
        let mut vocab = BTreeMap::new();
        for i in 0..10 {
            vocab.insert(format!("widgeta{i}"), 1);
        }
        let suggestions = suggest(&parsed, QueryType::Simple, &vocab);
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
    }
}
