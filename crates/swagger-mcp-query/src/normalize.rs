//! Term normalization (design §4.4 step 2): stop-word removal and Porter
//! stemming, reusing `tantivy`'s own tokenizer pipeline (the same
//! Porter-stemmed analyzer the weighted index's free-text fields are
//! built with) rather than a second, hand-rolled implementation.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use tantivy::tokenizer::{Language, LowerCaser, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer, TokenStream};

/// A minimal English stop-word list (design §4.4 step 2 "remove
/// stop-words"), used both here and by [`crate::suggest`]'s empty-query
/// detection.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "be", "been", "of",
        "to", "in", "on", "at", "for", "with", "by", "from", "as", "it", "this", "that",
    ]
    .into_iter()
    .collect()
});

/// A normalized term alongside its pre-stem surface form (needed for
/// vocabulary/typo suggestion matching, which compares against surface
/// forms, not stems).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTerm {
    /// The original (already-lowercased) term.
    pub surface: String,
    /// The Porter-stemmed form.
    pub stem: String,
}

fn build_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| (*s).to_string()).collect()))
        .filter(Stemmer::new(Language::English))
        .build()
}

/// Stop-word-filter and stem a sequence of free-text terms, dropping any
/// term that stop-word removal consumes entirely.
#[must_use]
pub fn normalize_terms(terms: &[String]) -> Vec<NormalizedTerm> {
    let mut analyzer = build_analyzer();
    let mut out = Vec::with_capacity(terms.len());
    for term in terms {
        let mut stream = analyzer.token_stream(term);
        if let Some(token) = stream.next() {
            out.push(NormalizedTerm { surface: term.clone(), stem: token.text.clone() });
        }
    }
    out
}

/// Whether every term in `terms` is a stop word (design §8 boundary
/// behavior: "Query with only stop-words: same as empty").
#[must_use]
pub fn all_stop_words(terms: &[String]) -> bool {
    !terms.is_empty() && terms.iter().all(|t| STOP_WORDS.contains(t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_plural_nouns_toward_a_shared_root() {
        let normalized = normalize_terms(&["users".to_string(), "user".to_string()]);
        assert_eq!(normalized[0].stem, normalized[1].stem);
    }

    #[test]
    fn drops_pure_stop_words() {
        let normalized = normalize_terms(&["the".to_string(), "widget".to_string()]);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].surface, "widget");
    }

    #[test]
    fn detects_all_stop_word_queries() {
        assert!(all_stop_words(&["the".to_string(), "a".to_string()]));
        assert!(!all_stop_words(&["the".to_string(), "widget".to_string()]));
        assert!(!all_stop_words(&[]));
    }
}
