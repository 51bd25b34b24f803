//! Path-segment filtering shared by C2's category-key fallback (design
//! §4.2 step 3) and C3's `SearchDocument::resource_name` derivation
//! (design §3): strips path parameters, the literal `api` segment,
//! version segments (`v1`..`v9`), and single-character tokens, since none
//! of those identify a resource.

/// Whether `segment` looks like a version marker (`v1`, `v2`, ..., `v9`).
#[must_use]
pub fn is_version_segment(segment: &str) -> bool {
    segment.len() == 2 && segment.starts_with('v') && segment[1..].chars().all(|c| c.is_ascii_digit())
}

/// The path's segments with parameters, `api`, version markers, and
/// single-character tokens removed, in path order.
#[must_use]
pub fn meaningful_path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .filter(|s| !s.starts_with('{'))
        .filter(|s| *s != "api")
        .filter(|s| !is_version_segment(s))
        .filter(|s| s.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_parameters_api_and_version_segments() {
        assert_eq!(meaningful_path_segments("/api/v1/users/{id}"), vec!["users"]);
        assert_eq!(meaningful_path_segments("/v2/orders/{orderId}/items"), vec!["orders", "items"]);
    }

    #[test]
    fn strips_single_character_tokens() {
        assert_eq!(meaningful_path_segments("/a/widgets"), vec!["widgets"]);
    }

    #[test]
    fn recognizes_only_single_digit_version_segments() {
        assert!(is_version_segment("v1"));
        assert!(is_version_segment("v9"));
        assert!(!is_version_segment("v10"));
        assert!(!is_version_segment("value"));
    }
}
