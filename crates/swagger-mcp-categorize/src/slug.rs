//! Category-key slugging (design §4.2 Open Question: "category-key
//! slugging rule"). Pinned to a simple, deterministic transform: lowercase,
//! collapse any run of non-alphanumeric characters to a single dash, and
//! trim leading/trailing dashes. No attempt at pluralization-aware
//! stemming — the display name is what carries the original casing.

/// Turn a display name (tag, resource noun, or path segment) into a stable
/// category key.
#[must_use]
pub fn slugify(display_name: &str) -> String {
    let mut slug = String::with_capacity(display_name.len());
    let mut last_was_dash = true; // suppresses a leading dash
    for ch in display_name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "uncategorized".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_separators() {
        assert_eq!(slugify("Pet Store"), "pet-store");
        assert_eq!(slugify("User_Accounts"), "user-accounts");
        assert_eq!(slugify("  Orders  "), "orders");
    }

    #[test]
    fn collapses_runs_of_punctuation() {
        assert_eq!(slugify("A/B--C"), "a-b-c");
    }

    #[test]
    fn empty_input_falls_back_to_uncategorized() {
        assert_eq!(slugify("   "), "uncategorized");
        assert_eq!(slugify(""), "uncategorized");
    }
}
