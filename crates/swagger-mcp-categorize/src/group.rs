//! Category group assignment (design §4.2 step 4): endpoints whose
//! category tag appears in one of the document's `x-tagGroups` entries
//! inherit that group's name; everything else lands in a synthetic
//! `"Other"` group so every category always has a group.

use std::collections::HashMap;

use swagger_mcp_normalize::model::TagGroup;

/// Build a tag name -> group name lookup from the document's `x-tagGroups`.
#[must_use]
pub fn build_tag_to_group_map(tag_groups: &[TagGroup]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for group in tag_groups {
        for tag in &group.tags {
            map.insert(tag.clone(), group.name.clone());
        }
    }
    map
}

/// The synthetic group name for anything not covered by `x-tagGroups`.
pub const OTHER_GROUP: &str = "Other";

/// Resolve the group for an endpoint given its first declared tag (if any).
#[must_use]
pub fn assign_group(first_tag: Option<&str>, tag_to_group: &HashMap<String, String>) -> String {
    first_tag
        .and_then(|tag| tag_to_group.get(tag).cloned())
        .unwrap_or_else(|| OTHER_GROUP.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_in_a_group_resolves_to_that_group() {
        let groups = vec![TagGroup { name: "Commerce".to_string(), tags: vec!["orders".to_string()] }];
        let map = build_tag_to_group_map(&groups);
        assert_eq!(assign_group(Some("orders"), &map), "Commerce");
    }

    #[test]
    fn unmatched_tag_falls_back_to_other() {
        let map = build_tag_to_group_map(&[]);
        assert_eq!(assign_group(Some("mystery"), &map), OTHER_GROUP);
        assert_eq!(assign_group(None, &map), OTHER_GROUP);
    }
}
