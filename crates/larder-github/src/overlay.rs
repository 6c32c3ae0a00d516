//! Copy-on-write tree overlay.
//!
//! A new tree inherits every binding of its base tree except the paths being
//! written, which are replaced or added. This is the semantics GitHub applies
//! to `POST /git/trees` with a `base_tree`, expressed over a plain
//! path-to-address map so it can be checked without a remote.

use std::collections::BTreeMap;

use crate::types::TreeEntry;

/// Flattened tree: repo-relative path to blob address.
pub type TreeMap = BTreeMap<String, String>;

/// Layer `entries` onto `base`, returning the resulting tree.
///
/// Later entries for the same path win.
#[must_use]
pub fn overlay(base: &TreeMap, entries: &[TreeEntry]) -> TreeMap {
    let mut tree = base.clone();
    for entry in entries {
        tree.insert(entry.path.clone(), entry.sha.clone());
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(pairs: &[(&str, &str)]) -> TreeMap {
        pairs
            .iter()
            .map(|(p, s)| ((*p).to_string(), (*s).to_string()))
            .collect()
    }

    #[test]
    fn test_overlay_replaces_and_adds() {
        let base = tree(&[("a.md", "1"), ("b.md", "2")]);
        let entries = [TreeEntry::blob("b.md", "3"), TreeEntry::blob("c.md", "4")];

        let result = overlay(&base, &entries);

        assert_eq!(result, tree(&[("a.md", "1"), ("b.md", "3"), ("c.md", "4")]));
    }

    #[test]
    fn test_overlay_leaves_base_untouched() {
        let base = tree(&[("a.md", "1")]);
        let _ = overlay(&base, &[TreeEntry::blob("a.md", "2")]);

        assert_eq!(base, tree(&[("a.md", "1")]));
    }

    #[test]
    fn test_overlay_empty_entries_is_identity() {
        let base = tree(&[("a.md", "1"), ("nested/b.md", "2")]);
        assert_eq!(overlay(&base, &[]), base);
    }

    #[test]
    fn test_overlay_last_write_wins() {
        let entries = [TreeEntry::blob("a.md", "1"), TreeEntry::blob("a.md", "2")];
        assert_eq!(overlay(&TreeMap::new(), &entries), tree(&[("a.md", "2")]));
    }
}
