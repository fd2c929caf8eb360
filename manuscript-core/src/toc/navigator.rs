//! Depth-first "resume where I left off" traversal.
//!
//! [`find_next`] is a pure pre-order successor that wraps to the first
//! section after the last one. [`Cursor`] applies it to a live position and
//! remembers where the session started, so a caller can tell when the next
//! step would come back round to the beginning.

use super::path::SectionPath;
use super::section::SectionTree;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The pre-order successor of `cursor`, wrapping after the last section.
///
/// The empty cursor yields the first top-level section (or the empty path
/// for an empty tree). A cursor that no longer resolves is treated as empty.
pub fn find_next(tree: &SectionTree, cursor: &SectionPath) -> SectionPath {
    if cursor.is_root() {
        return first_section(tree);
    }

    let Some(node) = tree.get(cursor) else {
        warn!(cursor = %cursor, "cursor does not resolve, restarting from the first section");
        return first_section(tree);
    };

    if let Some(first_child) = node.children().keys().next() {
        return cursor.child(*first_child);
    }

    // No children: climb until some ancestor level has a following sibling.
    for depth in (0..cursor.depth()).rev() {
        let parent = cursor.truncated(depth);
        let Some(siblings) = tree.children_of(&parent) else {
            continue;
        };
        let current = cursor.keys()[depth];
        let next = siblings
            .get_index_of(&current)
            .and_then(|pos| siblings.get_index(pos + 1))
            .map(|(key, _)| *key);
        if let Some(key) = next {
            return parent.child(key);
        }
    }

    first_section(tree)
}

fn first_section(tree: &SectionTree) -> SectionPath {
    tree.sections()
        .keys()
        .next()
        .map(|key| SectionPath::from([*key]))
        .unwrap_or_default()
}

/// The live navigation position plus the session's start marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    current: SectionPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<SectionPath>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The section being edited; empty before the first advance.
    pub fn current(&self) -> &SectionPath {
        &self.current
    }

    /// The first non-empty address this session reached.
    pub fn start(&self) -> Option<&SectionPath> {
        self.start.as_ref()
    }

    /// Move one step forward and return the new position.
    ///
    /// The first step that lands on a section fixes the start marker.
    pub fn advance(&mut self, tree: &SectionTree) -> &SectionPath {
        let next = find_next(tree, &self.current);
        debug!(from = %self.current, to = %next, "advancing cursor");
        if self.start.is_none() && !next.is_root() {
            self.start = Some(next.clone());
        }
        self.current = next;
        &self.current
    }

    /// Where [`advance`](Self::advance) would go, without moving.
    pub fn peek(&self, tree: &SectionTree) -> SectionPath {
        find_next(tree, &self.current)
    }

    /// Whether the next step would wrap back to the start marker.
    pub fn at_end(&self, tree: &SectionTree) -> bool {
        self.start
            .as_ref()
            .is_some_and(|start| *start == self.peek(tree))
    }

    /// Jump to `path` without touching the start marker.
    pub fn set(&mut self, path: SectionPath) {
        debug!(to = %path, "cursor repositioned");
        self.current = path;
    }

    /// Forget the position and the start marker.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::section::SectionDraft;
    use proptest::prelude::*;

    fn tree() -> SectionTree {
        // 1
        //   1.1
        //     1.1.1
        //   1.2
        // 2
        let mut tree = SectionTree::new();
        let root = SectionPath::root();
        tree.insert(&root, 1, SectionDraft::new("One")).unwrap();
        tree.insert(&[1].into(), 1, SectionDraft::new("One.One")).unwrap();
        tree.insert(&[1, 1].into(), 1, SectionDraft::new("One.One.One")).unwrap();
        tree.insert(&[1].into(), 2, SectionDraft::new("One.Two")).unwrap();
        tree.insert(&root, 2, SectionDraft::new("Two")).unwrap();
        tree
    }

    #[test]
    fn test_find_next_preorder() {
        let tree = tree();
        let mut cursor = SectionPath::root();
        let mut visited = Vec::new();
        for _ in 0..6 {
            cursor = find_next(&tree, &cursor);
            visited.push(cursor.to_string());
        }
        assert_eq!(visited, vec!["1.", "1.1.", "1.1.1.", "1.2.", "2.", "1."]);
    }

    #[test]
    fn test_find_next_closes_cycle_on_small_tree() {
        let mut tree = SectionTree::new();
        let root = SectionPath::root();
        tree.insert(&root, 1, SectionDraft::new("One")).unwrap();
        tree.insert(&root, 2, SectionDraft::new("Two")).unwrap();
        tree.insert(&[1].into(), 1, SectionDraft::new("One.One")).unwrap();

        assert_eq!(find_next(&tree, &root), SectionPath::from([1]));
        assert_eq!(find_next(&tree, &[1].into()), SectionPath::from([1, 1]));
        assert_eq!(find_next(&tree, &[1, 1].into()), SectionPath::from([2]));
        assert_eq!(find_next(&tree, &[2].into()), SectionPath::from([1]));
    }

    #[test]
    fn test_find_next_follows_insertion_order() {
        let mut tree = SectionTree::new();
        tree.insert(&SectionPath::root(), 5, SectionDraft::new("Five")).unwrap();
        tree.insert(&SectionPath::root(), 2, SectionDraft::new("Two")).unwrap();
        assert_eq!(find_next(&tree, &SectionPath::root()), SectionPath::from([5]));
        assert_eq!(find_next(&tree, &[5].into()), SectionPath::from([2]));
        assert_eq!(find_next(&tree, &[2].into()), SectionPath::from([5]));
    }

    #[test]
    fn test_empty_tree_stays_empty() {
        let tree = SectionTree::new();
        assert!(find_next(&tree, &SectionPath::root()).is_root());

        let mut cursor = Cursor::new();
        assert!(cursor.advance(&tree).is_root());
        assert!(cursor.start().is_none());
        assert!(!cursor.at_end(&tree));
    }

    #[test]
    fn test_dangling_cursor_restarts() {
        let tree = tree();
        assert_eq!(find_next(&tree, &[7, 3].into()), SectionPath::from([1]));
    }

    #[test]
    fn test_start_marker_set_once() {
        let tree = tree();
        let mut cursor = Cursor::new();
        cursor.advance(&tree);
        cursor.advance(&tree);
        assert_eq!(cursor.start(), Some(&SectionPath::from([1])));
        assert_eq!(cursor.current(), &SectionPath::from([1, 1]));
    }

    #[test]
    fn test_at_end_on_last_section() {
        let tree = tree();
        let mut cursor = Cursor::new();
        for _ in 0..4 {
            cursor.advance(&tree);
            assert!(!cursor.at_end(&tree));
        }
        cursor.advance(&tree);
        assert_eq!(cursor.current(), &SectionPath::from([2]));
        assert!(cursor.at_end(&tree));
    }

    #[test]
    fn test_set_keeps_start_marker() {
        let tree = tree();
        let mut cursor = Cursor::new();
        cursor.advance(&tree);
        cursor.set(SectionPath::from([1, 2]));
        assert_eq!(cursor.start(), Some(&SectionPath::from([1])));
        assert_eq!(cursor.peek(&tree), SectionPath::from([2]));
    }

    fn arb_tree() -> impl Strategy<Value = SectionTree> {
        // Each entry attaches a node under a previously created one.
        prop::collection::vec((any::<prop::sample::Index>(), 0u32..50), 1..40).prop_map(|ops| {
            let mut tree = SectionTree::new();
            let mut paths = vec![SectionPath::root()];
            for (parent, key) in ops {
                let parent = parent.get(&paths).clone();
                let path = parent.child(key);
                if tree.contains(&path) {
                    continue;
                }
                if tree.insert(&parent, key, SectionDraft::new(path.to_string())).is_ok() {
                    paths.push(path);
                }
            }
            tree
        })
    }

    proptest! {
        #[test]
        fn prop_cycle_visits_every_section_once(tree in arb_tree()) {
            let expected: Vec<_> = tree.iter().map(|(path, _)| path).collect();
            let mut cursor = Cursor::new();
            let mut visited = vec![cursor.advance(&tree).clone()];
            while !cursor.at_end(&tree) {
                visited.push(cursor.advance(&tree).clone());
                prop_assert!(visited.len() <= expected.len());
            }
            prop_assert_eq!(visited, expected);
        }
    }
}
