//! # Top-K Selector
//!
//! Picks the highest-scoring nodes after a ranking operation.
//!
//! All collections are concatenated in [`NodeStore::SELECTION_ORDER`]
//! (buildings, locks, media, groups), sorted by descending score with a
//! stable sort, and cut to `k`. Nodes with equal scores keep their
//! concatenation order. A `k` larger than the node count returns every node.

use crate::{Node, NodeStore, SearchError};
use std::cmp::Reverse;

/// Return the `k` highest-scoring nodes, best first.
///
/// Fails with `DataNotLoaded` if any collection is absent.
pub fn top_k(store: &NodeStore, k: usize) -> Result<Vec<&Node>, SearchError> {
    let mut all: Vec<&Node> = store.iter_selection_order()?.collect();
    // slice::sort_by_key is stable
    all.sort_by_key(|node| Reverse(node.score));
    all.truncate(k);
    Ok(all)
}

/// Owned variant of [`top_k`], for results that must outlive a store borrow.
pub fn top_k_owned(store: &NodeStore, k: usize) -> Result<Vec<Node>, SearchError> {
    Ok(top_k(store, k)?.into_iter().cloned().collect())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;

    fn scored(kind: NodeKind, id: &str, score: u64) -> Node {
        let mut node = Node::new(kind, id);
        node.score = score;
        node
    }

    fn store_with(
        buildings: Vec<Node>,
        locks: Vec<Node>,
        groups: Vec<Node>,
        media: Vec<Node>,
    ) -> NodeStore {
        NodeStore::new()
            .with_collection(NodeKind::Building, buildings)
            .and_then(|s| s.with_collection(NodeKind::Lock, locks))
            .and_then(|s| s.with_collection(NodeKind::Group, groups))
            .and_then(|s| s.with_collection(NodeKind::Medium, media))
            .expect("valid store")
    }

    fn ids(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn returns_descending_scores() {
        let store = store_with(
            vec![scored(NodeKind::Building, "b1", 5)],
            vec![scored(NodeKind::Lock, "l1", 50), scored(NodeKind::Lock, "l2", 1)],
            vec![scored(NodeKind::Group, "g1", 20)],
            vec![],
        );

        let result = top_k(&store, 3).expect("loaded");

        assert_eq!(ids(&result), vec!["l1", "g1", "b1"]);
    }

    #[test]
    fn k_larger_than_count_is_clamped() {
        let store = store_with(
            vec![scored(NodeKind::Building, "b1", 1)],
            vec![scored(NodeKind::Lock, "l1", 2)],
            vec![],
            vec![],
        );

        let result = top_k(&store, 10).expect("loaded");

        assert_eq!(ids(&result), vec!["l1", "b1"]);
    }

    #[test]
    fn k_zero_returns_nothing() {
        let store = store_with(vec![scored(NodeKind::Building, "b1", 3)], vec![], vec![], vec![]);
        assert!(top_k(&store, 0).expect("loaded").is_empty());
    }

    #[test]
    fn ties_keep_concatenation_order() {
        let store = store_with(
            vec![scored(NodeKind::Building, "b1", 7)],
            vec![scored(NodeKind::Lock, "l1", 7)],
            vec![scored(NodeKind::Group, "g1", 7)],
            vec![scored(NodeKind::Medium, "m1", 7)],
        );

        let result = top_k(&store, 4).expect("loaded");

        // buildings, locks, media, groups
        assert_eq!(ids(&result), vec!["b1", "l1", "m1", "g1"]);
    }

    #[test]
    fn absent_collection_is_data_not_loaded() {
        let store = NodeStore::new();
        assert!(matches!(
            top_k(&store, 1),
            Err(SearchError::DataNotLoaded(_))
        ));
    }

    #[test]
    fn owned_variant_matches_borrowed() {
        let store = store_with(
            vec![scored(NodeKind::Building, "b1", 2)],
            vec![scored(NodeKind::Lock, "l1", 9)],
            vec![],
            vec![],
        );
        let owned = top_k_owned(&store, 2).expect("loaded");
        let borrowed = top_k(&store, 2).expect("loaded");
        assert_eq!(owned.iter().collect::<Vec<_>>(), borrowed);
    }
}
