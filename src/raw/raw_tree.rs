use core::borrow::Borrow;

use super::node::{MAX_KEYS, Node, SearchResult};
use super::node_id::NodeId;
use super::slab::Slab;
use crate::tracing_helpers::{debug_log, trace_log};

/// The core 2-3 tree backing `TwoThreeTree`.
#[derive(Clone)]
pub(crate) struct RawTwoThreeTree<K> {
    /// Slab owning every node; links between nodes are ids into it.
    nodes: Slab<Node<K>>,
    /// Root node, if the tree is non-empty.
    root: Option<NodeId>,
    /// Number of keys in the tree.
    len: usize,
}

impl<K> RawTwoThreeTree<K> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
            len: 0,
        }
    }

    /// A tree of `capacity` keys needs at most `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes currently allocated.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Releases a node that is no longer linked from anywhere.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K> {
        self.nodes.remove(id)
    }

    /// Number of levels; a lone leaf root is one level.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            height += 1;
            current = self.nodes.get(id).children().first().copied();
        }
        height
    }

    /// Follows first-child links from `id` down to a leaf.
    pub(crate) fn leftmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some(&first) = self.nodes.get(id).children().first() {
            id = first;
        }
        id
    }

    /// Follows last-child links from `id` down to a leaf.
    pub(crate) fn rightmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some(&last) = self.nodes.get(id).children().last() {
            id = last;
        }
        id
    }

    pub(crate) fn first(&self) -> Option<&K> {
        let leaf = self.leftmost_leaf(self.root?);
        self.nodes.get(leaf).keys().first()
    }

    pub(crate) fn last(&self) -> Option<&K> {
        let leaf = self.rightmost_leaf(self.root?);
        self.nodes.get(leaf).keys().last()
    }

    /// Replaces a keyless root by its only child, or drops it when it has none.
    fn shrink_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };

        let node = self.nodes.get(root);
        if node.key_count() > 0 {
            return;
        }

        match *node.children() {
            [] => {
                self.nodes.remove(root);
                self.root = None;
                debug_log!(old_root = ?root, "root removed, tree is empty");
            }
            [child] => {
                self.nodes.remove(root);
                self.nodes.get_mut(child).set_parent(None);
                self.root = Some(child);
                debug_log!(old_root = ?root, new_root = ?child, "root shrunk by one level");
            }
            ref children => panic!(
                "`RawTwoThreeTree::shrink_root()` - keyless root has {} children!",
                children.len()
            ),
        }
    }
}

impl<K: Ord> RawTwoThreeTree<K> {
    /// Finds the node holding `key`, or the leaf where `key` would be inserted.
    ///
    /// Returns `None` for an empty tree; otherwise the located node and whether `key` is in it.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<(NodeId, bool)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(_) => return Some((current, true)),
                SearchResult::GoDown(_) if node.is_leaf() => return Some((current, false)),
                SearchResult::GoDown(index) => current = node.child(index),
            }
        }
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        matches!(self.find(key), Some((_, true)))
    }

    /// Inserts `key`. Returns `false`, leaving the tree untouched, if it is already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let leaf = match self.find(&key) {
            Some((_, true)) => return false,
            Some((leaf, false)) => leaf,
            None => {
                let root = self.nodes.insert(Node::with_key(key, None));
                self.root = Some(root);
                self.len = 1;
                debug_log!(root = ?root, "first key, new root leaf");
                return true;
            }
        };

        if let Some(new_root) = self.insert_into(leaf, key) {
            self.root = Some(new_root);
        }
        self.len += 1;
        true
    }

    /// Adds `key` to node `id` and splits upward while nodes overflow.
    ///
    /// Returns the new root when a split reached the top of the tree.
    fn insert_into(&mut self, mut id: NodeId, mut key: K) -> Option<NodeId> {
        let mut new_root = None;

        loop {
            let node = self.nodes.get_mut(id);
            node.insert_key(key);
            if node.key_count() <= MAX_KEYS {
                return new_root;
            }

            let (median, parent, grew) = self.split(id);
            if grew {
                new_root = Some(parent);
            }
            id = parent;
            key = median;
        }
    }

    /// Replaces the three-key node `id` by two single-key siblings under the same parent.
    ///
    /// A keyless parent is created first if `id` is the root. Returns the median key, which the
    /// caller still has to insert into the parent, the parent, and whether the parent is new.
    fn split(&mut self, id: NodeId) -> (K, NodeId, bool) {
        let (parent, grew) = match self.nodes.get(id).parent() {
            Some(parent) => (parent, false),
            None => (self.nodes.insert(Node::above(id)), true),
        };

        let (keys, children) = self.nodes.remove(id).take_contents();
        let Ok([low_key, median, high_key]) = keys.into_inner() else {
            panic!("`RawTwoThreeTree::split()` - node is not overflowing!");
        };

        let low = self.nodes.insert(Node::with_key(low_key, Some(parent)));
        let high = self.nodes.insert(Node::with_key(high_key, Some(parent)));

        if !children.is_empty() {
            assert_eq!(
                children.len(),
                4,
                "`RawTwoThreeTree::split()` - overflowing internal node must have four children!"
            );
            self.adopt(low, &children[..2]);
            self.adopt(high, &children[2..]);
        }

        let parent_node = self.nodes.get_mut(parent);
        let index = parent_node.index_of_child(id);
        parent_node.replace_child_with_pair(index, low, high);

        trace_log!(node = ?id, low = ?low, high = ?high, parent = ?parent, "split overflowing node");
        if grew {
            debug_log!(new_root = ?parent, "tree grew by one level");
        }

        (median, parent, grew)
    }

    /// Appends `children` to `parent` and points them back at it.
    pub(crate) fn adopt(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
        self.nodes.get_mut(parent).children_mut().extend_from_slice(children);
    }

    /// Removes `key` from the tree and returns it, or `None` if it is absent.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (mut located, found) = self.find(key)?;
        if !found {
            return None;
        }

        if !self.nodes.get(located).is_leaf() {
            located = self.swap_with_successor(located, key);
        }

        let removed = self.nodes.get_mut(located).remove_key(key);
        self.len -= 1;

        self.repair(located);
        self.shrink_root();

        if self.len == 0 {
            debug_assert!(self.root.is_none(), "empty tree still has a root");
            self.nodes.clear();
        }

        Some(removed)
    }

    /// Exchanges `key`, held by internal node `id`, with its in-order successor.
    ///
    /// The successor is the smallest key in the subtree right of `key`, which always sits first in a
    /// leaf. Returns that leaf, which now holds `key`.
    fn swap_with_successor<Q>(&mut self, id: NodeId, key: &Q) -> NodeId
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get(id);
        let SearchResult::Found(index) = node.search(key) else {
            panic!("`RawTwoThreeTree::swap_with_successor()` - key is not stored in this node!");
        };
        let leaf = self.leftmost_leaf(node.child(index + 1));

        let (node, leaf_node) = self.nodes.pair_mut(id, leaf);
        core::mem::swap(&mut node.keys_mut()[index], &mut leaf_node.keys_mut()[0]);
        leaf
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord + Clone> RawTwoThreeTree<K> {
        fn in_order(&self) -> Vec<K> {
            fn walk<K: Clone>(tree: &RawTwoThreeTree<K>, id: NodeId, out: &mut Vec<K>) {
                let node = tree.node(id);
                for (index, key) in node.keys().iter().enumerate() {
                    if !node.is_leaf() {
                        walk(tree, node.child(index), out);
                    }
                    out.push(key.clone());
                }
                if !node.is_leaf() {
                    walk(tree, node.child(node.key_count()), out);
                }
            }

            let mut out = Vec::new();
            if let Some(root) = self.root {
                walk(self, root, &mut out);
            }
            out
        }

        fn assert_valid(&self) {
            if let Err(violation) = self.check_invariants() {
                panic!("invariant violated: {violation}");
            }
        }
    }

    fn tree_of(keys: &[i32]) -> RawTwoThreeTree<i32> {
        let mut tree = RawTwoThreeTree::new();
        for &key in keys {
            assert!(tree.insert(key));
            tree.assert_valid();
        }
        tree
    }

    #[test]
    fn empty_tree_finds_nothing() {
        let tree: RawTwoThreeTree<i32> = RawTwoThreeTree::new();
        assert!(tree.find(&1).is_none());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);
    }

    #[test]
    fn third_key_splits_root_leaf() {
        let tree = tree_of(&[10, 20, 30]);

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).keys(), &[20]);
        assert_eq!(tree.node(root).child_count(), 2);
        assert_eq!(tree.node(tree.node(root).child(0)).keys(), &[10]);
        assert_eq!(tree.node(tree.node(root).child(1)).keys(), &[30]);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn split_propagates_to_root() {
        // 1..=7 ascending builds a perfect tree of height 3.
        let tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).keys(), &[4]);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.in_order(), (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn split_of_middle_child_keeps_sibling_order() {
        // Root [20, 40]; inserting into the middle leaf forces its split and a root split.
        let tree = tree_of(&[10, 20, 30, 40, 50, 25, 35]);

        assert_eq!(tree.in_order(), [10, 20, 25, 30, 35, 40, 50]);
        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).keys(), &[30]);
    }

    #[test]
    fn find_reports_insertion_leaf() {
        let tree = tree_of(&[10, 20, 5, 6, 15, 30]);

        let (leaf, found) = tree.find(&17).unwrap();
        assert!(!found);
        assert!(tree.node(leaf).is_leaf());
        assert!(tree.node(leaf).keys().contains(&15));

        let (node, found) = tree.find(&10).unwrap();
        assert!(found);
        assert!(tree.node(node).keys().contains(&10));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = tree_of(&[3, 1, 2]);
        assert!(!tree.insert(2));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.in_order(), [1, 2, 3]);
    }

    #[test]
    fn removing_internal_key_uses_successor() {
        let mut tree = tree_of(&[10, 20, 5, 6, 15, 30]);

        assert_eq!(tree.remove(&10), Some(10));
        tree.assert_valid();
        assert_eq!(tree.in_order(), [5, 6, 15, 20, 30]);
        assert!(!tree.contains(&10));
    }

    #[test]
    fn removing_last_key_empties_slab() {
        let mut tree = tree_of(&[42]);
        assert_eq!(tree.remove(&42), Some(42));
        assert!(tree.root().is_none());
        assert_eq!(tree.node_count(), 0);
        assert!(tree.find(&42).is_none());
    }

    #[test]
    fn missing_key_is_not_removed() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.remove(&4), None);
        assert_eq!(tree.len(), 3);
        tree.assert_valid();
    }

    #[test]
    fn ascending_removal_shrinks_tree() {
        let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

        for key in 1..=7 {
            let before = tree.len();
            assert_eq!(tree.remove(&key), Some(key));
            assert_eq!(tree.len(), before - 1);
            tree.assert_valid();
        }
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn node_count_stays_bounded_by_len() {
        let mut tree = RawTwoThreeTree::new();
        for key in 0..1000 {
            tree.insert(key);
        }
        assert!(tree.node_count() <= tree.len());

        for key in (0..1000).step_by(2) {
            tree.remove(&key);
        }
        tree.assert_valid();
        assert!(tree.node_count() <= tree.len());
    }

    #[test]
    fn first_and_last_follow_outer_edges() {
        let tree = tree_of(&[50, 10, 90, 30, 70, 20, 80]);
        assert_eq!(tree.first(), Some(&10));
        assert_eq!(tree.last(), Some(&90));
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawTwoThreeTree<i32> = RawTwoThreeTree::new();
            let mut model = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => prop_assert_eq!(tree.insert(key), model.insert(key)),
                    Op::Remove(key) => prop_assert_eq!(tree.remove(&key).is_some(), model.remove(&key)),
                }
                tree.assert_valid();
            }

            prop_assert_eq!(tree.in_order(), model.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn removing_everything_in_any_order_empties(
            keys in prop::collection::btree_set(-5000i32..5000, 1..400),
            seed in any::<u64>(),
        ) {
            let mut tree = RawTwoThreeTree::new();
            for &key in &keys {
                tree.insert(key);
            }

            // Shuffle deterministically from the seed.
            let mut order: Vec<i32> = keys.iter().copied().collect();
            let mut state = seed | 1;
            for i in (1..order.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                order.swap(i, j);
            }

            for key in order {
                prop_assert_eq!(tree.remove(&key), Some(key));
                tree.assert_valid();
            }

            prop_assert!(tree.is_empty());
            prop_assert!(tree.root().is_none());
            prop_assert_eq!(tree.node_count(), 0);
        }
    }
}
