//! Underflow repair after deletion.
//!
//! Removing the only key of a leaf leaves a keyless node behind. `repair` walks upward from that node
//! through three states:
//!
//! - `Balanced`: the node has a key again, or it is the root. Nothing left to do.
//! - `Redistribute`: the parent or a sibling has a spare key. One key moves through the parent into
//!   the empty node, or the parent gives up a key to fold the empty node into a sibling. The parent
//!   keeps at least one key, so the walk stops at the parent.
//! - `Merge`: parent and sibling are 2-nodes. The empty node is folded into its sibling and the
//!   parent's only key goes with it, which can leave the parent keyless in turn.
//!
//! A keyless node is a leaf or has exactly one child: the merged subtree from the level below.

use super::node_id::NodeId;
use super::raw_tree::RawTwoThreeTree;
use crate::tracing_helpers::trace_log;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Repair {
    Balanced,
    Redistribute,
    Merge,
}

impl<K: Ord> RawTwoThreeTree<K> {
    /// Restores the 2-3 invariants above the node that lost its key.
    pub(crate) fn repair(&mut self, mut id: NodeId) {
        loop {
            id = match self.diagnose(id) {
                Repair::Balanced => return,
                Repair::Redistribute => self.redistribute(id),
                Repair::Merge => self.merge(id),
            };
        }
    }

    pub(crate) fn diagnose(&self, id: NodeId) -> Repair {
        let node = self.node(id);
        if node.key_count() > 0 {
            return Repair::Balanced;
        }
        let Some(parent) = node.parent() else {
            // A keyless root is dropped by the caller.
            return Repair::Balanced;
        };

        let parent = self.node(parent);
        let spare_sibling = parent.children().iter().any(|&sibling| sibling != id && self.node(sibling).is_full());
        if parent.is_full() || spare_sibling {
            Repair::Redistribute
        } else {
            Repair::Merge
        }
    }

    /// Fills the keyless node `id` without shrinking its parent below one key. Returns the parent.
    fn redistribute(&mut self, id: NodeId) -> NodeId {
        let parent = self.parent_of(id);
        let parent_node = self.node(parent);
        let index = parent_node.index_of_child(id);

        let is_donor = |sibling: &NodeId| self.node(*sibling).is_full();
        let right = parent_node.children().get(index + 1).copied().filter(is_donor);
        let left = index.checked_sub(1).map(|left| parent_node.child(left)).filter(is_donor);

        match (right, left) {
            (Some(right), _) => self.rotate_from_right(id, parent, index, right),
            (None, Some(left)) => self.rotate_from_left(id, parent, index, left),
            (None, None) => {
                // Only the parent has a spare key; hand one of them down to a sibling.
                assert!(
                    self.node(parent).is_full(),
                    "`RawTwoThreeTree::redistribute()` - no 3-node to borrow from!"
                );
                self.absorb_into_sibling(id, parent, index);
            }
        }
        parent
    }

    /// Folds the keyless node `id` into its sibling, taking the parent's only key along.
    /// Returns the parent, which is now keyless.
    fn merge(&mut self, id: NodeId) -> NodeId {
        let parent = self.parent_of(id);
        let index = self.node(parent).index_of_child(id);
        self.absorb_into_sibling(id, parent, index);
        parent
    }

    /// Moves the parent's separator at `index` down into the empty node, and the right sibling's
    /// first key up into the parent. The sibling's first subtree becomes the empty node's last.
    fn rotate_from_right(&mut self, id: NodeId, parent: NodeId, index: usize, right: NodeId) {
        let donor = self.node_mut(right);
        let lifted = donor.keys_mut().remove(0);
        let moved = if donor.is_leaf() { None } else { Some(donor.children_mut().remove(0)) };

        let separator = core::mem::replace(&mut self.node_mut(parent).keys_mut()[index], lifted);
        self.node_mut(id).keys_mut().push(separator);
        if let Some(moved) = moved {
            self.adopt(id, &[moved]);
        }

        trace_log!(node = ?id, donor = ?right, "redistributed from right sibling");
    }

    /// Mirror of `rotate_from_right`: the separator left of the empty node comes down, the left
    /// sibling's last key goes up, and its last subtree becomes the empty node's first.
    fn rotate_from_left(&mut self, id: NodeId, parent: NodeId, index: usize, left: NodeId) {
        let donor = self.node_mut(left);
        let lifted = donor.keys_mut().pop().expect("`RawTwoThreeTree::rotate_from_left()` - donor has no keys!");
        let moved = donor.children_mut().pop();

        let separator = core::mem::replace(&mut self.node_mut(parent).keys_mut()[index - 1], lifted);
        self.node_mut(id).keys_mut().push(separator);
        if let Some(moved) = moved {
            self.node_mut(moved).set_parent(Some(id));
            self.node_mut(id).children_mut().insert(0, moved);
        }

        trace_log!(node = ?id, donor = ?left, "redistributed from left sibling");
    }

    /// Unlinks the keyless node at `index` under `parent` and frees it. The separator between it and
    /// its neighbour (left if there is one, otherwise right) drops into the neighbour, followed by the
    /// freed node's orphaned subtree, if any.
    fn absorb_into_sibling(&mut self, id: NodeId, parent: NodeId, index: usize) {
        let (_, orphans) = self.free(id).take_contents();
        assert!(
            orphans.len() <= 1,
            "`RawTwoThreeTree::absorb_into_sibling()` - keyless node has {} children!",
            orphans.len()
        );

        let parent_node = self.node_mut(parent);
        parent_node.children_mut().remove(index);

        if index > 0 {
            let sibling = parent_node.child(index - 1);
            let separator = parent_node.keys_mut().remove(index - 1);
            self.node_mut(sibling).keys_mut().push(separator);
            self.adopt(sibling, &orphans);
        } else {
            let sibling = parent_node.child(0);
            let separator = parent_node.keys_mut().remove(0);
            let sibling_node = self.node_mut(sibling);
            sibling_node.keys_mut().insert(0, separator);
            sibling_node.children_mut().insert_many(0, orphans.iter().copied());
            for &orphan in &orphans {
                self.node_mut(orphan).set_parent(Some(sibling));
            }
        }

        trace_log!(node = ?id, parent = ?parent, index, "folded keyless node into sibling");
    }

    fn parent_of(&self, id: NodeId) -> NodeId {
        self.node(id).parent().expect("`RawTwoThreeTree::parent_of()` - node has no parent!")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn tree_of(keys: impl IntoIterator<Item = i32>) -> RawTwoThreeTree<i32> {
        let mut tree = RawTwoThreeTree::new();
        for key in keys {
            tree.insert(key);
        }
        tree.check_invariants().unwrap();
        tree
    }

    fn keys_at(tree: &RawTwoThreeTree<i32>, path: &[usize]) -> Vec<i32> {
        let mut id = tree.root().unwrap();
        for &index in path {
            id = tree.node(id).child(index);
        }
        tree.node(id).keys().to_vec()
    }

    /// Removes `key` from its leaf without repairing, and returns the emptied leaf.
    fn empty_leaf(tree: &mut RawTwoThreeTree<i32>, key: i32) -> NodeId {
        let (leaf, found) = tree.find(&key).unwrap();
        assert!(found && tree.node(leaf).is_leaf());
        tree.node_mut(leaf).remove_key(&key);
        leaf
    }

    #[test]
    fn diagnose_states() {
        // Root [20], leaves [10] [30, 40].
        let mut tree = tree_of([10, 20, 30, 40]);
        let leaf = empty_leaf(&mut tree, 10);
        assert_eq!(tree.diagnose(leaf), Repair::Redistribute);

        // Root [20], leaves [10] [30].
        let mut tree = tree_of([10, 20, 30]);
        let leaf = empty_leaf(&mut tree, 30);
        assert_eq!(tree.diagnose(leaf), Repair::Merge);

        let tree = tree_of([10, 20, 30]);
        assert_eq!(tree.diagnose(tree.root().unwrap()), Repair::Balanced);
    }

    #[test]
    fn leaf_borrows_from_right_sibling() {
        let mut tree = tree_of([10, 20, 30, 40]);
        tree.remove(&10);
        tree.check_invariants().unwrap();
        assert_eq!(keys_at(&tree, &[]), [30]);
        assert_eq!(keys_at(&tree, &[0]), [20]);
        assert_eq!(keys_at(&tree, &[1]), [40]);
    }

    #[test]
    fn leaf_borrows_from_left_sibling() {
        let mut tree = tree_of([20, 30, 40, 10]);
        tree.remove(&40);
        tree.check_invariants().unwrap();
        assert_eq!(keys_at(&tree, &[]), [20]);
        assert_eq!(keys_at(&tree, &[0]), [10]);
        assert_eq!(keys_at(&tree, &[1]), [30]);
    }

    #[test]
    fn leaf_merge_collapses_root() {
        let mut tree = tree_of([10, 20, 30]);
        tree.remove(&30);
        tree.check_invariants().unwrap();
        assert_eq!(tree.height(), 1);
        assert_eq!(keys_at(&tree, &[]), [10, 20]);
    }

    #[test]
    fn full_parent_folds_left_child_into_middle() {
        // Root [20, 40], leaves [10] [30] [50].
        let mut tree = tree_of([10, 20, 30, 40, 50]);
        tree.remove(&10);
        tree.check_invariants().unwrap();
        assert_eq!(keys_at(&tree, &[]), [40]);
        assert_eq!(keys_at(&tree, &[0]), [20, 30]);
        assert_eq!(keys_at(&tree, &[1]), [50]);
    }

    #[test]
    fn full_parent_folds_right_child_into_middle() {
        let mut tree = tree_of([10, 20, 30, 40, 50]);
        tree.remove(&50);
        tree.check_invariants().unwrap();
        assert_eq!(keys_at(&tree, &[]), [20]);
        assert_eq!(keys_at(&tree, &[0]), [10]);
        assert_eq!(keys_at(&tree, &[1]), [30, 40]);
    }

    #[test]
    fn full_parent_far_sibling_is_not_a_donor() {
        // Root [20, 40], leaves [10] [30] [50, 55]. Only the far sibling has a spare key, so the
        // emptied first leaf folds into [30] instead of borrowing through it.
        let mut tree = tree_of([10, 20, 30, 40, 50, 55]);
        assert_eq!(keys_at(&tree, &[]), [20, 40]);
        assert_eq!(keys_at(&tree, &[2]), [50, 55]);

        let mut emptied = tree.clone();
        let leaf = empty_leaf(&mut emptied, 10);
        assert_eq!(emptied.diagnose(leaf), Repair::Redistribute);

        tree.remove(&10);
        tree.check_invariants().unwrap();

        assert_eq!(keys_at(&tree, &[]), [40]);
        assert_eq!(keys_at(&tree, &[0]), [20, 30]);
        assert_eq!(keys_at(&tree, &[1]), [50, 55]);
        assert_eq!(tree.height(), 2);
    }

    /// Builds a height-3 tree whose root is [40, 80] over three 2-nodes, each over two leaves:
    ///
    /// ```text
    ///                [40 80]
    ///       [20]       [60]        [100]
    ///    [10]  [30] [50]  [70]  [90]  [110]
    /// ```
    fn three_level_tree() -> RawTwoThreeTree<i32> {
        let tree = tree_of([10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110]);
        assert_eq!(keys_at(&tree, &[]), [40, 80]);
        assert_eq!(keys_at(&tree, &[0]), [20]);
        assert_eq!(keys_at(&tree, &[1]), [60]);
        assert_eq!(keys_at(&tree, &[2]), [100]);
        assert_eq!(tree.height(), 3);
        tree.check_invariants().unwrap();
        tree
    }

    #[test]
    fn rightmost_internal_child_folds_into_middle_with_its_subtree() {
        // Emptying [110] merges the leaves under [100], leaving [100] keyless with one child.
        // The root is full, so that child and the separator 80 move into [60].
        let mut tree = three_level_tree();
        tree.remove(&110);
        tree.check_invariants().unwrap();

        assert_eq!(keys_at(&tree, &[]), [40]);
        assert_eq!(keys_at(&tree, &[1]), [60, 80]);
        assert_eq!(keys_at(&tree, &[1, 2]), [90, 100]);

        let middle = tree.node(tree.root().unwrap()).child(1);
        let moved = tree.node(middle).child(2);
        assert_eq!(tree.node(moved).parent(), Some(middle));
        assert_ne!(moved, middle);
    }

    #[test]
    fn middle_internal_child_borrows_from_right_sibling() {
        // Give [100] a spare key, then empty the subtree under [60].
        let mut tree = three_level_tree();
        tree.insert(95);
        tree.insert(97);
        assert_eq!(keys_at(&tree, &[2]), [95, 100]);

        tree.remove(&70);
        tree.check_invariants().unwrap();

        assert_eq!(keys_at(&tree, &[]), [40, 95]);
        assert_eq!(keys_at(&tree, &[1]), [80]);
        assert_eq!(keys_at(&tree, &[1, 0]), [50, 60]);
        assert_eq!(keys_at(&tree, &[1, 1]), [90]);
        assert_eq!(keys_at(&tree, &[2]), [100]);
    }

    #[test]
    fn internal_child_borrows_from_left_sibling() {
        let mut tree = three_level_tree();
        tree.insert(25);
        tree.insert(27);
        assert_eq!(keys_at(&tree, &[0]), [20, 27]);

        tree.remove(&50);
        tree.check_invariants().unwrap();

        assert_eq!(keys_at(&tree, &[]), [27, 80]);
        assert_eq!(keys_at(&tree, &[1]), [40]);
        assert_eq!(keys_at(&tree, &[1, 0]), [30]);
        assert_eq!(keys_at(&tree, &[1, 1]), [60, 70]);
    }

    #[test]
    fn merge_cascades_to_root() {
        // Every node is a 2-node, so emptying a leaf merges at each level and the root goes away.
        let mut tree = tree_of(1..=7);
        assert_eq!(tree.height(), 3);

        tree.remove(&1);
        tree.check_invariants().unwrap();
        assert_eq!(tree.height(), 2);
        assert_eq!(keys_at(&tree, &[]), [4, 6]);
        assert_eq!(keys_at(&tree, &[0]), [2, 3]);
    }

    #[test]
    fn absorb_right_neighbour_prepends_orphan() {
        // Keyless first child with one subtree: fold into the right sibling by hand.
        let mut tree = tree_of(1..=7);
        let root = tree.root().unwrap();
        let left = tree.node(root).child(0);
        let orphan = tree.node(left).child(0);
        let dropped = tree.node(left).child(1);

        // Turn [2] into a keyless node over [1] alone.
        tree.node_mut(left).keys_mut().clear();
        tree.node_mut(left).children_mut().remove(1);
        tree.free(dropped);

        tree.absorb_into_sibling(left, root, 0);

        let right = tree.node(root).child(0);
        assert_eq!(tree.node(right).keys(), &[4, 6]);
        assert_eq!(tree.node(right).child(0), orphan);
        assert_eq!(tree.node(orphan).parent(), Some(right));
        assert_eq!(tree.node(root).key_count(), 0);
    }
}
