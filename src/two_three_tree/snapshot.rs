use core::fmt;

use alloc::vec::Vec;

use super::NodeRef;

/// An owned copy of one node, as returned by [`TwoThreeTree::snapshot`].
///
/// Formats with [`Display`](fmt::Display) as the node's keys followed by its child count in
/// parentheses, e.g. `10 20 (3)`.
///
/// [`TwoThreeTree::snapshot`]: crate::TwoThreeTree::snapshot
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeView<K> {
    /// Keys of the node, in ascending order.
    pub keys: Vec<K>,
    /// Number of children; 0 for a leaf.
    pub child_count: usize,
    /// Distance from the root, which is at depth 0.
    pub depth: usize,
}

impl<K: Clone> NodeView<K> {
    pub(crate) fn new(node: NodeRef<'_, K>, depth: usize) -> Self {
        Self {
            keys: node.keys().to_vec(),
            child_count: node.child_count(),
            depth,
        }
    }
}

impl<K> NodeView<K> {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }
}

impl<K: fmt::Display> fmt::Display for NodeView<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            write!(f, "{key} ")?;
        }
        write!(f, "({})", self.child_count)
    }
}
