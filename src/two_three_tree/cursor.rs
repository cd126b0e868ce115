use core::fmt;
use core::iter::FusedIterator;
use core::ptr;

use smallvec::SmallVec;

use crate::raw::{Node, NodeId, RawTwoThreeTree};

/// A read-only cursor on one node of a [`TwoThreeTree`].
///
/// Obtained from [`TwoThreeTree::root`], [`TwoThreeTree::find`] or [`TwoThreeTree::nodes`]. A
/// cursor borrows the tree, so the node it names cannot change while it is alive. Two cursors are
/// equal when they name the same node of the same tree.
///
/// # Examples
///
/// ```
/// use two_three_tree::TwoThreeTree;
///
/// let tree = TwoThreeTree::from([10, 20, 30]);
/// let root = tree.root().unwrap();
/// assert_eq!(root.keys(), &[20]);
/// assert_eq!(root.child_count(), 2);
///
/// let right = root.child(1).unwrap();
/// assert_eq!(right.keys(), &[30]);
/// assert!(right.is_leaf());
/// assert_eq!(right.parent(), Some(root));
/// ```
///
/// [`TwoThreeTree`]: crate::TwoThreeTree
/// [`TwoThreeTree::root`]: crate::TwoThreeTree::root
/// [`TwoThreeTree::find`]: crate::TwoThreeTree::find
/// [`TwoThreeTree::nodes`]: crate::TwoThreeTree::nodes
pub struct NodeRef<'a, K> {
    tree: &'a RawTwoThreeTree<K>,
    id: NodeId,
}

impl<'a, K> NodeRef<'a, K> {
    pub(crate) fn new(tree: &'a RawTwoThreeTree<K>, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn node(self) -> &'a Node<K> {
        self.tree.node(self.id)
    }

    /// The one or two keys stored in this node, in ascending order.
    #[must_use]
    pub fn keys(self) -> &'a [K] {
        self.node().keys()
    }

    /// Number of children: 0 for a leaf, otherwise one more than the number of keys.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.node().child_count()
    }

    #[must_use]
    pub fn is_leaf(self) -> bool {
        self.node().is_leaf()
    }

    #[must_use]
    pub fn is_root(self) -> bool {
        self.node().parent().is_none()
    }

    /// The node this one hangs from, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.node().parent().map(|id| Self::new(self.tree, id))
    }

    /// The child at `index`, counting from the left, or `None` if there is no such child.
    #[must_use]
    pub fn child(self, index: usize) -> Option<Self> {
        self.node().children().get(index).map(|&id| Self::new(self.tree, id))
    }

    /// Iterates over the children from left to right.
    pub fn children(self) -> impl ExactSizeIterator<Item = Self> + 'a {
        let tree = self.tree;
        self.node().children().iter().map(move |&id| Self::new(tree, id))
    }

    /// Distance from the root, which is at depth 0.
    #[must_use]
    pub fn depth(self) -> usize {
        let mut depth = 0;
        let mut current = self.node().parent();
        while let Some(id) = current {
            depth += 1;
            current = self.tree.node(id).parent();
        }
        depth
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<K> Eq for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("keys", &self.keys())
            .field("child_count", &self.child_count())
            .finish()
    }
}

/// Outcome of [`TwoThreeTree::find`].
///
/// [`TwoThreeTree::find`]: crate::TwoThreeTree::find
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, K> {
    /// The key is stored in this node.
    Found(NodeRef<'a, K>),
    /// The key is absent; this is the leaf it would be inserted into.
    NotFound(NodeRef<'a, K>),
    /// The tree has no nodes.
    Empty,
}

impl<'a, K> Lookup<'a, K> {
    /// Returns `true` if the key was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The node that ended the search, if the tree is not empty.
    #[must_use]
    pub fn node(&self) -> Option<NodeRef<'a, K>> {
        match *self {
            Self::Found(node) | Self::NotFound(node) => Some(node),
            Self::Empty => None,
        }
    }
}

impl<K> Clone for Lookup<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Lookup<'_, K> {}

/// A pre-order iterator over the nodes of a `TwoThreeTree`.
///
/// This `struct` is created by the [`nodes`] method on [`TwoThreeTree`].
/// See its documentation for more.
///
/// [`nodes`]: crate::TwoThreeTree::nodes
/// [`TwoThreeTree`]: crate::TwoThreeTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Nodes<'a, K> {
    tree: &'a RawTwoThreeTree<K>,
    // Nodes still to visit, with their depth; the next one is on top.
    stack: SmallVec<[(NodeId, usize); 32]>,
    remaining: usize,
}

impl<'a, K> Nodes<'a, K> {
    pub(crate) fn new(tree: &'a RawTwoThreeTree<K>) -> Self {
        let mut stack = SmallVec::new();
        stack.extend(tree.root().map(|root| (root, 0)));
        Self {
            tree,
            stack,
            remaining: tree.node_count(),
        }
    }

    /// Like `next`, but also yields the depth of the node.
    pub(crate) fn next_with_depth(&mut self) -> Option<(NodeRef<'a, K>, usize)> {
        let (id, depth) = self.stack.pop()?;
        let children = self.tree.node(id).children();
        self.stack.extend(children.iter().rev().map(|&child| (child, depth + 1)));
        self.remaining -= 1;
        Some((NodeRef::new(self.tree, id), depth))
    }
}

impl<'a, K> Iterator for Nodes<'a, K> {
    type Item = NodeRef<'a, K>;

    fn next(&mut self) -> Option<NodeRef<'a, K>> {
        self.next_with_depth().map(|(node, _)| node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Nodes<'_, K> {}

impl<K> FusedIterator for Nodes<'_, K> {}

impl<K> Clone for Nodes<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
