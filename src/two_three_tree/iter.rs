use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::raw::{NodeId, RawTwoThreeTree};

/// An iterator over the keys of a `TwoThreeTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`TwoThreeTree`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use two_three_tree::TwoThreeTree;
///
/// let tree = TwoThreeTree::from([3, 1, 2]);
/// let mut iter = tree.iter();
/// assert_eq!(iter.len(), 3);
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.len(), 2);
/// ```
///
/// [`iter`]: crate::TwoThreeTree::iter
/// [`TwoThreeTree`]: crate::TwoThreeTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K> {
    tree: &'a RawTwoThreeTree<K>,
    // Path from the root to the node holding the next key. Each entry carries the index of the
    // next key to yield from that node.
    stack: SmallVec<[(NodeId, usize); 16]>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(tree: &'a RawTwoThreeTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len(),
        };
        if let Some(root) = tree.root() {
            iter.descend(root);
        }
        iter
    }

    /// Pushes `id` and its chain of first children down to a leaf.
    fn descend(&mut self, mut id: NodeId) {
        loop {
            self.stack.push((id, 0));
            match self.tree.node(id).children().first() {
                Some(&first) => id = first,
                None => break,
            }
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let tree = self.tree;
        loop {
            let (id, index) = self.stack.last_mut()?;
            let node = tree.node(*id);
            if *index < node.key_count() {
                let key = node.key(*index);
                *index += 1;
                let next_child = *index;
                // The subtree right of `key` comes before the node's next key.
                if !node.is_leaf() {
                    self.descend(node.child(next_child));
                }
                self.remaining -= 1;
                return Some(key);
            }
            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
