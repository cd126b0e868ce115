use core::borrow::Borrow;
use core::fmt;

use alloc::vec::Vec;

use crate::InvariantViolation;
use crate::raw::RawTwoThreeTree;

mod cursor;
mod iter;
mod snapshot;

pub use cursor::{Lookup, NodeRef, Nodes};
pub use iter::Iter;
pub use snapshot::NodeView;

/// An ordered set based on a 2-3 tree.
///
/// Every node holds one key and two children (a 2-node) or two keys and three children (a
/// 3-node), and every leaf sits at the same depth, so the height stays within `log2(n + 1)`.
/// Nodes live in a single arena owned by the tree and refer to each other by id.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by the [`Ord`] trait, changes while it is in the tree. This is normally
/// only possible through [`Cell`], [`RefCell`], global state, I/O, or unsafe code. The behavior
/// resulting from such a logic error is not specified, but will be encapsulated to the
/// `TwoThreeTree` that observed the logic error and not result in undefined behavior. This could
/// include panics, incorrect results and non-termination.
///
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
///
/// # Examples
///
/// ```
/// use two_three_tree::TwoThreeTree;
///
/// let mut planets = TwoThreeTree::new();
///
/// planets.insert("Mercury");
/// planets.insert("Venus");
/// planets.insert("Earth");
/// planets.insert("Mars");
///
/// if !planets.contains("Pluto") {
///     println!("We have {} planets, and Pluto is not one of them.", planets.len());
/// }
///
/// planets.remove("Venus");
///
/// for planet in &planets {
///     println!("{planet}");
/// }
/// ```
///
/// A `TwoThreeTree` with a known list of keys can be initialized from an array:
///
/// ```
/// use two_three_tree::TwoThreeTree;
///
/// let tree = TwoThreeTree::from([1, 2, 3]);
/// ```
pub struct TwoThreeTree<K> {
    raw: RawTwoThreeTree<K>,
}

impl<K> TwoThreeTree<K> {
    /// Makes a new, empty `TwoThreeTree`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree: TwoThreeTree<i32> = TwoThreeTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawTwoThreeTree::new(),
        }
    }

    /// Makes a new, empty `TwoThreeTree` whose node arena can hold `capacity` keys without
    /// reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree: TwoThreeTree<u64> = TwoThreeTree::with_capacity(64);
    /// assert!(tree.capacity() >= 64);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTwoThreeTree::with_capacity(capacity),
        }
    }

    /// Number of nodes the arena can hold without reallocating.
    ///
    /// A tree never needs more nodes than it has keys.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of keys in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let mut tree = TwoThreeTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let mut tree = TwoThreeTree::new();
    /// assert!(tree.is_empty());
    /// tree.insert(1);
    /// assert!(!tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the tree, removing all keys and releasing the nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let mut tree = TwoThreeTree::from([1, 2, 3]);
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.height(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of levels in the tree. An empty tree has height 0 and a single leaf has
    /// height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree = TwoThreeTree::from([1, 2]);
    /// assert_eq!(tree.height(), 1);
    ///
    /// let tree = TwoThreeTree::from([1, 2, 3, 4, 5, 6, 7]);
    /// assert_eq!(tree.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the smallest key in the tree, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let mut tree = TwoThreeTree::new();
    /// assert_eq!(tree.first(), None);
    /// tree.insert(2);
    /// tree.insert(1);
    /// assert_eq!(tree.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.first()
    }

    /// Returns the largest key in the tree, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree = TwoThreeTree::from([3, 9, 1]);
    /// assert_eq!(tree.last(), Some(&9));
    /// ```
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.last()
    }

    /// Returns a cursor on the root node, or `None` if the tree is empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.raw.root().map(|id| NodeRef::new(&self.raw, id))
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree = TwoThreeTree::from([3, 1, 2]);
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.raw)
    }

    /// Gets an iterator over the nodes in pre-order: each node comes before its children, and
    /// children come left to right.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree = TwoThreeTree::from([10, 20, 30]);
    /// let keys: Vec<&[i32]> = tree.nodes().map(|node| node.keys()).collect();
    /// assert_eq!(keys, [&[20][..], &[10], &[30]]);
    /// ```
    pub fn nodes(&self) -> Nodes<'_, K> {
        Nodes::new(&self.raw)
    }

    /// Copies the shape of the tree into a list of [`NodeView`]s, in the order [`nodes`] visits
    /// them.
    ///
    /// This is the boundary for printing or drawing a tree; the copy does not borrow it.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree = TwoThreeTree::from([10, 20, 30, 40]);
    /// let labels: Vec<String> = tree.snapshot().iter().map(ToString::to_string).collect();
    /// assert_eq!(labels, ["20 (2)", "10 (0)", "30 40 (0)"]);
    /// ```
    ///
    /// [`nodes`]: TwoThreeTree::nodes
    #[must_use]
    pub fn snapshot(&self) -> Vec<NodeView<K>>
    where
        K: Clone,
    {
        let mut nodes = self.nodes();
        let mut views = Vec::with_capacity(nodes.len());
        while let Some((node, depth)) = nodes.next_with_depth() {
            views.push(NodeView::new(node, depth));
        }
        views
    }
}

impl<K: Ord> TwoThreeTree<K> {
    /// Adds a key to the tree.
    ///
    /// Returns whether the key was newly inserted. That is:
    ///
    /// - If the tree did not previously contain this key, `true` is returned.
    /// - If the tree already contained this key, `false` is returned, and the tree is not
    ///   modified: the stored key is kept and `key` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let mut tree = TwoThreeTree::new();
    ///
    /// assert_eq!(tree.insert(2), true);
    /// assert_eq!(tree.insert(2), false);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        self.raw.insert(key)
    }

    /// If the tree contains a key equal to `key`, removes it and returns `true`. Otherwise the tree
    /// is left as it is and `false` is returned.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering on the borrowed
    /// form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let mut tree = TwoThreeTree::new();
    ///
    /// tree.insert(2);
    /// assert_eq!(tree.remove(&2), true);
    /// assert_eq!(tree.remove(&2), false);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).is_some()
    }

    /// Removes and returns the key in the tree equal to `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let mut tree = TwoThreeTree::from([String::from("a"), String::from("b")]);
    /// assert_eq!(tree.take("a"), Some(String::from("a")));
    /// assert_eq!(tree.take("a"), None);
    /// ```
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Searches the tree for `key`.
    ///
    /// The result names the node holding `key`, or, if `key` is absent, the leaf it would be
    /// inserted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::{Lookup, TwoThreeTree};
    ///
    /// let mut tree = TwoThreeTree::<i32>::new();
    /// assert!(matches!(tree.find(&5), Lookup::Empty));
    ///
    /// tree.extend([10, 20, 30]);
    /// let Lookup::Found(node) = tree.find(&20) else { panic!() };
    /// assert_eq!(node.keys(), &[20]);
    ///
    /// let Lookup::NotFound(leaf) = tree.find(&25) else { panic!() };
    /// assert!(leaf.is_leaf());
    /// assert_eq!(leaf.keys(), &[30]);
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Lookup<'_, K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.raw.find(key) {
            Some((id, true)) => Lookup::Found(NodeRef::new(&self.raw, id)),
            Some((id, false)) => Lookup::NotFound(NodeRef::new(&self.raw, id)),
            None => Lookup::Empty,
        }
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree = TwoThreeTree::from([1, 2, 3]);
    /// assert_eq!(tree.contains(&1), true);
    /// assert_eq!(tree.contains(&4), false);
    /// ```
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains(key)
    }

    /// Walks the whole tree and checks every structural property a 2-3 tree must keep.
    ///
    /// A tree only changed through this API always passes; the check exists for tests and for
    /// debugging.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Examples
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree: TwoThreeTree<u32> = (0..100).collect();
    /// assert_eq!(tree.check_invariants(), Ok(()));
    /// ```
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.raw.check_invariants()
    }
}

impl<K> Default for TwoThreeTree<K> {
    /// Creates an empty `TwoThreeTree`.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Clone for TwoThreeTree<K> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug> fmt::Debug for TwoThreeTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PartialEq> PartialEq for TwoThreeTree<K> {
    /// Two trees are equal when they hold the same keys, whatever their shape.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq> Eq for TwoThreeTree<K> {}

impl<K: Ord> FromIterator<K> for TwoThreeTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for TwoThreeTree<K> {
    #[inline]
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Ord + Copy + 'a> Extend<&'a K> for TwoThreeTree<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for TwoThreeTree<K> {
    /// Converts a `[K; N]` into a `TwoThreeTree<K>`. Later duplicates are dropped.
    ///
    /// ```
    /// use two_three_tree::TwoThreeTree;
    ///
    /// let tree1 = TwoThreeTree::from([1, 2, 3, 4]);
    /// let tree2: TwoThreeTree<_> = [4, 3, 2, 1].into();
    /// assert_eq!(tree1, tree2);
    /// ```
    fn from(arr: [K; N]) -> Self {
        let mut tree = Self::with_capacity(N);
        tree.extend(arr);
        tree
    }
}

impl<'a, K> IntoIterator for &'a TwoThreeTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}
