use smallvec::SmallVec;

use super::node_id::NodeId;

pub(crate) const MAX_KEYS: usize = 2;
pub(crate) const MAX_CHILDREN: usize = MAX_KEYS + 1;

// One slot of headroom: an overflowing node holds three keys and four children until it is split.
pub(crate) type Keys<K> = SmallVec<[K; MAX_KEYS + 1]>;
pub(crate) type Children = SmallVec<[NodeId; MAX_CHILDREN + 1]>;

/// A 2-node or 3-node.
///
/// Leaves have no children; internal nodes have one more child than keys. A node with zero keys
/// only exists while deletion is repairing an underflow, and then has at most one child.
#[derive(Clone)]
pub(crate) struct Node<K> {
    keys: Keys<K>,
    children: Children,
    parent: Option<NodeId>,
}

/// Result of searching for a key in a single node.
pub(crate) enum SearchResult {
    /// Key is stored at the given index.
    Found(usize),
    /// Key is absent; the index is the child to descend into (or the insertion position in a leaf).
    GoDown(usize),
}

impl<K> Node<K> {
    /// Creates a leaf holding a single key.
    pub(crate) fn with_key(key: K, parent: Option<NodeId>) -> Self {
        let mut keys = Keys::new();
        keys.push(key);
        Self {
            keys,
            children: Children::new(),
            parent,
        }
    }

    /// Creates a keyless node whose only child is `child`; used when the root splits.
    pub(crate) fn above(child: NodeId) -> Self {
        let mut children = Children::new();
        children.push(child);
        Self {
            keys: Keys::new(),
            children,
            parent: None,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.keys.len() == MAX_KEYS
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn keys_mut(&mut self) -> &mut Keys<K> {
        &mut self.keys
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> NodeId {
        self.children[index]
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Position of `child` among this node's links.
    ///
    /// # Panics
    /// If `child` is not linked here, which means a parent link is stale.
    pub(crate) fn index_of_child(&self, child: NodeId) -> usize {
        self.children
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| panic!("`Node::index_of_child()` - {child:?} is not a child of this node!"))
    }

    /// Swaps out the link at `index` for `low`, and places `high` right after it.
    pub(crate) fn replace_child_with_pair(&mut self, index: usize, low: NodeId, high: NodeId) {
        self.children[index] = low;
        self.children.insert(index + 1, high);
    }

    /// Takes every key and child out of this node.
    pub(crate) fn take_contents(&mut self) -> (Keys<K>, Children) {
        (core::mem::take(&mut self.keys), core::mem::take(&mut self.children))
    }
}

impl<K: Ord> Node<K> {
    /// Linear search over at most two keys.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        for (index, stored) in self.keys.iter().enumerate() {
            match key.cmp(stored.borrow()) {
                core::cmp::Ordering::Equal => return SearchResult::Found(index),
                core::cmp::Ordering::Less => return SearchResult::GoDown(index),
                core::cmp::Ordering::Greater => {}
            }
        }
        SearchResult::GoDown(self.keys.len())
    }

    /// Inserts `key` in order. The node may end up holding three keys; the caller splits it.
    pub(crate) fn insert_key(&mut self, key: K) {
        let index = self.keys.iter().position(|stored| key < *stored).unwrap_or(self.keys.len());
        self.keys.insert(index, key);
    }

    /// Removes `key` from the node and returns it.
    ///
    /// # Panics
    /// If the node does not hold `key`.
    pub(crate) fn remove_key<Q>(&mut self, key: &Q) -> K
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(index) => self.keys.remove(index),
            SearchResult::GoDown(_) => panic!("`Node::remove_key()` - key is not stored in this node!"),
        }
    }
}
