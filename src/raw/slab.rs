use alloc::vec::Vec;

use super::node_id::NodeId;

/// Slot storage for tree nodes.
///
/// Every live node is owned by exactly one slot. Freed slots go on a LIFO free list and are
/// handed out again by the next `insert`, so a split that frees one node and allocates two only
/// grows the slab by one slot.
#[derive(Clone)]
pub(crate) struct Slab<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<NodeId>,
}

impl<T> Slab<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub(crate) fn insert(&mut self, value: T) -> NodeId {
        if let Some(id) = self.vacant.pop() {
            self.slots[id.slot()] = Some(value);
            return id;
        }

        assert!(
            self.slots.len() <= NodeId::MAX_SLOT,
            "`Slab::insert()` - slab is full ({} slots)",
            NodeId::MAX_SLOT + 1
        );
        self.slots.push(Some(value));
        NodeId::from_slot(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        self.slots[id.slot()].as_ref().expect("`Slab::get()` - `id` names a vacant slot!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        self.slots[id.slot()].as_mut().expect("`Slab::get_mut()` - `id` names a vacant slot!")
    }

    /// Mutable access to two distinct slots at once.
    pub(crate) fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut T, &mut T) {
        assert_ne!(a, b, "`Slab::pair_mut()` - `a` and `b` are the same slot!");
        let (lo, hi, swapped) = if a.slot() < b.slot() { (a, b, false) } else { (b, a, true) };

        let (head, tail) = self.slots.split_at_mut(hi.slot());
        let lo_ref = head[lo.slot()].as_mut().expect("`Slab::pair_mut()` - `id` names a vacant slot!");
        let hi_ref = tail[0].as_mut().expect("`Slab::pair_mut()` - `id` names a vacant slot!");

        if swapped { (hi_ref, lo_ref) } else { (lo_ref, hi_ref) }
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> T {
        let value = self.slots[id.slot()].take().expect("`Slab::remove()` - `id` names a vacant slot!");
        self.vacant.push(id);
        value
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }
}
