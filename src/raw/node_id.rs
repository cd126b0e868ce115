use core::fmt;
use core::num::NonZero;

// Narrow ids in tests so running out of them is cheap to reach.
#[cfg(test)]
type Repr = u16;
#[cfg(not(test))]
type Repr = u32;

/// Slab slot of a tree node, stored off by one so that `Option<NodeId>` (the parent link) costs
/// nothing extra.
///
/// The same id serves as an owning child link and as the non-owning parent link; which one it is
/// depends only on where it is stored.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct NodeId(NonZero<Repr>);

impl NodeId {
    /// Highest slot a tree can address.
    pub(crate) const MAX_SLOT: usize = (Repr::MAX - 1) as usize;

    /// # Panics
    /// If the slab has grown past `MAX_SLOT` nodes.
    #[inline]
    pub(crate) const fn from_slot(slot: usize) -> Self {
        assert!(slot <= Self::MAX_SLOT, "`NodeId::from_slot()` - tree is out of node ids!");
        #[allow(clippy::cast_possible_truncation)]
        let shifted = (slot + 1) as Repr;
        match NonZero::new(shifted) {
            Some(shifted) => Self(shifted),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

// Logged node ids read as slab slots: `#0` is the first node ever allocated.
impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.slot())
    }
}
