//! Structural diagnostics.
//!
//! Tree operations never fail: duplicates and missing keys are reported through return values, and
//! a broken link found while restructuring is a bug that panics on the spot. What this module
//! provides is the report produced by [`TwoThreeTree::check_invariants`], which walks a tree and
//! names the first property that does not hold.
//!
//! Depths are counted from the root, which is at depth 0.
//!
//! [`TwoThreeTree::check_invariants`]: crate::TwoThreeTree::check_invariants

use thiserror::Error;

/// A violated structural property of a 2-3 tree.
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvariantViolation {
    /// A node holds no keys, or more than two.
    #[error("node at depth {depth} holds {keys} keys")]
    KeyCount { depth: usize, keys: usize },

    /// An internal node does not have exactly one more child than it has keys.
    #[error("node at depth {depth} has {children} children for {keys} keys")]
    ChildCount { depth: usize, keys: usize, children: usize },

    /// Two leaves sit at different depths.
    #[error("leaf at depth {found}, expected every leaf at depth {expected}")]
    UnevenLeaves { expected: usize, found: usize },

    /// Keys are out of order inside a node or fall outside the range its parent assigns.
    #[error("keys out of order at depth {depth}")]
    Unordered { depth: usize },

    /// A child's parent link names some node other than the one holding it.
    #[error("child at depth {depth} does not link back to its parent")]
    BrokenParentLink { depth: usize },

    /// The root has a parent link.
    #[error("root node has a parent link")]
    RootHasParent,

    /// The stored length disagrees with the number of keys reachable from the root.
    #[error("length is {len} but {reachable} keys are reachable")]
    LengthMismatch { len: usize, reachable: usize },
}
