//! An arena-backed 2-3 search tree for Rust.
//!
//! This crate provides [`TwoThreeTree`], an ordered set where every node holds one or two keys and
//! every leaf sits at the same depth. Lookups, insertions and removals take O(log n) time.
//!
//! - [`insert`](TwoThreeTree::insert) - Add a key, splitting full nodes on the way back up
//! - [`remove`](TwoThreeTree::remove) - Remove a key, borrowing from or merging with siblings
//! - [`find`](TwoThreeTree::find) - Locate the node holding a key, or the leaf it would go in
//! - [`nodes`](TwoThreeTree::nodes) and [`snapshot`](TwoThreeTree::snapshot) - Inspect the shape
//!
//! # Example
//!
//! ```
//! use two_three_tree::TwoThreeTree;
//!
//! let mut tree = TwoThreeTree::new();
//! for key in [10, 20, 5, 6, 15, 30] {
//!     tree.insert(key);
//! }
//!
//! assert_eq!(tree.len(), 6);
//! assert!(tree.find(&15).is_found());
//! assert!(!tree.insert(20)); // duplicates are ignored
//!
//! assert!(tree.remove(&10));
//! assert!(!tree.contains(&10));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [5, 6, 15, 20, 30]);
//!
//! // Every leaf sits at the same depth.
//! assert_eq!(tree.check_invariants(), Ok(()));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Arena storage** - Nodes live in one slab and link to each other by id
//! - **`tracing`** - Optional feature that logs splits, merges and root changes
//!
//! # Implementation
//!
//! Insertion adds the key to a leaf and splits any node that ends up with three keys, pushing its
//! median into the parent. Removal first swaps an internal key with its in-order successor so the
//! key always leaves from a leaf, then repairs the emptied node by taking a key through the parent
//! from a sibling with two keys, or by merging it into a sibling.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod tracing_helpers;

mod error;
mod raw;

pub mod two_three_tree;

pub use error::InvariantViolation;
pub use two_three_tree::{Iter, Lookup, NodeRef, NodeView, Nodes, TwoThreeTree};
