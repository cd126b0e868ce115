mod node;
mod node_id;
mod raw_tree;
mod rebalance;
mod slab;
mod validate;

pub(crate) use node::Node;
pub(crate) use node_id::NodeId;
pub(crate) use raw_tree::RawTwoThreeTree;
