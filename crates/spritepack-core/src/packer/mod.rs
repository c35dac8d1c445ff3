pub mod guillotine;
pub mod node;

pub use guillotine::Packer;
pub use node::{Content, NodeId, NodeState, PartitionNode, PartitionTree, Walk};
