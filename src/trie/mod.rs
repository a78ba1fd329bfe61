//! Verkle trie over 32-byte keys
//!
//! The trie is a path-compressed 256-way tree:
//! - Inner branches commit to the commitments of their children
//! - A branch at stem depth (31 bytes) commits to the values of its leaves
//! - A lone leaf commits as a stem holding a single value
//! - Compressed path bytes are folded into a node's commitment

mod node;
mod tree;
mod visitor;

pub use node::{BranchNode, LeafNode, Node};
pub use tree::VerkleTrie;

pub(crate) use node::child_location;
