//! Lookup walk

use super::select;
use crate::trie::node::{common_prefix_len, LeafNode, Node};

/// Finds the leaf matching a key
pub(crate) struct GetVisitor;

impl GetVisitor {
    pub(crate) fn visit<'a>(&self, node: &'a Node, path: &[u8]) -> Option<&'a LeafNode> {
        match node {
            Node::Null => None,
            Node::Leaf(leaf) => (leaf.path() == path).then_some(leaf),
            Node::Branch(branch) => {
                let node_path = branch.path();
                if common_prefix_len(node_path, path) != node_path.len() {
                    // path diverges before the end of the extension
                    return None;
                }
                let (index, rest) = select(node_path, path);
                self.visit(branch.child(index), rest)
            }
        }
    }
}
