//! Insert/update walk

use super::select;
use crate::model::Bytes32;
use crate::trie::node::{common_prefix_len, BranchNode, LeafNode, Node};

/// Inserts or updates a single value
pub(crate) struct PutVisitor {
    value: Bytes32,
}

impl PutVisitor {
    pub(crate) fn new(value: Bytes32) -> Self {
        PutVisitor { value }
    }

    pub(crate) fn visit(&self, node: Node, path: &[u8]) -> Node {
        match node {
            Node::Null => Node::Leaf(LeafNode::new(path.to_vec(), self.value)),
            Node::Leaf(leaf) => {
                if leaf.path() == path {
                    return Node::Leaf(leaf.with_value(self.value));
                }
                let common = common_prefix_len(leaf.path(), path);
                self.split(Node::Leaf(leaf), common, path)
            }
            Node::Branch(mut branch) => {
                let common = common_prefix_len(branch.path(), path);
                if common < branch.path().len() {
                    return self.split(Node::Branch(branch), common, path);
                }
                let (index, rest) = select(branch.path(), path);
                let child = branch.take_child(index);
                branch.replace_child(index, self.visit(child, rest));
                let mut updated = Node::Branch(branch);
                updated.mark_dirty();
                updated
            }
        }
    }

    /// Push `node` one level down under a new branch holding the shared prefix,
    /// then insert into that branch
    fn split(&self, node: Node, common: usize, path: &[u8]) -> Node {
        let node_path = node.path();
        assert!(
            common < node_path.len() && common < path.len(),
            "split requires paths diverging before either ends"
        );
        let index = node_path[common];
        let truncated = node_path[common + 1..].to_vec();

        let mut branch = BranchNode::new(path[..common].to_vec());
        branch.replace_child(index, node.replace_path(truncated));
        self.visit(Node::Branch(branch), path)
    }
}
