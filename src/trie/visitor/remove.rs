//! Removal walk with branch flattening

use super::{child_location, select};
use crate::model::Bytes32;
use crate::trie::node::{common_prefix_len, BranchNode, Node};

/// Removes a single key, collapsing branches left with one child
pub(crate) struct RemoveVisitor<'k> {
    key: &'k [u8],
    /// Locations emptied by this removal that still hold a stored record
    vacated: Vec<Vec<u8>>,
}

impl<'k> RemoveVisitor<'k> {
    pub(crate) fn new(key: &'k [u8]) -> Self {
        RemoveVisitor {
            key,
            vacated: Vec::new(),
        }
    }

    pub(crate) fn into_vacated(self) -> Vec<Vec<u8>> {
        self.vacated
    }

    /// Returns the replacement node and the removed value, if any
    pub(crate) fn visit(&mut self, node: Node, path: &[u8]) -> (Node, Option<Bytes32>) {
        match node {
            Node::Null => (Node::Null, None),
            Node::Leaf(leaf) => {
                if leaf.path() != path {
                    return (Node::Leaf(leaf), None);
                }
                let leaf = Node::Leaf(leaf);
                if leaf.is_stored() {
                    let location = self.location(path).to_vec();
                    self.vacated.push(location);
                }
                (Node::Null, leaf.value().copied())
            }
            Node::Branch(mut branch) => {
                let node_path = branch.path();
                if common_prefix_len(node_path, path) != node_path.len() {
                    return (Node::Branch(branch), None);
                }
                let (index, rest) = select(node_path, path);
                let child = branch.take_child(index);
                let (child, removed) = self.visit(child, rest);
                branch.replace_child(index, child);
                if removed.is_none() {
                    return (Node::Branch(branch), None);
                }
                let location = self.location(path).to_vec();
                let mut updated = self.maybe_flatten(branch, &location);
                updated.mark_dirty();
                (updated, removed)
            }
        }
    }

    /// Replace a branch that has a single child left with that child,
    /// prepending the branch path and selector byte to the child's path
    fn maybe_flatten(&mut self, mut branch: BranchNode, location: &[u8]) -> Node {
        let occupied: Vec<u8> = branch.occupied().take(2).collect();
        let only = match occupied.as_slice() {
            [index] => *index,
            [] => return Node::Null,
            _ => return Node::Branch(branch),
        };

        let child = branch.take_child(only);
        if child.is_stored() {
            self.vacated
                .push(child_location(location, branch.path(), only));
        }
        let mut complete_path = branch.path().to_vec();
        complete_path.push(only);
        complete_path.extend_from_slice(child.path());
        child.replace_path(complete_path)
    }

    /// The key bytes consumed before reaching a node whose remaining path is `path`
    fn location(&self, path: &[u8]) -> &'k [u8] {
        &self.key[..self.key.len() - path.len()]
    }
}
