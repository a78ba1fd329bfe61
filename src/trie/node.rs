//! Trie node types

use crate::model::{Bytes32, Field};
use crate::NODE_WIDTH;
use std::fmt::Write;

/// A node in the verkle trie
///
/// Every node owns a compressed path: the key bytes skipped between the
/// node's location and its branching point (for branches) or the end of the
/// key (for leaves). A node's commitment is cached alongside a dirty flag;
/// any change to a node's content clears the cache.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Node {
    /// No mapping below this point
    #[default]
    Null,
    /// A single value
    Leaf(LeafNode),
    /// A 256-way branch
    Branch(BranchNode),
}

/// A leaf holding one 32-byte value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafNode {
    /// Remaining key bytes below the leaf's location
    path: Vec<u8>,
    value: Bytes32,
    hash: Option<Field>,
    dirty: bool,
    /// A record for this node exists at its current location
    stored: bool,
}

/// A branch with exactly [`NODE_WIDTH`] child slots
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchNode {
    /// Bytes shared by every key below this branch, excluding the selector byte
    path: Vec<u8>,
    children: Box<[Node; NODE_WIDTH]>,
    hash: Option<Field>,
    dirty: bool,
    stored: bool,
}

impl Node {
    /// Get the compressed path of this node
    pub fn path(&self) -> &[u8] {
        match self {
            Node::Null => &[],
            Node::Leaf(leaf) => &leaf.path,
            Node::Branch(branch) => &branch.path,
        }
    }

    /// Get the cached commitment, if computed
    ///
    /// The null node always has the zero commitment.
    pub fn hash(&self) -> Option<Field> {
        match self {
            Node::Null => Some(Field::ZERO),
            Node::Leaf(leaf) => leaf.hash,
            Node::Branch(branch) => branch.hash,
        }
    }

    /// Get the value held by a leaf
    pub fn value(&self) -> Option<&Bytes32> {
        match self {
            Node::Leaf(leaf) => Some(&leaf.value),
            _ => None,
        }
    }

    /// Return a copy of this node with its path swapped
    ///
    /// The result is dirty, unhashed and no longer stored at any location.
    pub fn replace_path(self, path: Vec<u8>) -> Node {
        match self {
            Node::Null => Node::Null,
            Node::Leaf(leaf) => Node::Leaf(LeafNode::new(path, leaf.value)),
            Node::Branch(branch) => Node::Branch(BranchNode {
                path,
                children: branch.children,
                hash: None,
                dirty: true,
                stored: false,
            }),
        }
    }

    /// Mark the node as changed: it must be rehashed and persisted again
    pub fn mark_dirty(&mut self) {
        match self {
            Node::Null => {}
            Node::Leaf(leaf) => {
                leaf.dirty = true;
                leaf.hash = None;
            }
            Node::Branch(branch) => {
                branch.dirty = true;
                branch.hash = None;
            }
        }
    }

    /// Check whether the node needs to be persisted
    pub fn is_dirty(&self) -> bool {
        match self {
            Node::Null => false,
            Node::Leaf(leaf) => leaf.dirty,
            Node::Branch(branch) => branch.dirty,
        }
    }

    /// Check if this is the null node
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&BranchNode> {
        match self {
            Node::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    /// Whether a record for this node exists at its current location
    pub(crate) fn is_stored(&self) -> bool {
        match self {
            Node::Null => false,
            Node::Leaf(leaf) => leaf.stored,
            Node::Branch(branch) => branch.stored,
        }
    }

    /// Render the subtree as indented text
    pub fn print(&self) -> String {
        match self {
            Node::Null => "[NULL]".to_string(),
            Node::Leaf(leaf) => format!(
                "Leaf: path=0x{} value={}",
                hex::encode(&leaf.path),
                leaf.value
            ),
            Node::Branch(branch) => {
                let mut out = format!("Branch: path=0x{}", hex::encode(&branch.path));
                for (index, child) in branch.children.iter().enumerate() {
                    if child.is_null() {
                        continue;
                    }
                    let rendered = child.print().replace("\n\t", "\n\t\t");
                    // writing into a String cannot fail
                    let _ = write!(out, "\n\t[{:02x}] {}", index, rendered);
                }
                out
            }
        }
    }
}

impl LeafNode {
    /// Create a fresh, dirty leaf
    pub fn new(path: Vec<u8>, value: Bytes32) -> Self {
        LeafNode {
            path,
            value,
            hash: None,
            dirty: true,
            stored: false,
        }
    }

    /// Rebuild a clean leaf from its stored record
    pub(crate) fn from_storage(path: Vec<u8>, value: Bytes32) -> Self {
        LeafNode {
            path,
            value,
            hash: None,
            dirty: false,
            stored: true,
        }
    }

    /// Replace the value, keeping the leaf at the same location
    pub(crate) fn with_value(self, value: Bytes32) -> Self {
        LeafNode {
            value,
            hash: None,
            dirty: true,
            ..self
        }
    }

    pub fn path(&self) -> &[u8] {
        &self.path
    }

    pub fn value(&self) -> &Bytes32 {
        &self.value
    }

    pub fn hash(&self) -> Option<Field> {
        self.hash
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_hash(&mut self, hash: Field) {
        self.hash = Some(hash);
    }

    pub(crate) fn mark_stored(&mut self) {
        self.dirty = false;
        self.stored = true;
    }
}

impl BranchNode {
    /// Create a fresh, dirty branch with every child slot empty
    pub fn new(path: Vec<u8>) -> Self {
        BranchNode {
            path,
            children: Box::new(std::array::from_fn(|_| Node::Null)),
            hash: None,
            dirty: true,
            stored: false,
        }
    }

    /// Rebuild a clean branch from its stored record and loaded children
    ///
    /// With `hash` unset the commitment is recomputed from the children on
    /// the next hash walk.
    pub(crate) fn from_storage(
        path: Vec<u8>,
        children: Box<[Node; NODE_WIDTH]>,
        hash: Option<Field>,
    ) -> Self {
        BranchNode {
            path,
            children,
            hash,
            dirty: false,
            stored: true,
        }
    }

    /// Number of child slots
    pub const fn max_child() -> usize {
        NODE_WIDTH
    }

    pub fn path(&self) -> &[u8] {
        &self.path
    }

    pub fn hash(&self) -> Option<Field> {
        self.hash
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get the child at `index`
    pub fn child(&self, index: u8) -> &Node {
        &self.children[index as usize]
    }

    /// All child slots, in index order
    pub fn children(&self) -> &[Node] {
        &self.children[..]
    }

    /// Borrow the path alongside mutable child slots
    pub(crate) fn path_and_children_mut(&mut self) -> (&[u8], &mut [Node]) {
        (&self.path, &mut self.children[..])
    }

    /// Overwrite the child slot at `index`
    pub fn replace_child(&mut self, index: u8, node: Node) {
        self.children[index as usize] = node;
    }

    /// Take the child at `index` out of its slot, leaving the null node
    pub(crate) fn take_child(&mut self, index: u8) -> Node {
        std::mem::take(&mut self.children[index as usize])
    }

    /// Indices of the non-null children
    pub fn occupied(&self) -> impl Iterator<Item = u8> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, child)| !child.is_null())
            .map(|(index, _)| index as u8)
    }

    pub(crate) fn set_hash(&mut self, hash: Field) {
        self.hash = Some(hash);
    }

    pub(crate) fn mark_stored(&mut self) {
        self.dirty = false;
        self.stored = true;
    }
}

/// Find the length of the common prefix between two byte slices
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Location of child `index` below a branch at `location` with `path`
pub(crate) fn child_location(location: &[u8], path: &[u8], index: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(location.len() + path.len() + 1);
    out.extend_from_slice(location);
    out.extend_from_slice(path);
    out.push(index);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(byte: u8) -> Bytes32 {
        Bytes32::from_bytes([byte; 32])
    }

    #[test]
    fn test_null_node_properties() {
        let node = Node::Null;
        assert_eq!(node.hash(), Some(Field::ZERO));
        assert!(!node.is_dirty());
        assert!(node.path().is_empty());
        assert!(node.replace_path(vec![1, 2]).is_null());
    }

    #[test]
    fn test_new_nodes_are_dirty_and_unhashed() {
        let leaf = Node::Leaf(LeafNode::new(vec![1], value(1)));
        assert!(leaf.is_dirty());
        assert_eq!(leaf.hash(), None);

        let branch = BranchNode::new(vec![]);
        assert!(branch.is_dirty());
        assert_eq!(branch.children().len(), BranchNode::max_child());
        assert!(branch.children().iter().all(Node::is_null));
    }

    #[test]
    fn test_replace_path_keeps_content() {
        let mut branch = BranchNode::new(vec![0xaa]);
        branch.replace_child(3, Node::Leaf(LeafNode::new(vec![], value(3))));
        branch.set_hash(Field::from_bytes([9; 32]));
        branch.mark_stored();

        let moved = Node::Branch(branch).replace_path(vec![0xbb, 0xcc]);
        let moved = moved.as_branch().unwrap();
        assert_eq!(moved.path(), &[0xbb, 0xcc]);
        assert_eq!(moved.child(3).value(), Some(&value(3)));
        assert!(moved.is_dirty());
        assert_eq!(moved.hash(), None);
        assert!(!Node::Branch(moved.clone()).is_stored());
    }

    #[test]
    fn test_mark_dirty_clears_hash() {
        let mut leaf = LeafNode::new(vec![1, 2], value(1));
        leaf.set_hash(Field::from_bytes([5; 32]));
        leaf.mark_stored();
        let mut node = Node::Leaf(leaf);
        assert!(!node.is_dirty());

        node.mark_dirty();
        assert!(node.is_dirty());
        assert_eq!(node.hash(), None);
        assert!(node.is_stored());
    }

    #[test]
    fn test_take_and_occupied() {
        let mut branch = BranchNode::new(vec![]);
        branch.replace_child(0, Node::Leaf(LeafNode::new(vec![], value(0))));
        branch.replace_child(255, Node::Leaf(LeafNode::new(vec![], value(255))));
        assert_eq!(branch.occupied().collect::<Vec<_>>(), vec![0, 255]);

        let taken = branch.take_child(0);
        assert_eq!(taken.value(), Some(&value(0)));
        assert!(branch.child(0).is_null());
        assert_eq!(branch.occupied().collect::<Vec<_>>(), vec![255]);
    }

    #[test]
    fn test_print() {
        let mut branch = BranchNode::new(vec![0x01]);
        branch.replace_child(0x0a, Node::Leaf(LeafNode::new(vec![0x02], value(0))));
        let printed = Node::Branch(branch).print();
        assert!(printed.starts_with("Branch: path=0x01"));
        assert!(printed.contains("[0a] Leaf: path=0x02"));
    }

    #[test]
    fn test_child_location() {
        assert_eq!(child_location(&[1], &[2, 3], 4), vec![1, 2, 3, 4]);
        assert_eq!(child_location(&[], &[], 0xff), vec![0xff]);
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len(b"apple", b"application"), 4);
        assert_eq!(common_prefix_len(b"", b"abc"), 0);
        assert_eq!(common_prefix_len(b"abc", b"abc"), 3);
    }
}
