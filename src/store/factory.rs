//! Rebuilding nodes from stored records

use log::trace;

use crate::error::{Error, Result};
use crate::model::Field;
use crate::store::{format_location, NodeLoader, StoredRecord};
use crate::trie::{child_location, BranchNode, LeafNode, Node};
use crate::{KEY_SIZE, NODE_WIDTH, STEM_SIZE};

/// Materialises nodes from a [`NodeLoader`]
///
/// Branches are loaded eagerly: retrieving a branch loads its whole subtree.
pub struct StoredNodeFactory<'a, L: NodeLoader + ?Sized> {
    loader: &'a L,
}

impl<'a, L: NodeLoader + ?Sized> StoredNodeFactory<'a, L> {
    pub fn new(loader: &'a L) -> Self {
        StoredNodeFactory { loader }
    }

    /// Load the node stored at `location`
    ///
    /// Returns `None` when nothing is stored there. Without `expected` the
    /// stored branch commitments are cached as-is. When `expected` is given,
    /// a branch record at `location` must carry that commitment, and no
    /// branch in the subtree keeps its stored commitment, so the next hash
    /// walk rebuilds them all from the loaded leaves.
    pub fn retrieve(&self, location: &[u8], expected: Option<&Field>) -> Result<Option<Node>> {
        self.load(location, expected, expected.is_none())
    }

    fn load(
        &self,
        location: &[u8],
        expected: Option<&Field>,
        trust_stored: bool,
    ) -> Result<Option<Node>> {
        let Some(encoded) = self.loader.get_node(location)? else {
            return Ok(None);
        };

        let node = match StoredRecord::decode(&encoded)? {
            StoredRecord::Null => Node::Null,
            StoredRecord::Leaf { path, value } => {
                if location.len() + path.len() != KEY_SIZE {
                    return Err(Error::Corruption(format!(
                        "leaf at {} has a {}-byte path",
                        format_location(location),
                        path.len()
                    )));
                }
                Node::Leaf(LeafNode::from_storage(path, value))
            }
            StoredRecord::Branch { hash, path } => {
                if location.len() + path.len() > STEM_SIZE {
                    return Err(Error::Corruption(format!(
                        "branch at {} extends past the stem",
                        format_location(location)
                    )));
                }
                if let Some(expected) = expected {
                    if *expected != hash {
                        return Err(Error::Corruption(format!(
                            "branch at {} has commitment {}, expected {}",
                            format_location(location),
                            hash,
                            expected
                        )));
                    }
                }

                let mut children: Box<[Node; NODE_WIDTH]> =
                    Box::new(std::array::from_fn(|_| Node::Null));
                for (index, slot) in children.iter_mut().enumerate() {
                    let child = child_location(location, &path, index as u8);
                    if let Some(node) = self.load(&child, None, trust_stored)? {
                        *slot = node;
                    }
                }
                let cached = trust_stored.then_some(hash);
                Node::Branch(BranchNode::from_storage(path, children, cached))
            }
        };

        trace!("retrieved node at {}", format_location(location));
        Ok(Some(node))
    }
}
