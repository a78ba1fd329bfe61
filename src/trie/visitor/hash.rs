//! Commitment walk
//!
//! Nodes whose cached hash is still present are reused as-is, so after an
//! update only the nodes on the modified paths are recomputed.

use std::cmp::Ordering;

use crate::committer::{
    field_from_le, value_high, value_low, Committer, EXTENSION_MARKER, EXTENSION_WIDTH,
    FOLD_WIDTH, VECTOR_WIDTH,
};
use crate::model::Field;
use crate::trie::node::{BranchNode, LeafNode, Node};
use crate::{KEY_SIZE, NODE_WIDTH, STEM_SIZE};

use super::child_location;

/// Computes and caches node commitments
pub(crate) struct HashVisitor<'c, C: Committer + ?Sized> {
    committer: &'c C,
}

impl<'c, C: Committer + ?Sized> HashVisitor<'c, C> {
    pub(crate) fn new(committer: &'c C) -> Self {
        HashVisitor { committer }
    }

    /// Commitment of `node`, which lives at `location`
    pub(crate) fn visit(&self, node: &mut Node, location: &[u8]) -> Field {
        match node {
            Node::Null => Field::ZERO,
            Node::Leaf(leaf) => {
                if let Some(hash) = leaf.hash() {
                    return hash;
                }
                let hash = self.hash_leaf(leaf, location);
                leaf.set_hash(hash);
                hash
            }
            Node::Branch(branch) => {
                if let Some(hash) = branch.hash() {
                    return hash;
                }
                let depth = location.len() + branch.path().len();
                let base = match depth.cmp(&STEM_SIZE) {
                    Ordering::Less => self.hash_children(branch, location),
                    Ordering::Equal => self.hash_stem(branch, location),
                    Ordering::Greater => panic!(
                        "branch at location 0x{} extends past the stem ({} bytes)",
                        hex::encode(location),
                        depth
                    ),
                };
                let hash = self.fold(base, branch.path());
                branch.set_hash(hash);
                hash
            }
        }
    }

    /// A lone leaf commits to a one-slot stem extension; the selector byte
    /// is part of that extension so it is left out of the fold
    fn hash_leaf(&self, leaf: &LeafNode, location: &[u8]) -> Field {
        let mut key = location.to_vec();
        key.extend_from_slice(leaf.path());
        assert_eq!(
            key.len(),
            KEY_SIZE,
            "leaf at location 0x{} does not end at a full key",
            hex::encode(location)
        );

        let selector = key[STEM_SIZE] as usize;
        let mut lows = vec![Field::ZERO; NODE_WIDTH];
        let mut highs = vec![Field::ZERO; NODE_WIDTH];
        lows[selector] = value_low(leaf.value());
        highs[selector] = value_high(leaf.value());

        let base = self.extension(&key[..STEM_SIZE], &lows, &highs);
        let folded = leaf.path().len().saturating_sub(1);
        self.fold(base, &leaf.path()[..folded])
    }

    /// Inner branch: commit to every child commitment
    fn hash_children(&self, branch: &mut BranchNode, location: &[u8]) -> Field {
        let (path, children) = branch.path_and_children_mut();
        let commitments: Vec<Field> = children
            .iter_mut()
            .enumerate()
            .map(|(index, child)| match child.hash() {
                Some(hash) => hash,
                None => self.visit(child, &child_location(location, path, index as u8)),
            })
            .collect();
        self.commit(&commitments)
    }

    /// Branch at stem depth: commit to the values of its leaves directly
    fn hash_stem(&self, branch: &BranchNode, location: &[u8]) -> Field {
        let mut lows = Vec::with_capacity(NODE_WIDTH);
        let mut highs = Vec::with_capacity(NODE_WIDTH);
        for (index, child) in branch.children().iter().enumerate() {
            match child {
                Node::Null => {
                    lows.push(Field::ZERO);
                    highs.push(Field::ZERO);
                }
                Node::Leaf(leaf) => {
                    lows.push(value_low(leaf.value()));
                    highs.push(value_high(leaf.value()));
                }
                Node::Branch(_) => panic!(
                    "branch below stem 0x{}{} at index {:02x}",
                    hex::encode(location),
                    hex::encode(branch.path()),
                    index
                ),
            }
        }

        let mut stem = location.to_vec();
        stem.extend_from_slice(branch.path());
        self.extension(&stem, &lows, &highs)
    }

    fn extension(&self, stem: &[u8], lows: &[Field], highs: &[Field]) -> Field {
        let low = self.commit(lows);
        let high = self.commit(highs);
        self.commit(&[EXTENSION_MARKER, field_from_le(stem), low, high])
    }

    /// Fold path bytes into `base`, innermost byte first
    fn fold(&self, base: Field, path: &[u8]) -> Field {
        path.iter()
            .rev()
            .fold(base, |acc, byte| self.commit(&[acc, field_from_le(&[*byte])]))
    }

    fn commit(&self, elements: &[Field]) -> Field {
        debug_assert!(
            matches!(elements.len(), FOLD_WIDTH | EXTENSION_WIDTH | VECTOR_WIDTH),
            "unexpected commitment width {}",
            elements.len()
        );
        self.committer.commit(elements)
    }
}
