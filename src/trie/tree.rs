//! Verkle trie handle

use std::collections::BTreeSet;

use log::{debug, trace};

use super::visitor::{CommitVisitor, GetVisitor, HashVisitor, PutVisitor, RemoveVisitor};
use super::Node;
use crate::committer::{Blake3Committer, Committer};
use crate::error::{Error, Result};
use crate::model::{Bytes32, Field};
use crate::store::{format_location, NodeLoader, NodeUpdater, StoredNodeFactory, StoredRecord};

/// A verkle trie mapping 32-byte keys to 32-byte values
///
/// Keys share a 31-byte stem when they differ only in their last byte; the
/// values of one stem are committed to together. Commitments are computed
/// lazily by [`VerkleTrie::root_hash`] and cached per node, and only nodes
/// changed since the last [`VerkleTrie::commit`] are written back.
pub struct VerkleTrie<C: Committer = Blake3Committer> {
    committer: C,
    root: Node,
    /// Locations vacated since the last commit that still hold a record
    removed_locations: BTreeSet<Vec<u8>>,
}

impl VerkleTrie<Blake3Committer> {
    /// Create an empty trie using the default committer
    pub fn new() -> Self {
        Self::with_committer(Blake3Committer)
    }
}

impl Default for VerkleTrie<Blake3Committer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Committer> VerkleTrie<C> {
    /// Create an empty trie
    pub fn with_committer(committer: C) -> Self {
        Self::from_root(committer, Node::Null)
    }

    /// Wrap an existing node graph
    pub fn from_root(committer: C, root: Node) -> Self {
        VerkleTrie {
            committer,
            root,
            removed_locations: BTreeSet::new(),
        }
    }

    /// Load whatever is stored at the root location, without verification
    pub fn open<L: NodeLoader + ?Sized>(committer: C, loader: &L) -> Result<Self> {
        let root = StoredNodeFactory::new(loader)
            .retrieve(&[], None)?
            .unwrap_or_default();
        debug!("opened trie, root is {}", kind(&root));
        Ok(Self::from_root(committer, root))
    }

    /// Load a trie and verify it against a known root commitment
    ///
    /// Stored branch commitments are not reused: every commitment is rebuilt
    /// from the loaded leaves, so a tampered record anywhere in the tree
    /// fails with [`Error::Corruption`]. A zero commitment denotes the empty
    /// trie and touches no storage.
    pub fn load<L: NodeLoader + ?Sized>(committer: C, loader: &L, root_hash: Field) -> Result<Self> {
        if root_hash.is_zero() {
            return Ok(Self::with_committer(committer));
        }

        let root = StoredNodeFactory::new(loader)
            .retrieve(&[], Some(&root_hash))?
            .ok_or_else(|| Error::NodeNotFound(format_location(&[])))?;
        let mut trie = Self::from_root(committer, root);

        let computed = trie.root_hash();
        if computed != root_hash {
            return Err(Error::Corruption(format!(
                "root commitment {} does not match expected {}",
                computed, root_hash
            )));
        }
        debug!("loaded trie at {}", root_hash.short());
        Ok(trie)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn committer(&self) -> &C {
        &self.committer
    }

    /// Check whether the trie holds no values
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes32>> {
        let key = Bytes32::try_from(key)?;
        Ok(GetVisitor
            .visit(&self.root, key.as_bytes())
            .map(|leaf| *leaf.value()))
    }

    /// Insert or replace the value under `key`
    pub fn put(&mut self, key: &[u8], value: Bytes32) -> Result<()> {
        let key = Bytes32::try_from(key)?;
        trace!("put {} = {}", key, value);
        let root = std::mem::take(&mut self.root);
        self.root = PutVisitor::new(value).visit(root, key.as_bytes());
        Ok(())
    }

    /// Remove `key`, returning its value if it was present
    pub fn remove(&mut self, key: &[u8]) -> Result<Option<Bytes32>> {
        let key = Bytes32::try_from(key)?;
        let mut visitor = RemoveVisitor::new(key.as_bytes());
        let root = std::mem::take(&mut self.root);
        let (root, removed) = visitor.visit(root, key.as_bytes());
        self.root = root;
        self.removed_locations.extend(visitor.into_vacated());
        trace!("remove {} -> {:?}", key, removed);
        Ok(removed)
    }

    /// Compute the root commitment, reusing every cached node commitment
    pub fn root_hash(&mut self) -> Field {
        HashVisitor::new(&self.committer).visit(&mut self.root, &[])
    }

    /// Persist every node changed since the last commit
    ///
    /// Vacated locations are overwritten with null markers first, so a
    /// location that is occupied again ends up holding its new record.
    pub fn commit<U: NodeUpdater + ?Sized>(&mut self, updater: &U) -> Result<()> {
        let root_hash = self.root_hash();

        if !self.removed_locations.is_empty() {
            let marker = StoredRecord::Null.encode()?;
            for location in &self.removed_locations {
                updater.store(location, marker.clone())?;
            }
            debug!(
                "wrote {} null markers for vacated locations",
                self.removed_locations.len()
            );
        }

        let mut visitor = CommitVisitor::new(updater);
        visitor.visit(&mut self.root, &[])?;
        self.removed_locations.clear();
        debug!(
            "committed {} records, root {}",
            visitor.written(),
            root_hash.short()
        );
        Ok(())
    }

    /// List every entry whose key starts with `prefix`, in key order
    pub fn list_prefix(&self, prefix: &[u8]) -> Vec<(Bytes32, Bytes32)> {
        let mut results = Vec::new();
        collect_prefix(&self.root, prefix, Vec::new(), &mut results);
        results
    }

    /// List every entry in key order
    pub fn entries(&self) -> Vec<(Bytes32, Bytes32)> {
        self.list_prefix(&[])
    }

    /// Render the tree as indented text
    pub fn print(&self) -> String {
        self.root.print()
    }
}

fn collect_prefix(
    node: &Node,
    prefix: &[u8],
    current_key: Vec<u8>,
    results: &mut Vec<(Bytes32, Bytes32)>,
) {
    match node {
        Node::Null => {}
        Node::Leaf(leaf) => {
            let mut full_key = current_key;
            full_key.extend_from_slice(leaf.path());
            if !full_key.starts_with(prefix) {
                return;
            }
            let Some(key) = Bytes32::from_slice(&full_key) else {
                panic!(
                    "leaf below 0x{} does not end at a full key ({} bytes)",
                    hex::encode(&full_key[..full_key.len() - leaf.path().len()]),
                    full_key.len()
                );
            };
            results.push((key, *leaf.value()));
        }
        Node::Branch(branch) => {
            let mut current = current_key;
            current.extend_from_slice(branch.path());

            // Only recurse if we're still matching the prefix
            if current.starts_with(prefix) || prefix.starts_with(&current) {
                for index in branch.occupied() {
                    let mut child_key = current.clone();
                    child_key.push(index);
                    collect_prefix(branch.child(index), prefix, child_key, results);
                }
            }
        }
    }
}

fn kind(node: &Node) -> &'static str {
    match node {
        Node::Null => "empty",
        Node::Leaf(_) => "a leaf",
        Node::Branch(_) => "a branch",
    }
}
