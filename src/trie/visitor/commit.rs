//! Persistence walk

use log::trace;

use crate::error::{Error, Result};
use crate::store::{format_location, NodeUpdater, StoredRecord};
use crate::trie::node::Node;

use super::child_location;

/// Writes every dirty node to a [`NodeUpdater`], children before parents
///
/// Hashes must already be computed; clean subtrees are skipped entirely.
pub(crate) struct CommitVisitor<'u, U: NodeUpdater + ?Sized> {
    updater: &'u U,
    written: usize,
}

impl<'u, U: NodeUpdater + ?Sized> CommitVisitor<'u, U> {
    pub(crate) fn new(updater: &'u U) -> Self {
        CommitVisitor {
            updater,
            written: 0,
        }
    }

    /// Number of records written so far
    pub(crate) fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn visit(&mut self, node: &mut Node, location: &[u8]) -> Result<()> {
        match node {
            Node::Null => Ok(()),
            Node::Leaf(leaf) => {
                if !leaf.is_dirty() {
                    return Ok(());
                }
                let record = StoredRecord::Leaf {
                    path: leaf.path().to_vec(),
                    value: *leaf.value(),
                };
                self.store(location, &record)?;
                leaf.mark_stored();
                Ok(())
            }
            Node::Branch(branch) => {
                if !branch.is_dirty() {
                    return Ok(());
                }
                let (path, children) = branch.path_and_children_mut();
                for (index, child) in children.iter_mut().enumerate() {
                    if child.is_dirty() {
                        self.visit(child, &child_location(location, path, index as u8))?;
                    }
                }

                let hash = branch
                    .hash()
                    .ok_or_else(|| Error::MissingCommitment(format_location(location)))?;
                let record = StoredRecord::Branch {
                    hash,
                    path: branch.path().to_vec(),
                };
                self.store(location, &record)?;
                branch.mark_stored();
                Ok(())
            }
        }
    }

    fn store(&mut self, location: &[u8], record: &StoredRecord) -> Result<()> {
        trace!("store {} at {}", record.kind(), format_location(location));
        self.updater.store(location, record.encode()?)?;
        self.written += 1;
        Ok(())
    }
}
