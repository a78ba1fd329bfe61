//! Tree walks over the node graph
//!
//! Each walk is dispatched by matching on the node variant and receives the
//! part of the key still to resolve at that node. Mutating walks take nodes by
//! value and return the node that replaces the traversed edge.
//!
//! The location of a node is never stored: for keyed walks it is the prefix of
//! the key already consumed, and the whole-tree walks pass it down explicitly
//! as `parent location ++ parent path ++ [index]`.

mod commit;
mod get;
mod hash;
mod put;
mod remove;

pub(crate) use commit::CommitVisitor;
pub(crate) use get::GetVisitor;
pub(crate) use hash::HashVisitor;
pub(crate) use put::PutVisitor;
pub(crate) use remove::RemoveVisitor;

use crate::trie::node::child_location;

/// Split the remaining key after a branch's path into the selector byte and the rest
///
/// Callers have already checked that `path` starts with the branch path.
fn select<'p>(branch_path: &[u8], path: &'p [u8]) -> (u8, &'p [u8]) {
    let suffix = &path[branch_path.len()..];
    match suffix.split_first() {
        Some((&index, rest)) => (index, rest),
        None => panic!(
            "branch path 0x{} consumes the whole key",
            hex::encode(branch_path)
        ),
    }
}
