//! Vector commitment oracle
//!
//! The trie never commits to bytes directly. Every commitment is produced by a
//! [`Committer`] over a vector of 32-byte field elements. The engine only ever
//! asks for vectors of width 2 (path folding), 4 (stem extension) or 256
//! (branch children and value halves).
//!
//! Any deterministic, collision-resistant vector commitment is acceptable.
//! The hash-based committers in this module are reference oracles.

mod hashers;

pub use hashers::{Blake3Committer, Sha256Committer};

use crate::model::Field;

/// Widths the trie commits to
pub const FOLD_WIDTH: usize = 2;
pub const EXTENSION_WIDTH: usize = 4;
pub const VECTOR_WIDTH: usize = crate::NODE_WIDTH;

/// Marker prepended to every stem extension commitment (the field element 1)
pub const EXTENSION_MARKER: Field = {
    let mut bytes = [0u8; 32];
    bytes[0] = 1;
    Field::from_bytes(bytes)
};

/// A vector commitment over field elements
pub trait Committer {
    /// Commit to `elements`, returning a single field element
    fn commit(&self, elements: &[Field]) -> Field;
}

impl<C: Committer + ?Sized> Committer for &C {
    fn commit(&self, elements: &[Field]) -> Field {
        (**self).commit(elements)
    }
}

impl<C: Committer + ?Sized> Committer for Box<C> {
    fn commit(&self, elements: &[Field]) -> Field {
        (**self).commit(elements)
    }
}

/// Interpret up to 32 little-endian bytes as a field element, right-padding with zeros
pub fn field_from_le(bytes: &[u8]) -> Field {
    assert!(bytes.len() <= 32, "field input longer than 32 bytes");
    let mut out = [0u8; 32];
    out[..bytes.len()].copy_from_slice(bytes);
    Field::from_bytes(out)
}

/// Lower half of a value: the first 16 bytes followed by a presence byte
pub fn value_low(value: &Field) -> Field {
    let mut out = [0u8; 32];
    out[..16].copy_from_slice(&value.as_bytes()[..16]);
    out[16] = 1;
    Field::from_bytes(out)
}

/// Upper half of a value: the last 16 bytes
pub fn value_high(value: &Field) -> Field {
    field_from_le(&value.as_bytes()[16..])
}
