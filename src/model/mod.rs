//! Core data model types for verkle_trie

mod bytes32;

pub use bytes32::{Bytes32, Field};
