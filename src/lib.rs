//! # verkle_trie
//!
//! A verkle trie: an authenticated key-value map over 32-byte keys and
//! values whose nodes commit to their children with a vector commitment.
//!
//! ## Core Concepts
//!
//! - **Stems**: the first 31 bytes of a key; up to 256 values share a stem
//! - **Committers**: the vector commitment oracle, see [`Committer`]
//! - **Locations**: nodes are persisted by the key bytes leading to them
//! - **Dirty tracking**: only nodes changed since the last commit are rehashed
//!   and written back
//!
//! ## Example
//!
//! ```
//! use verkle_trie::{Bytes32, MemoryStore, VerkleTrie};
//!
//! let mut trie = VerkleTrie::new();
//! let key = [1u8; 32];
//! trie.put(&key, Bytes32::from_bytes([2u8; 32]))?;
//! let root = trie.root_hash();
//!
//! let store = MemoryStore::new();
//! trie.commit(&store)?;
//! let loaded = VerkleTrie::load(verkle_trie::Blake3Committer, &store, root)?;
//! assert_eq!(loaded.get(&key)?, Some(Bytes32::from_bytes([2u8; 32])));
//! # Ok::<(), verkle_trie::Error>(())
//! ```

pub mod committer;
pub mod model;
pub mod store;
pub mod trie;

mod error;

pub use committer::{Blake3Committer, Committer, Sha256Committer};
pub use error::{Error, Result};
pub use model::{Bytes32, Field};
pub use store::{MemoryStore, NodeLoader, NodeUpdater, StoredNodeFactory, StoredRecord};
pub use trie::{Node, VerkleTrie};

/// Number of children of a branch
pub const NODE_WIDTH: usize = 256;

/// Length of a key stem in bytes
pub const STEM_SIZE: usize = 31;

/// Length of a key in bytes
pub const KEY_SIZE: usize = 32;
