//! Location-keyed node storage
//!
//! Nodes are persisted by their location in the trie (the key bytes leading
//! to them from the root), not by commitment. Storage backends only need to
//! implement [`NodeLoader`] and [`NodeUpdater`]; [`MemoryStore`] does both.

mod codec;
mod factory;
mod memory;

pub use codec::StoredRecord;
pub use factory::StoredNodeFactory;
pub use memory::MemoryStore;

use crate::Result;

/// Read access to stored node records
pub trait NodeLoader {
    /// Fetch the encoded record at `location`, if any
    fn get_node(&self, location: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Write access to stored node records
pub trait NodeUpdater {
    /// Store `encoding` at `location`, replacing any previous record
    fn store(&self, location: &[u8], encoding: Vec<u8>) -> Result<()>;
}

/// Render a location for logs and error messages
pub fn format_location(location: &[u8]) -> String {
    if location.is_empty() {
        "<root>".to_string()
    } else {
        format!("0x{}", hex::encode(location))
    }
}
