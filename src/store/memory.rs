//! In-memory record store

use crate::store::{NodeLoader, NodeUpdater};
use crate::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A [`NodeLoader`] and [`NodeUpdater`] backed by a hash map
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, null markers included
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Get the encoded record at `location`
    pub fn get_raw(&self, location: &[u8]) -> Option<Vec<u8>> {
        self.records.read().get(location).cloned()
    }

    /// All records, sorted by location
    pub fn records(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut records: Vec<_> = self
            .records
            .read()
            .iter()
            .map(|(location, record)| (location.clone(), record.clone()))
            .collect();
        records.sort();
        records
    }
}

impl NodeLoader for MemoryStore {
    fn get_node(&self, location: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.get_raw(location))
    }
}

impl NodeUpdater for MemoryStore {
    fn store(&self, location: &[u8], encoding: Vec<u8>) -> Result<()> {
        self.records.write().insert(location.to_vec(), encoding);
        Ok(())
    }
}
