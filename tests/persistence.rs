//! Persistence Tests
//!
//! Commit a trie into storage, reload it and check that the stored records
//! track structural changes (including vacated locations).

use std::cell::Cell;
use verkle_trie::{
    Blake3Committer, Bytes32, Error, Field, MemoryStore, NodeLoader, NodeUpdater, Result,
    StoredRecord, VerkleTrie,
};

const K1: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
const K2: &str = "00ff112233445566778899aabbccddeeff00112233445566778899aabbccddee";
const K3: &str = "00ff112233445566778899aabbccddeeff00112233445566778899aabbccddff";

fn key(hex: &str) -> [u8; 32] {
    *Bytes32::from_hex(hex).unwrap().as_bytes()
}

fn value(byte: u8) -> Bytes32 {
    Bytes32::from_bytes([byte; 32])
}

fn build(keys: &[&str]) -> VerkleTrie {
    let mut trie = VerkleTrie::new();
    for (i, k) in keys.iter().enumerate() {
        trie.put(&key(k), value(i as u8 + 1)).unwrap();
    }
    trie
}

fn record_at(store: &MemoryStore, location: &[u8]) -> Option<StoredRecord> {
    store
        .get_raw(location)
        .map(|raw| StoredRecord::decode(&raw).unwrap())
}

/// Store wrapper that counts writes
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: Cell<usize>,
}

impl NodeLoader for CountingStore {
    fn get_node(&self, location: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get_node(location)
    }
}

impl NodeUpdater for CountingStore {
    fn store(&self, location: &[u8], encoding: Vec<u8>) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.inner.store(location, encoding)
    }
}

/// Backend that is never reachable
struct OfflineStore;

impl NodeLoader for OfflineStore {
    fn get_node(&self, _location: &[u8]) -> Result<Option<Vec<u8>>> {
        Err(Error::Storage("backend offline".into()))
    }
}

impl NodeUpdater for OfflineStore {
    fn store(&self, _location: &[u8], _encoding: Vec<u8>) -> Result<()> {
        Err(Error::Storage("backend offline".into()))
    }
}

// ============================================================================
// Round Trip Tests
// ============================================================================

#[test]
fn test_commit_and_load_round_trip() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();
    let root_hash = trie.root_hash();

    // root, leaf K1, stem branch, two value leaves
    assert_eq!(store.len(), 5);
    assert!(!trie.root().is_dirty());

    let mut loaded = VerkleTrie::load(Blake3Committer, &store, root_hash).unwrap();
    assert_eq!(loaded.entries(), trie.entries());
    assert_eq!(loaded.root_hash(), root_hash);
    assert_eq!(loaded.get(&key(K2)).unwrap(), Some(value(2)));
}

#[test]
fn test_records_are_keyed_by_location() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();

    match record_at(&store, &[]).unwrap() {
        StoredRecord::Branch { hash, path } => {
            assert_eq!(path, vec![0x00]);
            assert_eq!(hash, trie.root_hash());
        }
        other => panic!("expected a branch at the root, got {:?}", other),
    }
    assert_eq!(
        record_at(&store, &[0x00, 0x11]),
        Some(StoredRecord::Leaf {
            path: key(K1)[2..].to_vec(),
            value: value(1),
        })
    );
    assert_eq!(
        record_at(&store, &[0x00, 0xff]).unwrap().kind(),
        "branch"
    );
    assert_eq!(
        record_at(&store, &key(K3)),
        Some(StoredRecord::Leaf {
            path: vec![],
            value: value(3),
        })
    );
}

#[test]
fn test_open_without_root_hash() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K3]);
    trie.commit(&store).unwrap();

    let mut opened = VerkleTrie::open(Blake3Committer, &store).unwrap();
    assert_eq!(opened.entries(), trie.entries());
    assert_eq!(opened.root_hash(), trie.root_hash());

    let empty = VerkleTrie::open(Blake3Committer, &MemoryStore::new()).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_loaded_trie_accepts_updates() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2]);
    trie.commit(&store).unwrap();

    let mut loaded = VerkleTrie::load(Blake3Committer, &store, trie.root_hash()).unwrap();
    loaded.put(&key(K3), value(3)).unwrap();
    trie.put(&key(K3), value(3)).unwrap();
    assert_eq!(loaded.root_hash(), trie.root_hash());

    loaded.commit(&store).unwrap();
    let reloaded = VerkleTrie::load(Blake3Committer, &store, trie.root_hash()).unwrap();
    assert_eq!(reloaded.get(&key(K3)).unwrap(), Some(value(3)));
}

// ============================================================================
// Dirty Tracking Tests
// ============================================================================

#[test]
fn test_empty_trie_writes_nothing() {
    let store = CountingStore::default();
    VerkleTrie::new().commit(&store).unwrap();
    assert_eq!(store.writes.get(), 0);
}

#[test]
fn test_second_commit_writes_nothing() {
    let store = CountingStore::default();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();
    assert_eq!(store.writes.get(), 5);

    store.writes.set(0);
    trie.commit(&store).unwrap();
    assert_eq!(store.writes.get(), 0);

    let mut loaded = VerkleTrie::load(Blake3Committer, &store, trie.root_hash()).unwrap();
    loaded.commit(&store).unwrap();
    assert_eq!(store.writes.get(), 0);
}

#[test]
fn test_update_writes_only_the_modified_path() {
    let store = CountingStore::default();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();

    store.writes.set(0);
    trie.put(&key(K3), value(9)).unwrap();
    trie.commit(&store).unwrap();
    // the value leaf, its stem branch and the root
    assert_eq!(store.writes.get(), 3);
}

// ============================================================================
// Vacated Location Tests
// ============================================================================

#[test]
fn test_remove_writes_null_markers() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();

    trie.remove(&key(K1)).unwrap();
    trie.commit(&store).unwrap();

    // the removed leaf and the flattened stem branch's old location
    assert_eq!(record_at(&store, &[0x00, 0x11]), Some(StoredRecord::Null));
    assert_eq!(record_at(&store, &[0x00, 0xff]), Some(StoredRecord::Null));
    match record_at(&store, &[]).unwrap() {
        StoredRecord::Branch { path, .. } => assert_eq!(path, key(K2)[..31].to_vec()),
        other => panic!("expected the stem branch at the root, got {:?}", other),
    }

    let mut loaded = VerkleTrie::load(Blake3Committer, &store, trie.root_hash()).unwrap();
    assert_eq!(loaded.get(&key(K1)).unwrap(), None);
    assert_eq!(loaded.entries().len(), 2);
    assert_eq!(loaded.root_hash(), trie.root_hash());
}

#[test]
fn test_remove_down_to_a_single_leaf() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();

    trie.remove(&key(K1)).unwrap();
    trie.remove(&key(K2)).unwrap();
    trie.commit(&store).unwrap();

    assert_eq!(record_at(&store, &key(K2)), Some(StoredRecord::Null));
    assert_eq!(record_at(&store, &key(K3)), Some(StoredRecord::Null));
    assert_eq!(
        record_at(&store, &[]),
        Some(StoredRecord::Leaf {
            path: key(K3).to_vec(),
            value: value(3),
        })
    );

    let loaded = VerkleTrie::load(Blake3Committer, &store, trie.root_hash()).unwrap();
    assert_eq!(loaded.entries(), vec![(Bytes32::from(key(K3)), value(3))]);
}

#[test]
fn test_reinsert_after_remove_overwrites_marker() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();
    let original = trie.root_hash();

    trie.remove(&key(K1)).unwrap();
    trie.put(&key(K1), value(1)).unwrap();
    trie.commit(&store).unwrap();
    assert_eq!(trie.root_hash(), original);

    assert_eq!(record_at(&store, &[0x00, 0xff]).unwrap().kind(), "branch");
    let loaded = VerkleTrie::load(Blake3Committer, &store, original).unwrap();
    assert_eq!(loaded.entries(), trie.entries());
}

#[test]
fn test_unstored_removal_writes_nothing() {
    let store = CountingStore::default();
    let mut trie = build(&[K1, K2]);
    trie.remove(&key(K1)).unwrap();
    trie.commit(&store).unwrap();
    // only the surviving leaf at the root
    assert_eq!(store.writes.get(), 1);
}

// ============================================================================
// Load Error Tests
// ============================================================================

#[test]
fn test_load_zero_hash_touches_no_storage() {
    let trie = VerkleTrie::load(Blake3Committer, &OfflineStore, Field::ZERO).unwrap();
    assert!(trie.is_empty());
}

#[test]
fn test_load_missing_root() {
    let result = VerkleTrie::load(Blake3Committer, &MemoryStore::new(), value(1));
    assert!(matches!(result, Err(Error::NodeNotFound(_))));
}

#[test]
fn test_load_wrong_root_hash() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2]);
    trie.commit(&store).unwrap();

    let result = VerkleTrie::load(Blake3Committer, &store, value(0x42));
    assert!(matches!(result, Err(Error::Corruption(_))));
}

#[test]
fn test_load_leaf_root_with_wrong_hash() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1]);
    trie.commit(&store).unwrap();

    let result = VerkleTrie::load(Blake3Committer, &store, value(0x42));
    assert!(matches!(result, Err(Error::Corruption(_))));
}

#[test]
fn test_load_detects_tampered_leaf() {
    let mut first = [0u8; 32];
    first[0] = 0x01;
    let mut second = [0u8; 32];
    second[0] = 0x02;

    let store = MemoryStore::new();
    let mut trie = VerkleTrie::new();
    trie.put(&first, value(1)).unwrap();
    trie.put(&second, value(2)).unwrap();
    trie.commit(&store).unwrap();
    let root_hash = trie.root_hash();

    let forged = StoredRecord::Leaf {
        path: vec![0; 31],
        value: value(0xee),
    };
    store.store(&[0x01], forged.encode().unwrap()).unwrap();

    let result = VerkleTrie::load(Blake3Committer, &store, root_hash);
    assert!(matches!(result, Err(Error::Corruption(_))));

    // open keeps the stored commitments and does not notice
    let mut opened = VerkleTrie::open(Blake3Committer, &store).unwrap();
    assert_eq!(opened.get(&first).unwrap(), Some(value(0xee)));
    assert_eq!(opened.root_hash(), root_hash);
}

#[test]
fn test_load_detects_tampered_stem_value() {
    let store = MemoryStore::new();
    let mut trie = build(&[K1, K2, K3]);
    trie.commit(&store).unwrap();
    let root_hash = trie.root_hash();

    let forged = StoredRecord::Leaf {
        path: vec![],
        value: value(0xee),
    };
    store.store(&key(K3), forged.encode().unwrap()).unwrap();

    let result = VerkleTrie::load(Blake3Committer, &store, root_hash);
    assert!(matches!(result, Err(Error::Corruption(_))));
}

#[test]
fn test_storage_errors_propagate() {
    let result = VerkleTrie::load(Blake3Committer, &OfflineStore, value(1));
    assert!(matches!(result, Err(Error::Storage(_))));

    let mut trie = build(&[K1]);
    assert!(matches!(trie.commit(&OfflineStore), Err(Error::Storage(_))));
    // nothing was marked as persisted
    assert!(trie.root().is_dirty());
}
