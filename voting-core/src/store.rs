//! Store abstraction over the key-value backend
//!
//! The ledger talks to storage through [`KeyValueStore`], which keeps
//! the voting semantics independent of any backend. Two implementations
//! ship with the crate: [`MemoryStore`] here, for tests and lightweight
//! embedding, and the persistent RocksDB store in [`crate::storage`].
//!
//! Composite index keys follow the `name 0x00 attr 0x00 ...` layout so
//! entries sort by index name, then by each attribute in turn.

use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Logical key namespaces within the store.
///
/// Each keyspace maps to a RocksDB column family in the persistent
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyspace {
    /// Voter and candidate records
    Entities,
    /// Composite-key index entries
    Index,
    /// Format markers and other bookkeeping
    Meta,
}

impl Keyspace {
    /// All keyspaces, in column family declaration order
    pub const ALL: [Keyspace; 3] = [Keyspace::Entities, Keyspace::Index, Keyspace::Meta];

    /// Column family name for this keyspace
    pub fn cf_name(self) -> &'static str {
        match self {
            Keyspace::Entities => "entities",
            Keyspace::Index => "index",
            Keyspace::Meta => "meta",
        }
    }
}

/// A single staged mutation
#[derive(Debug, Clone)]
pub(crate) enum BatchOp {
    Put {
        space: Keyspace,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        space: Keyspace,
        key: Vec<u8>,
    },
}

/// A set of mutations committed atomically.
///
/// Backends apply every staged operation or none of them, so records
/// and their index entries never diverge.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a key write
    pub fn stage_put(&mut self, space: Keyspace, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put { space, key, value });
    }

    /// Stage a key deletion
    pub fn stage_delete(&mut self, space: Keyspace, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete { space, key });
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing has been staged
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub(crate) fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Backend-neutral key-value interface used by the ledger.
///
/// Implementations must provide read-your-writes visibility: once
/// `put` or `apply` returns, subsequent reads observe the new state.
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value, `None` when the key is absent
    fn get(&self, space: Keyspace, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write a single key
    fn put(&self, space: Keyspace, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete a single key (deleting an absent key is not an error)
    fn delete(&self, space: Keyspace, key: &[u8]) -> Result<()>;

    /// All pairs whose key starts with `prefix`, in ascending key order
    fn scan_prefix(&self, space: Keyspace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// All pairs with `start <= key < end`, in ascending key order
    fn scan_range(
        &self,
        space: Keyspace,
        start: &[u8],
        end: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Commit a batch atomically
    fn apply(&self, batch: WriteBatch) -> Result<()>;
}

/// Delimiter between composite key segments.
///
/// 0x00 sorts before every other byte, which makes `name 0x00` a
/// proper scan prefix, and it can never appear inside attributes
/// because control characters are rejected at the API boundary.
pub const COMPOSITE_DELIMITER: u8 = 0x00;

/// Build a composite index key from an index name and attributes.
///
/// Layout: `name 0x00 attr1 0x00 attr2 0x00 ...` with a trailing
/// delimiter after every attribute.
pub fn composite_key(index_name: &str, attributes: &[&str]) -> Vec<u8> {
    let mut key = Vec::with_capacity(index_name.len() + 1);
    key.extend_from_slice(index_name.as_bytes());
    key.push(COMPOSITE_DELIMITER);
    for attr in attributes {
        key.extend_from_slice(attr.as_bytes());
        key.push(COMPOSITE_DELIMITER);
    }
    key
}

/// Split a composite key back into its index name and attributes
pub fn split_composite_key(key: &[u8]) -> Result<(String, Vec<String>)> {
    let text = std::str::from_utf8(key)
        .map_err(|_| Error::Storage("composite key is not valid UTF-8".to_string()))?;

    let mut segments: Vec<&str> = text.split(COMPOSITE_DELIMITER as char).collect();
    // A well-formed key always ends in a delimiter, leaving a trailing
    // empty segment after the split.
    if segments.len() < 2 || segments.pop() != Some("") {
        return Err(Error::Storage(format!(
            "malformed composite key: {:?}",
            text
        )));
    }

    let name = segments.remove(0).to_string();
    let attributes = segments.into_iter().map(str::to_string).collect();
    Ok((name, attributes))
}

/// In-memory store backed by ordered maps.
///
/// Semantics mirror the RocksDB store, including atomic batch commits
/// and ascending scan order.
#[derive(Default)]
pub struct MemoryStore {
    maps: RwLock<MemoryMaps>,
}

#[derive(Default)]
struct MemoryMaps {
    entities: BTreeMap<Vec<u8>, Vec<u8>>,
    index: BTreeMap<Vec<u8>, Vec<u8>>,
    meta: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryMaps {
    fn map(&self, space: Keyspace) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        match space {
            Keyspace::Entities => &self.entities,
            Keyspace::Index => &self.index,
            Keyspace::Meta => &self.meta,
        }
    }

    fn map_mut(&mut self, space: Keyspace) -> &mut BTreeMap<Vec<u8>, Vec<u8>> {
        match space {
            Keyspace::Entities => &mut self.entities,
            Keyspace::Index => &mut self.index,
            Keyspace::Meta => &mut self.meta,
        }
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, space: Keyspace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.maps.read().map(space).get(key).cloned())
    }

    fn put(&self, space: Keyspace, key: &[u8], value: &[u8]) -> Result<()> {
        self.maps
            .write()
            .map_mut(space)
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, space: Keyspace, key: &[u8]) -> Result<()> {
        self.maps.write().map_mut(space).remove(key);
        Ok(())
    }

    fn scan_prefix(&self, space: Keyspace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let maps = self.maps.read();
        Ok(maps
            .map(space)
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn scan_range(
        &self,
        space: Keyspace,
        start: &[u8],
        end: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        if start >= end {
            return Ok(Vec::new());
        }
        let maps = self.maps.read();
        Ok(maps
            .map(space)
            .range(start.to_vec()..end.to_vec())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut maps = self.maps.write();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { space, key, value } => {
                    maps.map_mut(space).insert(key, value);
                }
                BatchOp::Delete { space, key } => {
                    maps.map_mut(space).remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key_layout() {
        let key = composite_key("vID~tokensBought", &["v1", "50"]);
        let mut expected = Vec::new();
        expected.extend_from_slice(b"vID~tokensBought");
        expected.push(0x00);
        expected.extend_from_slice(b"v1");
        expected.push(0x00);
        expected.extend_from_slice(b"50");
        expected.push(0x00);
        assert_eq!(key, expected);
    }

    #[test]
    fn test_composite_key_round_trip() {
        let key = composite_key("vID~tokensBought", &["v1", "50"]);
        let (name, attributes) = split_composite_key(&key).unwrap();
        assert_eq!(name, "vID~tokensBought");
        assert_eq!(attributes, vec!["v1".to_string(), "50".to_string()]);
    }

    #[test]
    fn test_split_rejects_malformed_keys() {
        assert!(split_composite_key(b"").is_err());
        // No trailing delimiter
        assert!(split_composite_key(b"name\x00attr").is_err());
        // No delimiter at all
        assert!(split_composite_key(b"plainkey").is_err());
        // Invalid UTF-8
        assert!(split_composite_key(&[0xff, 0x00]).is_err());
    }

    #[test]
    fn test_composite_keys_sort_by_attribute() {
        let a = composite_key("idx", &["v1", "10"]);
        let b = composite_key("idx", &["v1", "20"]);
        let c = composite_key("idx", &["v2", "10"]);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_memory_store_put_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get(Keyspace::Entities, b"k").unwrap(), None);

        store.put(Keyspace::Entities, b"k", b"v1").unwrap();
        assert_eq!(
            store.get(Keyspace::Entities, b"k").unwrap(),
            Some(b"v1".to_vec())
        );

        // Overwrite
        store.put(Keyspace::Entities, b"k", b"v2").unwrap();
        assert_eq!(
            store.get(Keyspace::Entities, b"k").unwrap(),
            Some(b"v2".to_vec())
        );

        store.delete(Keyspace::Entities, b"k").unwrap();
        assert_eq!(store.get(Keyspace::Entities, b"k").unwrap(), None);

        // Deleting an absent key is fine
        store.delete(Keyspace::Entities, b"k").unwrap();
    }

    #[test]
    fn test_keyspaces_are_isolated() {
        let store = MemoryStore::new();
        store.put(Keyspace::Entities, b"k", b"entity").unwrap();
        store.put(Keyspace::Index, b"k", b"index").unwrap();

        assert_eq!(
            store.get(Keyspace::Entities, b"k").unwrap(),
            Some(b"entity".to_vec())
        );
        assert_eq!(
            store.get(Keyspace::Index, b"k").unwrap(),
            Some(b"index".to_vec())
        );
        assert_eq!(store.get(Keyspace::Meta, b"k").unwrap(), None);
    }

    #[test]
    fn test_scan_prefix_is_ordered() {
        let store = MemoryStore::new();
        store.put(Keyspace::Index, b"idx\x00b\x00", b"").unwrap();
        store.put(Keyspace::Index, b"idx\x00a\x00", b"").unwrap();
        store.put(Keyspace::Index, b"other\x00a\x00", b"").unwrap();

        let entries = store.scan_prefix(Keyspace::Index, b"idx\x00").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, b"idx\x00a\x00".to_vec());
        assert_eq!(entries[1].0, b"idx\x00b\x00".to_vec());
    }

    #[test]
    fn test_scan_range_bounds() {
        let store = MemoryStore::new();
        for key in [b"va", b"vb", b"vc", b"vd"] {
            store.put(Keyspace::Entities, key, b"").unwrap();
        }

        // Start inclusive, end exclusive
        let entries = store.scan_range(Keyspace::Entities, b"vb", b"vd").unwrap();
        let keys: Vec<&[u8]> = entries.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![b"vb".as_slice(), b"vc".as_slice()]);

        // Inverted range is empty, not a panic
        let entries = store.scan_range(Keyspace::Entities, b"vd", b"vb").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_apply_commits_all_ops() {
        let store = MemoryStore::new();
        store.put(Keyspace::Entities, b"old", b"x").unwrap();

        let mut batch = WriteBatch::new();
        batch.stage_put(Keyspace::Entities, b"new".to_vec(), b"y".to_vec());
        batch.stage_put(Keyspace::Index, b"idx".to_vec(), b"".to_vec());
        batch.stage_delete(Keyspace::Entities, b"old".to_vec());
        assert_eq!(batch.len(), 3);

        store.apply(batch).unwrap();

        assert_eq!(
            store.get(Keyspace::Entities, b"new").unwrap(),
            Some(b"y".to_vec())
        );
        assert_eq!(
            store.get(Keyspace::Index, b"idx").unwrap(),
            Some(b"".to_vec())
        );
        assert_eq!(store.get(Keyspace::Entities, b"old").unwrap(), None);
    }
}
