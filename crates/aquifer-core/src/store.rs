//! Key-addressed record storage.

use std::collections::HashMap;

use serde_json::Value;

use crate::key::CacheKey;
use crate::record::Record;

/// Mapping from key to cached record.
///
/// A key is present iff it has been resolved, errored, or manually set at
/// least once. Entries are removed only by an explicit clear; nothing
/// expires on its own.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<CacheKey, Record>,
}

impl CacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for a key.
    pub fn get(&self, key: &CacheKey) -> Option<&Record> {
        self.entries.get(key)
    }

    /// Whether any record exists for a key.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Overwrite the record for a key. Full replacement, not a merge.
    pub fn set(&mut self, key: CacheKey, record: Record) {
        self.entries.insert(key, record);
    }

    /// Remove the record for a key, returning it if present.
    pub fn delete(&mut self, key: &CacheKey) -> Option<Record> {
        self.entries.remove(key)
    }

    /// Write `data` for a key while preserving a prior `error` field.
    ///
    /// Used when seeding initial data over a record that may already hold
    /// a settled failure.
    pub fn merge_data(&mut self, key: CacheKey, value: Value) {
        let record = self.entries.entry(key).or_default();
        record.data = Some(value);
    }

    /// Replace the whole store contents. Used when loading a hydration
    /// snapshot into a fresh process.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = (CacheKey, Record)>) {
        self.entries.clear();
        self.entries.extend(entries);
    }

    /// Iterate over all cached entries.
    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &Record)> {
        self.entries.iter()
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
