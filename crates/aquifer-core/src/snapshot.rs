//! Serializable cache snapshots for client hydration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;
use crate::key::CacheKey;
use crate::record::Record;

/// One record in serializable form: errors coerced to plain values so the
/// snapshot can cross a serialization boundary (e.g. embedding in
/// server-rendered markup).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Resolved data, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// The plain form of a settled failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl From<&Record> for SnapshotRecord {
    fn from(record: &Record) -> Self {
        Self {
            data: record.data.clone(),
            error: record.error.as_ref().map(FetchError::to_plain),
        }
    }
}

impl From<SnapshotRecord> for Record {
    fn from(snapshot: SnapshotRecord) -> Self {
        Self {
            data: snapshot.data,
            error: snapshot.error.map(FetchError::from_plain),
        }
    }
}

/// The serializable copy of the cache store produced for hydration.
///
/// Keyed in deterministic order so server output is stable across runs.
pub type Snapshot = BTreeMap<String, SnapshotRecord>;

/// Build a snapshot from store entries.
pub fn snapshot_of<'a>(entries: impl Iterator<Item = (&'a CacheKey, &'a Record)>) -> Snapshot {
    entries
        .map(|(key, record)| (key.as_str().to_owned(), SnapshotRecord::from(record)))
        .collect()
}

/// Expand a snapshot back into store entries.
pub fn entries_of(snapshot: Snapshot) -> impl Iterator<Item = (CacheKey, Record)> {
    snapshot
        .into_iter()
        .map(|(key, record)| (CacheKey::new(key), Record::from(record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_is_coerced_to_plain_value() {
        let record = Record::error(FetchError::Transport("timed out".to_string()));
        let snapshot = SnapshotRecord::from(&record);
        assert_eq!(snapshot.error, Some(json!("transport error: timed out")));
        assert!(snapshot.data.is_none());
    }

    #[test]
    fn test_snapshot_serializes_without_absent_fields() {
        let record = Record::data(json!({"x": 1}));
        let snapshot = SnapshotRecord::from(&record);
        let serialized = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(serialized, r#"{"data":{"x":1}}"#);
    }

    #[test]
    fn test_store_round_trip_up_to_error_serialization() {
        let key_a = CacheKey::from("a");
        let key_b = CacheKey::from("b");
        let original = vec![
            (key_a.clone(), Record::data(json!(42))),
            (key_b.clone(), Record::error(FetchError::Message("boom".to_string()))),
        ];

        let snapshot = snapshot_of(original.iter().map(|(k, r)| (k, r)));
        let restored: Vec<_> = entries_of(snapshot).collect();

        let data = restored.iter().find(|(k, _)| *k == key_a).unwrap();
        assert_eq!(data.1.data, Some(json!(42)));
        let error = restored.iter().find(|(k, _)| *k == key_b).unwrap();
        assert_eq!(error.1.error, Some(FetchError::Message("boom".to_string())));
    }

    #[test]
    fn test_snapshot_keys_are_ordered() {
        let key_b = CacheKey::from("b");
        let key_a = CacheKey::from("a");
        let entries = vec![
            (key_b, Record::data(json!(2))),
            (key_a, Record::data(json!(1))),
        ];
        let snapshot = snapshot_of(entries.iter().map(|(k, r)| (k, r)));
        let keys: Vec<_> = snapshot.keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
