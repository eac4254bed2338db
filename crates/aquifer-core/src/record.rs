//! Cached records.

use serde_json::Value;

use crate::error::FetchError;

/// The cached value for one key.
///
/// The fetch orchestrator writes exactly one side; a manual dispatch may
/// produce other combinations. `data: Some(Value::Null)` is distinct from
/// the key being absent from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Successfully fetched or manually set data.
    pub data: Option<Value>,
    /// The failure that settled the last fetch, if any.
    pub error: Option<FetchError>,
}

impl Record {
    /// A record holding resolved data.
    pub fn data(value: Value) -> Self {
        Self {
            data: Some(value),
            error: None,
        }
    }

    /// A record holding a settled failure.
    pub fn error(error: FetchError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_record_has_no_error() {
        let record = Record::data(json!({"x": 1}));
        assert_eq!(record.data, Some(json!({"x": 1})));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_error_record_has_no_data() {
        let record = Record::error(FetchError::Message("boom".to_string()));
        assert!(record.data.is_none());
        assert!(record.error.is_some());
    }
}
