//! In-flight fetch tracking.

use std::collections::HashSet;

use crate::key::CacheKey;

/// Set of keys currently being fetched.
///
/// A key is tracked iff a fetch has started for it and its settlement has
/// not yet been applied. The empty transition reported by
/// [`finish`](Self::finish) is what drives the completion signal.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    keys: HashSet<CacheKey>,
}

impl InFlightTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as fetching.
    ///
    /// Callers must check [`contains`](Self::contains) first; starting a
    /// key twice without an intervening finish is a caller bug.
    pub fn start(&mut self, key: CacheKey) {
        let inserted = self.keys.insert(key);
        debug_assert!(inserted, "fetch started twice for the same key");
    }

    /// Apply a settlement for a key.
    ///
    /// Returns true when the tracked set just became empty, which is the
    /// exact moment the completion signal must fire.
    pub fn finish(&mut self, key: &CacheKey) -> bool {
        self.keys.remove(key) && self.keys.is_empty()
    }

    /// Whether any fetch is in flight.
    pub fn is_any_in_flight(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Whether a fetch is in flight for this key.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of keys currently fetching.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no fetch is in flight.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
