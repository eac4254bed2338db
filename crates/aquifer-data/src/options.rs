//! Fetch configuration.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::fetcher::Fetcher;

/// Per-call and process-wide fetch configuration.
///
/// Process defaults are replaced wholesale by
/// [`DataCache::set_options`](crate::DataCache::set_options); on every
/// binding activation the call-site options are merged over the defaults
/// field-wise, the call site winning.
#[derive(Clone, Default)]
pub struct FetchOptions {
    /// Fetcher override. `None` falls back to the default HTTP fetcher.
    pub fetcher: Option<Arc<dyn Fetcher>>,
    /// Seed value applied at most once per key, without marking the key
    /// in-flight.
    pub initial_data: Option<Value>,
    /// Suppress registration and fetch side effects for an activation.
    pub skip: Option<bool>,
}

impl FetchOptions {
    /// Empty options: every field falls back to the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fetcher for this call.
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Set the seed value for this call.
    pub fn with_initial_data(mut self, value: Value) -> Self {
        self.initial_data = Some(value);
        self
    }

    /// Set whether side effects are skipped.
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Merge these call-site options over `defaults`; set fields win.
    pub fn merged_over(self, defaults: &FetchOptions) -> FetchOptions {
        FetchOptions {
            fetcher: self.fetcher.or_else(|| defaults.fetcher.clone()),
            initial_data: self.initial_data.or_else(|| defaults.initial_data.clone()),
            skip: self.skip.or(defaults.skip),
        }
    }

    /// Whether this activation skips side effects.
    pub fn skip_enabled(&self) -> bool {
        self.skip.unwrap_or(false)
    }
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("fetcher", &self.fetcher.as_ref().map(|_| ".."))
            .field("initial_data", &self.initial_data)
            .field("skip", &self.skip)
            .finish()
    }
}
