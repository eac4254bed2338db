//! Deduplicating fetch layer for the aquifer cache.
//!
//! Consumers bind to a key with [`DataCache::use_fetch`]; the cache
//! fetches it at most once concurrently, writes the settled record, and
//! repaints every subscriber of the key.
//!
//! # Example
//!
//! ```rust,ignore
//! use aquifer_core::CacheKey;
//! use aquifer_data::{DataCache, FetchOptions, FetchOutcome};
//! use serde_json::json;
//!
//! let cache = DataCache::new();
//! let options = FetchOptions::new()
//!     .with_fetcher(|key: &CacheKey| FetchOutcome::ready(json!({ "id": key.as_str() })));
//!
//! let user = cache.use_fetch("/api/user/1", options, || { /* repaint */ });
//! assert!(user.data().is_some());
//! ```

mod cache;
mod fetcher;
mod options;

pub use cache::{DataCache, FetchHandle};
pub use fetcher::{FetchOutcome, Fetcher, HttpFetcher};
pub use options::FetchOptions;
