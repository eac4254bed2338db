//! Public SDK for the aquifer SSR data cache.
//!
//! This crate re-exports the whole stack:
//!
//! ```ignore
//! use aquifer_sdk::prelude::*;
//! use serde_json::json;
//!
//! let cache = DataCache::new();
//! cache.set_options(FetchOptions::new().with_fetcher(my_fetcher));
//!
//! // Server side: render once, wait for every fetch, snapshot.
//! let snapshot = collect(&cache, &mut renderer, root).await;
//!
//! // Client side: seed a fresh cache from the embedded snapshot.
//! let client = DataCache::new();
//! client.hydrate(snapshot);
//! ```

pub use aquifer_core;
pub use aquifer_data;
pub use aquifer_ssr;

/// Prelude for convenient imports.
pub mod prelude {
    pub use aquifer_core::*;
    pub use aquifer_data::*;
    pub use aquifer_ssr::*;
}
