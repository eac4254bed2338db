//! State engine for the aquifer SSR data cache.
//!
//! This crate provides the shared-state building blocks:
//! - `CacheStore` - key-addressed record storage
//! - `SubscriberRegistry` - per-key repaint callbacks
//! - `InFlightTracker` - keys currently fetching
//! - `CompletionSignal` - one-shot waiters for the idle transition
//! - `Snapshot` - the serializable form handed to client hydration

mod error;
mod inflight;
mod key;
mod record;
mod signal;
mod snapshot;
mod store;
mod subscribers;

pub use error::*;
pub use inflight::*;
pub use key::*;
pub use record::*;
pub use signal::*;
pub use snapshot::*;
pub use store::*;
pub use subscribers::*;
