//! The shared data cache hub.
//!
//! One [`DataCache`] owns the process-wide store, subscriber registry,
//! in-flight tracker, and completion signal, and implements the
//! deduplicating fetch orchestration on top of them. Clones share state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use aquifer_core::{
    entries_of, snapshot_of, CacheKey, CacheStore, CompletionSignal, FetchError, InFlightTracker,
    NotifyFn, Record, Snapshot, SubscriberId, SubscriberRegistry,
};

use crate::fetcher::{FetchOutcome, Fetcher, HttpFetcher};
use crate::options::FetchOptions;

/// Everything mutated under the single state lock.
struct CoreState {
    store: CacheStore,
    subscribers: SubscriberRegistry,
    inflight: InFlightTracker,
    signal: CompletionSignal,
    /// Keys whose `initial_data` has already been applied.
    seeded: HashSet<CacheKey>,
}

impl CoreState {
    fn new() -> Self {
        Self {
            store: CacheStore::new(),
            subscribers: SubscriberRegistry::new(),
            inflight: InFlightTracker::new(),
            signal: CompletionSignal::new(),
            seeded: HashSet::new(),
        }
    }
}

/// Shared, key-addressed data cache with request deduplication.
///
/// Every consumer in the process observes the same source of truth per
/// key: at most one fetch runs per key at a time, the result is written
/// once, and every subscriber of the key is repainted when it settles.
/// The state lock is never held across an await or a subscriber callback.
///
/// Deferred fetch settlements run as tasks on the ambient tokio runtime.
#[derive(Clone)]
pub struct DataCache {
    state: Arc<Mutex<CoreState>>,
    defaults: Arc<Mutex<FetchOptions>>,
    default_fetcher: Arc<dyn Fetcher>,
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCache {
    /// Create an empty cache backed by the default HTTP fetcher.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CoreState::new())),
            defaults: Arc::new(Mutex::new(FetchOptions::new())),
            default_fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the process-wide default options wholesale.
    pub fn set_options(&self, options: FetchOptions) {
        *self.defaults.lock().unwrap_or_else(PoisonError::into_inner) = options;
    }

    /// Current cached record for a key, without registering a subscription.
    pub fn query(&self, key: &CacheKey) -> Option<Record> {
        self.state().store.get(key).cloned()
    }

    /// Whether any fetch is in flight.
    pub fn is_validating(&self) -> bool {
        self.state().inflight.is_any_in_flight()
    }

    /// Whether a fetch is in flight for this key.
    pub fn is_validating_key(&self, key: &CacheKey) -> bool {
        self.state().inflight.contains(key)
    }

    /// Number of subscribers currently registered for a key.
    pub fn subscriber_count(&self, key: &CacheKey) -> usize {
        self.state().subscribers.count(key)
    }

    /// Overwrite a record and/or repaint subscribers.
    ///
    /// With a key and a value: overwrite the record with `{data}` and
    /// notify the key's subscribers. With a key only: notify the key's
    /// subscribers so they re-read the current record (no re-fetch is
    /// forced). With no key: notify every subscriber of every key.
    pub fn mutate(&self, key: Option<&CacheKey>, value: Option<Value>) {
        let callbacks = {
            let mut state = self.state();
            match key {
                Some(key) => {
                    if let Some(value) = value {
                        debug!(key = %key, "mutate overwrites record");
                        state.store.set(key.clone(), Record::data(value));
                    }
                    state.subscribers.callbacks_for(key)
                }
                None => {
                    debug!("mutate repaints all subscribers");
                    state.subscribers.all_callbacks()
                }
            }
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Load a snapshot wholesale, seeding the store for hydration.
    pub fn hydrate(&self, snapshot: Snapshot) {
        debug!(entries = snapshot.len(), "hydrating cache from snapshot");
        self.state().store.replace_all(entries_of(snapshot));
    }

    /// Serializable copy of the current store contents, errors coerced to
    /// plain values.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state();
        snapshot_of(state.store.iter())
    }

    /// Resolve once no fetch is in flight.
    ///
    /// Returns immediately when the tracker is already idle; otherwise
    /// waits for the next empty transition. A fetcher that never settles
    /// stalls this call forever; no deadline is enforced.
    pub async fn wait_idle(&self) {
        let receiver = {
            let mut state = self.state();
            if !state.inflight.is_any_in_flight() {
                return;
            }
            state.signal.subscribe()
        };
        let _ = receiver.await;
    }

    /// Bind a consumer to a key.
    ///
    /// Per activation: merges `options` over the process defaults, seeds
    /// `initial_data` once per key, starts a deduplicated fetch when no
    /// record exists and none is in flight, and registers `notify` so the
    /// consumer is repainted when the record changes. Registration happens
    /// atomically with the fetch precondition check, so the consumer is
    /// repainted for its own fetch's settlement. The returned handle
    /// deregisters the callback on drop.
    ///
    /// With `skip` set, no side effects run; the handle still reads
    /// whatever is cached.
    pub fn use_fetch(
        &self,
        key: impl Into<CacheKey>,
        options: FetchOptions,
        notify: impl Fn() + Send + Sync + 'static,
    ) -> FetchHandle {
        let key = key.into();
        let notify: NotifyFn = Arc::new(notify);
        let options =
            options.merged_over(&self.defaults.lock().unwrap_or_else(PoisonError::into_inner));

        if options.skip_enabled() {
            return FetchHandle {
                cache: self.clone(),
                key,
                notify,
                subscription: None,
            };
        }

        let (subscription, fetch_needed) = {
            let mut state = self.state();
            if let Some(seed) = &options.initial_data {
                if !state.seeded.contains(&key) {
                    state.seeded.insert(key.clone());
                    state.store.merge_data(key.clone(), seed.clone());
                }
            }
            let fetch_needed = if !state.store.contains(&key) && !state.inflight.contains(&key) {
                state.inflight.start(key.clone());
                true
            } else {
                false
            };
            // Registered before the fetch runs: a settlement on another
            // worker must already see this consumer in the registry.
            let id = state.subscribers.subscribe(key.clone(), Arc::clone(&notify));
            (Some(id), fetch_needed)
        };

        if fetch_needed {
            let fetcher = options
                .fetcher
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.default_fetcher));
            self.run_fetch(key.clone(), fetcher);
        }

        FetchHandle {
            cache: self.clone(),
            key,
            notify,
            subscription,
        }
    }

    /// Execute a fetch whose preconditions were already established under
    /// the state lock (no record, not in flight, now marked in-flight).
    fn run_fetch(&self, key: CacheKey, fetcher: Arc<dyn Fetcher>) {
        debug!(key = %key, "fetch started");
        match fetcher.fetch(&key) {
            FetchOutcome::Immediate(value) => self.settle(&key, Ok(value)),
            FetchOutcome::Deferred(future) => {
                let cache = self.clone();
                tokio::spawn(async move {
                    let result = future.await;
                    cache.settle(&key, result);
                });
            }
        }
    }

    /// Apply a settlement: record write, in-flight removal, subscriber
    /// notification, then the completion signal, in that order.
    fn settle(&self, key: &CacheKey, result: Result<Value, FetchError>) {
        let (callbacks, waiters) = {
            let mut state = self.state();
            let record = match result {
                Ok(value) => {
                    debug!(key = %key, "fetch resolved");
                    Record::data(value)
                }
                Err(error) => {
                    debug!(key = %key, %error, "fetch failed");
                    Record::error(error)
                }
            };
            state.store.set(key.clone(), record);
            let became_idle = state.inflight.finish(key);
            let callbacks = state.subscribers.callbacks_for(key);
            let waiters = if became_idle {
                state.signal.drain()
            } else {
                Vec::new()
            };
            (callbacks, waiters)
        };

        for callback in callbacks {
            callback();
        }
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
}

/// A consumer's live binding to one key.
///
/// Reads always reflect the current shared record. Dropping the handle
/// deregisters the consumer's notify callback.
pub struct FetchHandle {
    cache: DataCache,
    key: CacheKey,
    notify: NotifyFn,
    subscription: Option<SubscriberId>,
}

impl FetchHandle {
    /// The bound key.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Currently cached data for the key.
    pub fn data(&self) -> Option<Value> {
        self.cache.state().store.get(&self.key).and_then(|r| r.data.clone())
    }

    /// Currently cached error for the key.
    pub fn error(&self) -> Option<FetchError> {
        self.cache.state().store.get(&self.key).and_then(|r| r.error.clone())
    }

    /// Whether a fetch is in flight for the key.
    pub fn is_validating(&self) -> bool {
        self.cache.is_validating_key(&self.key)
    }

    /// Overwrite the cache directly, bypassing fetch.
    ///
    /// `None` clears the record so a later activation may fetch again;
    /// `Some` overwrites `data`. Every subscriber of the key is repainted,
    /// this consumer included: all of them read the same shared record.
    pub fn dispatch(&self, value: Option<Value>) {
        let callbacks = {
            let mut state = self.cache.state();
            match value {
                Some(value) => state.store.set(self.key.clone(), Record::data(value)),
                None => {
                    state.store.delete(&self.key);
                }
            }
            state.subscribers.callbacks_for(&self.key)
        };
        for callback in callbacks {
            callback();
        }
        // A skipped consumer has no registered callback but still gets its
        // own repaint.
        if self.subscription.is_none() {
            (self.notify)();
        }
    }
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.cache.state().subscribers.unsubscribe(&self.key, id);
        }
    }
}
