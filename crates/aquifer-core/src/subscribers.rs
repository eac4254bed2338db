//! Per-key repaint subscriptions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::key::CacheKey;

/// Callback invoked to repaint a subscribed consumer.
///
/// Carries no payload: subscribers re-read the current store state when
/// they fire, so they can never observe a stale snapshot.
pub type NotifyFn = Arc<dyn Fn() + Send + Sync>;

/// Identity of one registered subscriber, issued by
/// [`SubscriberRegistry::subscribe`] and used for removal on consumer
/// teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Tracks which consumers must be informed when a key's record changes.
#[derive(Default)]
pub struct SubscriberRegistry {
    by_key: HashMap<CacheKey, Vec<(SubscriberId, NotifyFn)>>,
    next_id: u64,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for a key, creating the entry if absent.
    /// Callbacks for a key fire in registration order.
    pub fn subscribe(&mut self, key: CacheKey, callback: NotifyFn) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.by_key.entry(key).or_default().push((id, callback));
        id
    }

    /// Remove a callback by identity. No-op when it is not registered; an
    /// emptied entry is left in place.
    pub fn unsubscribe(&mut self, key: &CacheKey, id: SubscriberId) {
        if let Some(subscribers) = self.by_key.get_mut(key) {
            subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
        }
    }

    /// Invoke every callback for a key synchronously, in registration
    /// order. Callbacks must not re-enter the registry.
    pub fn notify_all(&self, key: &CacheKey) {
        if let Some(subscribers) = self.by_key.get(key) {
            for (_, callback) in subscribers {
                callback();
            }
        }
    }

    /// Invoke every callback across every key (global repaint signal).
    pub fn notify_everything(&self) {
        for subscribers in self.by_key.values() {
            for (_, callback) in subscribers {
                callback();
            }
        }
    }

    /// Cloned callbacks for a key, for invocation after a state lock has
    /// been released.
    pub fn callbacks_for(&self, key: &CacheKey) -> Vec<NotifyFn> {
        self.by_key
            .get(key)
            .map(|subscribers| subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default()
    }

    /// Cloned callbacks across every key.
    pub fn all_callbacks(&self) -> Vec<NotifyFn> {
        self.by_key
            .values()
            .flat_map(|subscribers| subscribers.iter().map(|(_, cb)| Arc::clone(cb)))
            .collect()
    }

    /// Number of subscribers currently registered for a key.
    pub fn count(&self, key: &CacheKey) -> usize {
        self.by_key.get(key).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, NotifyFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let callback = {
            let count = Arc::clone(&count);
            Arc::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }) as NotifyFn
        };
        (count, callback)
    }

    #[test]
    fn test_notify_all_fires_each_subscriber_once() {
        let mut registry = SubscriberRegistry::new();
        let key = CacheKey::from("c");
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();
        registry.subscribe(key.clone(), first_cb);
        registry.subscribe(key.clone(), second_cb);

        registry.notify_all(&key);

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_removes_by_identity() {
        let mut registry = SubscriberRegistry::new();
        let key = CacheKey::from("c");
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();
        let first_id = registry.subscribe(key.clone(), first_cb);
        registry.subscribe(key.clone(), second_cb);

        registry.unsubscribe(&key, first_id);
        registry.notify_all(&key);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.count(&key), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_key_is_noop() {
        let mut registry = SubscriberRegistry::new();
        let (_, callback) = counter();
        let id = registry.subscribe(CacheKey::from("a"), callback);
        registry.unsubscribe(&CacheKey::from("b"), id);
        assert_eq!(registry.count(&CacheKey::from("a")), 1);
    }

    #[test]
    fn test_notify_everything_spans_keys() {
        let mut registry = SubscriberRegistry::new();
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();
        registry.subscribe(CacheKey::from("a"), first_cb);
        registry.subscribe(CacheKey::from("b"), second_cb);

        registry.notify_everything();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callbacks_for_missing_key_is_empty() {
        let registry = SubscriberRegistry::new();
        assert!(registry.callbacks_for(&CacheKey::from("nope")).is_empty());
    }
}
