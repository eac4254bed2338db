//! Completion signaling for render passes.

use tokio::sync::oneshot;

/// One-shot waiter set fired when the in-flight set transitions to empty.
///
/// Each subscriber gets a receiver that resolves exactly once on the next
/// empty transition; receivers expire on their own, so there is nothing to
/// deregister. Waiters fire in registration order. The signal deliberately
/// does not fire on every individual settlement: a render pass can start
/// new fetches after a waiter registers, so only the transition to a fully
/// idle tracker means the pass is done.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    waiters: Vec<oneshot::Sender<()>>,
}

impl CompletionSignal {
    /// Create a signal with no waiters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waiter for the next empty transition.
    pub fn subscribe(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        rx
    }

    /// Take all registered waiters, leaving the signal empty.
    ///
    /// Lets the owner capture the waiter set at the transition moment and
    /// fire it after the rest of the settlement bookkeeping (record write,
    /// subscriber notification) has run.
    pub fn drain(&mut self) -> Vec<oneshot::Sender<()>> {
        std::mem::take(&mut self.waiters)
    }

    /// Fire all registered waiters in registration order.
    pub fn fire(&mut self) {
        for waiter in self.drain() {
            // A closed receiver is a waiter that gave up; nothing to do.
            let _ = waiter.send(());
        }
    }

    /// Number of registered waiters.
    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fire_resolves_every_waiter() {
        let mut signal = CompletionSignal::new();
        let first = signal.subscribe();
        let second = signal.subscribe();
        assert_eq!(signal.waiter_count(), 2);

        signal.fire();

        assert!(first.await.is_ok());
        assert!(second.await.is_ok());
        assert_eq!(signal.waiter_count(), 0);
    }

    #[tokio::test]
    async fn test_waiters_are_one_shot() {
        let mut signal = CompletionSignal::new();
        let rx = signal.subscribe();
        signal.fire();
        assert!(rx.await.is_ok());

        // A second fire has no waiters left to resolve.
        signal.fire();
        assert_eq!(signal.waiter_count(), 0);
    }

    #[test]
    fn test_fire_tolerates_dropped_receivers() {
        let mut signal = CompletionSignal::new();
        drop(signal.subscribe());
        signal.fire();
    }
}
