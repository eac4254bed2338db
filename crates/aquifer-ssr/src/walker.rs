//! SSR snapshot collection.

use aquifer_core::Snapshot;
use aquifer_data::DataCache;
use tracing::debug;

use crate::renderer::ElementRenderer;

/// Drive one render pass, wait for every in-flight fetch to settle, and
/// return the serializable cache snapshot for client hydration.
///
/// The pass may start fetches at any traversal depth; the returned
/// snapshot never contains a partially pending record. Fetch failures do
/// not abort the pass; they land in the snapshot as plain error values.
///
/// A fetcher that never settles stalls this call indefinitely (no deadline
/// is enforced); wrap the call in a timeout externally when liveness
/// matters.
pub async fn collect<R: ElementRenderer>(
    cache: &DataCache,
    renderer: &mut R,
    root: R::Root,
) -> Snapshot {
    renderer.drive(root).await;
    cache.wait_idle().await;
    let snapshot = cache.snapshot();
    debug!(entries = snapshot.len(), "render pass settled");
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FnRenderer;
    use aquifer_core::{CacheKey, FetchError};
    use aquifer_data::{FetchOptions, FetchOutcome};
    use serde_json::json;
    use std::time::Duration;

    fn deferred_after(delay_ms: u64, value: serde_json::Value) -> FetchOptions {
        FetchOptions::new().with_fetcher(move |_: &CacheKey| {
            let value = value.clone();
            FetchOutcome::deferred(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(value)
            })
        })
    }

    #[tokio::test]
    async fn test_collect_resolves_immediately_when_idle() {
        let cache = DataCache::new();
        let options = FetchOptions::new()
            .with_fetcher(|_: &CacheKey| FetchOutcome::ready(json!("sync")));

        let mut renderer = FnRenderer::new({
            let cache = cache.clone();
            move |()| {
                let _ = cache.use_fetch("shallow", options.clone(), || {});
            }
        });

        let snapshot = collect(&cache, &mut renderer, ()).await;
        assert_eq!(snapshot["shallow"].data, Some(json!("sync")));
    }

    #[tokio::test]
    async fn test_collect_never_returns_a_pending_record() {
        let cache = DataCache::new();
        let mut renderer = FnRenderer::new({
            let cache = cache.clone();
            move |()| {
                // Fetches started at different traversal depths settle in
                // an arbitrary order.
                let _ = cache.use_fetch("top", deferred_after(15, json!(1)), || {});
                let _ = cache.use_fetch("middle", deferred_after(5, json!(2)), || {});
                let _ = cache.use_fetch("deep", deferred_after(25, json!(3)), || {});
            }
        });

        let snapshot = collect(&cache, &mut renderer, ()).await;

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot["top"].data, Some(json!(1)));
        assert_eq!(snapshot["middle"].data, Some(json!(2)));
        assert_eq!(snapshot["deep"].data, Some(json!(3)));
        assert!(!cache.is_validating());
    }

    #[tokio::test]
    async fn test_collect_serializes_failures_as_plain_values() {
        let cache = DataCache::new();
        let failing = FetchOptions::new().with_fetcher(|_: &CacheKey| {
            FetchOutcome::deferred(async { Err(FetchError::Message("boom".to_string())) })
        });

        let mut renderer = FnRenderer::new({
            let cache = cache.clone();
            move |()| {
                let _ = cache.use_fetch("broken", failing.clone(), || {});
            }
        });

        let snapshot = collect(&cache, &mut renderer, ()).await;
        assert_eq!(snapshot["broken"].error, Some(json!("boom")));
        assert!(snapshot["broken"].data.is_none());
    }
}
