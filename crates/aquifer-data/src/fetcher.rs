//! The fetcher contract and the default HTTP implementation.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use serde_json::Value;

use aquifer_core::{CacheKey, FetchError};

/// Result of asking a fetcher for a key's value.
///
/// The tag makes the sync/async split explicit: an `Immediate` value is
/// applied in the same call stack as the request, a `Deferred` future
/// settles later on the runtime.
pub enum FetchOutcome {
    /// Value already available; applied synchronously.
    Immediate(Value),
    /// Fetch in progress; resolves or fails later.
    Deferred(BoxFuture<'static, Result<Value, FetchError>>),
}

impl FetchOutcome {
    /// An immediate success.
    pub fn ready(value: Value) -> Self {
        Self::Immediate(value)
    }

    /// A deferred outcome from any future.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, FetchError>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }
}

impl fmt::Debug for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(value) => f.debug_tuple("Immediate").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Produces the value for a key.
///
/// Injected process-wide via [`FetchOptions`](crate::FetchOptions) or per
/// call; when none is configured the cache falls back to [`HttpFetcher`].
/// Closures with the matching signature implement this automatically.
pub trait Fetcher: Send + Sync {
    /// Request the value for `key`.
    fn fetch(&self, key: &CacheKey) -> FetchOutcome;
}

impl<F> Fetcher for F
where
    F: Fn(&CacheKey) -> FetchOutcome + Send + Sync,
{
    fn fetch(&self, key: &CacheKey) -> FetchOutcome {
        self(key)
    }
}

/// Default fetcher: treats the key as a URL, issues a GET, and decodes the
/// response body as JSON. Transport and decode failures both land in the
/// record's error branch, never in the consumer's call path.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, key: &CacheKey) -> FetchOutcome {
        let client = self.client.clone();
        let url = key.as_str().to_owned();
        FetchOutcome::deferred(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            response.json::<Value>().await.map_err(|e| {
                if e.is_decode() {
                    FetchError::Decode(e.to_string())
                } else {
                    FetchError::Transport(e.to_string())
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_implements_fetcher() {
        let fetcher = |key: &CacheKey| FetchOutcome::ready(json!({ "key": key.as_str() }));
        match fetcher.fetch(&CacheKey::from("a")) {
            FetchOutcome::Immediate(value) => assert_eq!(value, json!({"key": "a"})),
            FetchOutcome::Deferred(_) => panic!("expected an immediate outcome"),
        }
    }

    #[tokio::test]
    async fn test_deferred_outcome_resolves_later() {
        let outcome = FetchOutcome::deferred(async { Ok(json!(1)) });
        match outcome {
            FetchOutcome::Deferred(future) => assert_eq!(future.await.unwrap(), json!(1)),
            FetchOutcome::Immediate(_) => panic!("expected a deferred outcome"),
        }
    }
}
