//! Cache-and-fetch coordination.
//!
//! [`CacheCoordinator::execute_cached`] wraps any fetch-and-extract
//! operation: it serves a stored payload when one exists and otherwise runs
//! the operation and stores its result. The cache is strictly an
//! optimization. A missing store, an argument that cannot be keyed, or a
//! failing `GET`/`SETEX` all fall back to calling the operation directly, and
//! the operation's own errors pass through untouched.
//!
//! Concurrent identical calls on a cold cache are not coalesced: each one
//! misses and fetches, and the last write wins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::CacheStore;
use crate::cache_key::CacheArgs;

/// Default key namespace.
pub const DEFAULT_NAMESPACE: &str = "mboum";

#[derive(Clone)]
pub struct CacheCoordinator {
    store: Option<Arc<dyn CacheStore>>,
    namespace: String,
}

impl CacheCoordinator {
    /// Coordinator backed by `store`, prefixing every key with `namespace`.
    pub fn new(store: Arc<dyn CacheStore>, namespace: impl Into<String>) -> Self {
        Self {
            store: Some(store),
            namespace: namespace.into(),
        }
    }

    /// Coordinator without a store: every call goes straight to the fetch.
    pub fn disabled() -> Self {
        Self {
            store: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the cached payload for `operation_id` + `args`, or runs `fetch`
    /// and caches a non-empty result for `ttl`.
    ///
    /// Performs at most one store read, one store write and one `fetch` call.
    /// Errors from `fetch` are returned unchanged and never cached.
    pub async fn execute_cached<F, Fut, E>(
        &self,
        operation_id: &str,
        args: &CacheArgs,
        ttl: Duration,
        fetch: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let Some((store, key)) = self.prepare(operation_id, args) else {
            return fetch().await;
        };
        if let Some(payload) = read(store, &key, operation_id).await {
            return Ok(payload);
        }

        let result = fetch().await?;
        write(store, &key, &result, ttl, operation_id).await;
        Ok(result)
    }

    /// Typed variant of [`execute_cached`](Self::execute_cached): records are
    /// stored as JSON and decoded on a hit.
    ///
    /// A stored payload that no longer decodes into `T` counts as a miss; the
    /// fresh result overwrites it. A result that cannot be encoded is returned
    /// without being stored.
    pub async fn execute_cached_json<T, F, Fut, E>(
        &self,
        operation_id: &str,
        args: &CacheArgs,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some((store, key)) = self.prepare(operation_id, args) else {
            return fetch().await;
        };
        if let Some(payload) = read(store, &key, operation_id).await {
            match serde_json::from_str(&payload) {
                Ok(records) => return Ok(records),
                Err(e) => tracing::warn!(
                    operation = operation_id,
                    key = %key,
                    "Discarding undecodable cache entry: {}",
                    e
                ),
            }
        }

        let records = fetch().await?;
        match serde_json::to_string(&records) {
            Ok(payload) => write(store, &key, &payload, ttl, operation_id).await,
            Err(e) => tracing::warn!(
                operation = operation_id,
                key = %key,
                "Result not cached, encoding failed: {}",
                e
            ),
        }
        Ok(records)
    }

    /// The store and key for this call, or `None` when the cache is skipped.
    fn prepare(&self, operation_id: &str, args: &CacheArgs) -> Option<(&dyn CacheStore, String)> {
        let store = self.store.as_deref()?;
        match args.cache_key(&self.namespace, operation_id) {
            Ok(key) => Some((store, key)),
            Err(e) => {
                tracing::warn!(operation = operation_id, "Bypassing cache: {}", e);
                None
            }
        }
    }
}

async fn read(store: &dyn CacheStore, key: &str, operation_id: &str) -> Option<String> {
    match store.get(key).await {
        Ok(Some(payload)) => {
            tracing::debug!(operation = operation_id, key = %key, "Cache hit");
            Some(payload)
        }
        Ok(None) => {
            tracing::debug!(operation = operation_id, key = %key, "Cache miss");
            None
        }
        Err(e) => {
            tracing::warn!(
                operation = operation_id,
                key = %key,
                "Cache read failed, treating as miss: {}",
                e
            );
            None
        }
    }
}

async fn write(store: &dyn CacheStore, key: &str, payload: &str, ttl: Duration, operation_id: &str) {
    if payload.is_empty() || ttl.is_zero() {
        return;
    }
    if let Err(e) = store.set_ex(key, payload, ttl).await {
        tracing::warn!(
            operation = operation_id,
            key = %key,
            "Cache write failed, result not cached: {}",
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Barrier;

    use super::*;
    use crate::cache::{CacheError, MemoryCache};
    use crate::error::Error;

    const TTL: Duration = Duration::from_secs(60);

    /// Store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    /// In-memory store that records every write.
    #[derive(Default)]
    struct RecordingStore {
        entries: Mutex<BTreeMap<String, String>>,
        writes: Mutex<Vec<(String, Duration)>>,
    }

    #[async_trait]
    impl CacheStore for RecordingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            self.writes.lock().unwrap().push((key.to_string(), ttl));
            Ok(())
        }
    }

    fn counted_fetch<'a>(
        calls: &'a AtomicUsize,
        payload: &'static str,
    ) -> impl Future<Output = Result<String, Error>> + 'a {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok(payload.to_string()) }
    }

    #[tokio::test]
    async fn hit_skips_fetch() {
        let store = Arc::new(MemoryCache::new());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new().arg("AAPL");
        let key = args.cache_key("test", "stats").unwrap();
        store.set(key, r#"{"symbol":"AAPL"}"#.to_string(), TTL);

        let calls = AtomicUsize::new(0);
        let result = coordinator
            .execute_cached("stats", &args, TTL, || counted_fetch(&calls, "fresh"))
            .await
            .unwrap();

        assert_eq!(result, r#"{"symbol":"AAPL"}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn miss_fetches_and_stores_with_ttl() {
        let store = Arc::new(RecordingStore::default());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new().arg("MSFT");
        let calls = AtomicUsize::new(0);

        let first = coordinator
            .execute_cached("stats", &args, TTL, || counted_fetch(&calls, "[1,2]"))
            .await
            .unwrap();
        let second = coordinator
            .execute_cached("stats", &args, TTL, || counted_fetch(&calls, "[3]"))
            .await
            .unwrap();

        assert_eq!(first, "[1,2]");
        assert_eq!(second, "[1,2]");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, args.cache_key("test", "stats").unwrap());
        assert_eq!(writes[0].1, TTL);
    }

    #[tokio::test]
    async fn broken_store_degrades_to_fetch() {
        let coordinator = CacheCoordinator::new(Arc::new(BrokenStore), "test");
        let args = CacheArgs::new().arg("AAPL");
        let calls = AtomicUsize::new(0);

        let result = coordinator
            .execute_cached("stats", &args, TTL, || counted_fetch(&calls, "payload"))
            .await
            .unwrap();

        assert_eq!(result, "payload");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_coordinator_always_fetches() {
        let coordinator = CacheCoordinator::disabled();
        assert!(!coordinator.is_enabled());
        let args = CacheArgs::new().arg("AAPL");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            coordinator
                .execute_cached("stats", &args, TTL, || counted_fetch(&calls, "payload"))
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fetch_error_propagates_and_is_not_cached() {
        let store = Arc::new(RecordingStore::default());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new().arg("ZZZZ");

        let result = coordinator
            .execute_cached("description", &args, TTL, || async {
                Err::<String, _>(Error::DataNotFound("company description".into()))
            })
            .await;

        match result {
            Err(Error::DataNotFound(msg)) => assert_eq!(msg, "company description"),
            other => panic!("expected DataNotFound, got {:?}", other),
        }
        assert!(store.writes.lock().unwrap().is_empty());
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_result_is_not_cached() {
        let store = Arc::new(RecordingStore::default());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new();

        let result = coordinator
            .execute_cached("latest_news", &args, TTL, || async { Ok::<_, Error>(String::new()) })
            .await
            .unwrap();

        assert!(result.is_empty());
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_ttl_is_not_cached() {
        let store = Arc::new(RecordingStore::default());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new().arg("AAPL");

        coordinator
            .execute_cached("stats", &args, Duration::ZERO, || async {
                Ok::<_, Error>("payload".to_string())
            })
            .await
            .unwrap();

        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unkeyable_args_bypass_store() {
        let store = Arc::new(RecordingStore::default());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1);
        let args = CacheArgs::new().arg(&bad);
        let calls = AtomicUsize::new(0);

        let result = coordinator
            .execute_cached("screener", &args, TTL, || counted_fetch(&calls, "rows"))
            .await
            .unwrap();

        assert_eq!(result, "rows");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_entry_is_refetched_and_overwritten() {
        let store = Arc::new(MemoryCache::new());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new().arg("AAPL");
        let key = args.cache_key("test", "description").unwrap();
        store.set(key.clone(), r#"{"old_schema":true}"#.to_string(), TTL);

        let calls = AtomicUsize::new(0);
        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Error>(vec!["fresh".to_string()]) }
        };
        let records: Vec<String> = coordinator
            .execute_cached_json("description", &args, TTL, fetch)
            .await
            .unwrap();

        assert_eq!(records, vec!["fresh".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(&key).as_deref(), Some(r#"["fresh"]"#));
    }

    #[tokio::test]
    async fn typed_hit_decodes_without_fetch() {
        let store = Arc::new(MemoryCache::new());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new();
        store.set(args.cache_key("test", "latest_news").unwrap(), r#"["a","b"]"#.to_string(), TTL);

        let records: Vec<String> = coordinator
            .execute_cached_json("latest_news", &args, TTL, || async {
                Err::<Vec<String>, _>(Error::RequestFailed("should not fetch".into()))
            })
            .await
            .unwrap();

        assert_eq!(records, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_cold_calls_both_fetch() {
        let store = Arc::new(MemoryCache::new());
        let coordinator = CacheCoordinator::new(store.clone(), "test");
        let args = CacheArgs::new().arg("NVDA");
        let calls = AtomicUsize::new(0);
        // Both fetches must be in flight at once to pass the barrier, which
        // proves both callers missed the cache.
        let barrier = Barrier::new(2);
        let (calls, barrier) = (&calls, &barrier);

        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            barrier.wait().await;
            Ok::<_, Error>("payload".to_string())
        };

        let (a, b) = tokio::join!(
            coordinator.execute_cached("stats", &args, TTL, fetch),
            coordinator.execute_cached("stats", &args, TTL, fetch),
        );

        assert_eq!(a.unwrap(), "payload");
        assert_eq!(b.unwrap(), "payload");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.len(), 1);
    }
}
