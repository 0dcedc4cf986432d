//! Load coordination: request deduplication and a TTL-bounded payload cache.
//!
//! Every server read in the application funnels through [`LoadCoordinator`].
//! It guarantees that N overlapping loads for one key invoke the underlying
//! fetch exactly once, and that a load repeated shortly after a successful
//! one is answered from cache without touching the network.

use crate::error::SyncResult;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Default validity window for cached payloads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Configuration for the load coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How long a successfully loaded payload stays servable from cache.
    pub cache_ttl: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Per-call load options.
///
/// The two flags are deliberately separate: skipping the freshness check and
/// forcing a brand-new underlying request are different decisions, and a
/// store that is already mid-load wants the first without the second.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Ignore any cached payload for this key. An in-flight request is still
    /// joined, so overlapping callers share one fetch.
    pub skip_cache: bool,
    /// Start a fresh underlying request even if one is in flight. The new
    /// request replaces the old one as the joinable in-flight entry; callers
    /// already waiting on the old request keep their result.
    pub force_new_request: bool,
}

impl LoadOptions {
    /// Skip the freshness check but still join an in-flight request.
    pub fn skip_cache() -> Self {
        Self {
            skip_cache: true,
            force_new_request: false,
        }
    }
}

/// A resolved payload plus the instant it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    stored_at: Instant,
}

type SharedLoad = Shared<BoxFuture<'static, SyncResult<Value>>>;

/// In-flight entry: the joinable future plus a generation stamp so a
/// settling request only removes itself, never a replacement.
#[derive(Clone)]
struct InFlight {
    load: SharedLoad,
    generation: u64,
}

/// Shared cache/dedup service, one instance per application.
///
/// Cheap to clone; clones share the same cache and in-flight tables. The
/// instance is constructed at startup and injected into every store rather
/// than living in a global.
#[derive(Clone)]
pub struct LoadCoordinator {
    config: CoordinatorConfig,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    in_flight: Arc<Mutex<HashMap<String, InFlight>>>,
    generations: Arc<AtomicU64>,
}

impl LoadCoordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            cache: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CoordinatorConfig::default())
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Load the payload for `key`, deduplicating against concurrent callers
    /// and consulting the TTL cache.
    ///
    /// `load_fn` is invoked at most once per underlying request; when a
    /// request for the same key is already in flight, the caller joins it
    /// and observes the identical result. A failed load is propagated to
    /// every joined caller, is never cached, and clears the in-flight slot
    /// so the next call can retry.
    pub async fn load<F, Fut>(
        &self,
        key: &str,
        options: LoadOptions,
        load_fn: F,
    ) -> SyncResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SyncResult<Value>> + Send + 'static,
    {
        if !options.skip_cache && !options.force_new_request {
            if let Some(data) = self.cached(key) {
                tracing::debug!(key, "coordinated load served from cache");
                return Ok(data);
            }
        }

        let shared = {
            let mut in_flight = lock(&self.in_flight);
            let joinable = if options.force_new_request {
                None
            } else {
                in_flight.get(key).map(|existing| existing.load.clone())
            };
            match joinable {
                Some(load) => {
                    tracing::debug!(key, "joining in-flight load");
                    load
                }
                None => {
                    let generation = self.generations.fetch_add(1, Ordering::Relaxed);
                    let shared = self.register_load(key, generation, load_fn());
                    in_flight.insert(
                        key.to_string(),
                        InFlight {
                            load: shared.clone(),
                            generation,
                        },
                    );
                    shared
                }
            }
        };

        shared.await
    }

    /// Wrap a raw fetch so that, on settlement, it unregisters itself and
    /// caches a successful payload. Nothing is spawned: the future runs
    /// inside whichever joined caller polls it to completion.
    fn register_load<Fut>(&self, key: &str, generation: u64, fut: Fut) -> SharedLoad
    where
        Fut: Future<Output = SyncResult<Value>> + Send + 'static,
    {
        let key = key.to_string();
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        async move {
            let result = fut.await;
            {
                let mut guard = lock(&in_flight);
                // Only remove our own registration; a force_new_request may
                // have replaced it with a newer generation.
                if guard.get(&key).is_some_and(|e| e.generation == generation) {
                    guard.remove(&key);
                }
            }
            match &result {
                Ok(data) => {
                    lock(&cache).insert(
                        key,
                        CacheEntry {
                            data: data.clone(),
                            stored_at: Instant::now(),
                        },
                    );
                }
                Err(err) => {
                    tracing::warn!(key, %err, "coordinated load failed");
                }
            }
            result
        }
        .boxed()
        .shared()
    }

    /// The cached payload for `key`, if present and within TTL.
    pub fn cached(&self, key: &str) -> Option<Value> {
        let cache = lock(&self.cache);
        let entry = cache.get(key)?;
        if entry.stored_at.elapsed() < self.config.cache_ttl {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    /// Drop the cache entry for one key, forcing the next load to refetch.
    pub fn clear(&self, key: &str) {
        lock(&self.cache).remove(key);
    }

    /// Drop every cache entry.
    pub fn clear_all(&self) {
        lock(&self.cache).clear();
    }

    /// Whether a request for `key` is currently in flight.
    pub fn is_in_flight(&self, key: &str) -> bool {
        lock(&self.in_flight).contains_key(key)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SyncError, TransportError};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn counting_loader(
        calls: &Arc<AtomicUsize>,
        payload: Value,
    ) -> impl Future<Output = SyncResult<Value>> + Send + 'static {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(payload)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_loads_share_one_fetch() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let payload = json!({"todos": [1, 2, 3]});

        let (a, b, c) = tokio::join!(
            coordinator.load("todos-data", LoadOptions::default(), || counting_loader(
                &calls,
                payload.clone()
            )),
            coordinator.load("todos-data", LoadOptions::default(), || counting_loader(
                &calls,
                payload.clone()
            )),
            coordinator.load("todos-data", LoadOptions::default(), || counting_loader(
                &calls,
                payload.clone()
            )),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), payload);
        assert_eq!(b.unwrap(), payload);
        assert_eq!(c.unwrap(), payload);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_cache_answers_without_fetching() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let payload = json!({"sales": []});

        coordinator
            .load("sales-data", LoadOptions::default(), || {
                counting_loader(&calls, payload.clone())
            })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;

        let second = coordinator
            .load("sales-data", LoadOptions::default(), || {
                counting_loader(&calls, payload.clone())
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second, payload);
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expiry_forces_refetch() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let payload = json!([1]);

        coordinator
            .load("expenses-data", LoadOptions::default(), || {
                counting_loader(&calls, payload.clone())
            })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;

        coordinator
            .load("expenses-data", LoadOptions::default(), || {
                counting_loader(&calls, payload.clone())
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_cache_still_joins_in_flight() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let payload = json!({"events": []});

        let (a, b) = tokio::join!(
            coordinator.load("calendar-data", LoadOptions::default(), || {
                counting_loader(&calls, payload.clone())
            }),
            coordinator.load("calendar-data", LoadOptions::skip_cache(), || {
                counting_loader(&calls, payload.clone())
            }),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn skip_cache_ignores_fresh_entry() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let payload = json!(null);

        coordinator
            .load("links-data", LoadOptions::default(), || {
                counting_loader(&calls, payload.clone())
            })
            .await
            .unwrap();

        coordinator
            .load("links-data", LoadOptions::skip_cache(), || {
                counting_loader(&calls, payload.clone())
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_not_cached_and_clears_in_flight() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SyncError::Transport(TransportError::Network(
                    "connection refused".to_string(),
                )))
            }
        };

        let first = coordinator
            .load("todos-data", LoadOptions::default(), || failing(&calls))
            .await;
        assert!(first.is_err());
        assert!(!coordinator.is_in_flight("todos-data"));
        assert!(coordinator.cached("todos-data").is_none());

        // Retry goes back to the loader.
        let second = coordinator
            .load("todos-data", LoadOptions::default(), || failing(&calls))
            .await;
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_fans_out_to_all_joined_callers() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err(SyncError::Transport(TransportError::Http {
                        status: 500,
                        body: String::new(),
                    }))
                }
            }
        };

        let (a, b): (SyncResult<Value>, SyncResult<Value>) = tokio::join!(
            coordinator.load("sales-data", LoadOptions::default(), failing.clone()),
            coordinator.load("sales-data", LoadOptions::default(), failing.clone()),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap_err(), b.unwrap_err());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_single_key() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));

        coordinator
            .load("a", LoadOptions::default(), || {
                counting_loader(&calls, json!(1))
            })
            .await
            .unwrap();
        coordinator
            .load("b", LoadOptions::default(), || {
                counting_loader(&calls, json!(2))
            })
            .await
            .unwrap();

        coordinator.clear("a");
        assert!(coordinator.cached("a").is_none());
        assert_eq!(coordinator.cached("b"), Some(json!(2)));

        coordinator.clear_all();
        assert!(coordinator.cached("b").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn force_new_request_bypasses_join() {
        let coordinator = LoadCoordinator::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = LoadOptions {
            skip_cache: true,
            force_new_request: true,
        };

        let (a, b) = tokio::join!(
            coordinator.load("todos-data", LoadOptions::default(), || counting_loader(
                &calls,
                json!(1)
            )),
            coordinator.load("todos-data", options, || counting_loader(&calls, json!(2))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // Each caller keeps its own request's result.
        assert_eq!(a.unwrap(), json!(1));
        assert_eq!(b.unwrap(), json!(2));
        assert!(!coordinator.is_in_flight("todos-data"));
    }
}
