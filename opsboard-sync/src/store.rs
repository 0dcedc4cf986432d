//! Generic entity store slice: one per dashboard domain.
//!
//! An [`EntityStore`] wraps exactly one REST resource with load/save
//! plumbing. Loads are routed through the shared [`LoadCoordinator`]; saves
//! go through the store's own [`SaveScheduler`] and always transmit the
//! full current collection (full-state overwrite, no deltas).

use crate::coordinator::{LoadCoordinator, LoadOptions};
use crate::error::{SyncError, SyncResult, TransportError};
use crate::event::{SyncEvent, SyncEventSender};
use crate::scheduler::{SaveScheduler, DEFAULT_DEBOUNCE_INTERVAL};
use crate::transport::Transport;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Domain hook: ties one collection state type to its wire representation.
///
/// Implementations are plain structs configuring endpoint, coordinator key,
/// and the parse/serialize pair; the store owns all load/save mechanics.
pub trait Resource: Send + Sync + 'static {
    /// The domain's collection state (records plus nothing else).
    type State: Clone + Default + Send + Sync + 'static;

    /// The coordinator key identifying this resource for dedup/caching.
    fn cache_key(&self) -> &str;

    /// REST endpoint; GET returns the collection, POST overwrites it.
    fn endpoint(&self) -> &str;

    /// Debounce window for coalescing save bursts.
    fn debounce_interval(&self) -> Duration {
        DEFAULT_DEBOUNCE_INTERVAL
    }

    /// Parse a GET payload into fresh state. `previous` is the state being
    /// replaced, for domains that merge rather than overwrite.
    fn parse(&self, raw: &Value, previous: &Self::State) -> SyncResult<Self::State>;

    /// Serialize the full current state into a POST body.
    fn serialize(&self, state: &Self::State) -> SyncResult<Value>;

    /// Called after every successful hydration.
    fn after_load(&self, _state: &Self::State) {}

    /// Called after every successful persisted write.
    fn after_save(&self, _state: &Self::State) {}
}

/// Options for [`EntityStore::load_from_server`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadRequest {
    /// Load even if the store already hydrated once.
    pub force: bool,
}

impl LoadRequest {
    pub fn force() -> Self {
        Self { force: true }
    }
}

/// Options for [`EntityStore::save_to_server`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveRequest {
    /// Skip the debounce window and write synchronously now. Used for
    /// operations the user expects to stick immediately (deletes), as
    /// opposed to keystroke-driven edits.
    pub immediate: bool,
}

impl SaveRequest {
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

struct StoreState<S> {
    data: S,
    is_loading: bool,
    /// One-way latch: set on the first load settlement (success or failure)
    /// and never cleared. Gates every save so an empty pre-hydration state
    /// can never overwrite server data.
    has_loaded_from_server: bool,
}

impl<S: Default> Default for StoreState<S> {
    fn default() -> Self {
        Self {
            data: S::default(),
            is_loading: false,
            has_loaded_from_server: false,
        }
    }
}

struct Inner<R: Resource> {
    resource: R,
    state: Mutex<StoreState<R::State>>,
    coordinator: LoadCoordinator,
    transport: Arc<dyn Transport>,
    scheduler: SaveScheduler,
    events: SyncEventSender,
}

/// Load/save wrapper around one domain's collection state.
///
/// Cheap to clone; clones share the same state, so handing one around is
/// handing out the same store. Exactly one instance should exist per
/// endpoint; the client crate's registry enforces that structurally by
/// being the only construction path.
pub struct EntityStore<R: Resource> {
    inner: Arc<Inner<R>>,
}

impl<R: Resource> Clone for EntityStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> EntityStore<R> {
    pub fn new(
        resource: R,
        coordinator: LoadCoordinator,
        transport: Arc<dyn Transport>,
        events: SyncEventSender,
    ) -> Self {
        let scheduler = SaveScheduler::new(resource.debounce_interval());
        Self {
            inner: Arc::new(Inner {
                resource,
                state: Mutex::new(StoreState::default()),
                coordinator,
                transport,
                scheduler,
                events,
            }),
        }
    }

    pub fn cache_key(&self) -> &str {
        self.inner.resource.cache_key()
    }

    pub fn endpoint(&self) -> &str {
        self.inner.resource.endpoint()
    }

    /// Hydrate the store from the server.
    ///
    /// No-op once hydrated unless `force` is set. Overlapping callers are
    /// deduplicated: the second caller observes `is_loading` and joins the
    /// in-flight request instead of being served a possibly stale cache
    /// entry. On failure the latch still flips so the UI never spins
    /// forever, and the error is returned for the caller to handle.
    pub async fn load_from_server(&self, request: LoadRequest) -> SyncResult<()> {
        let inner = &self.inner;
        let already_loading = {
            let mut state = inner.lock_state();
            if state.has_loaded_from_server && !request.force {
                return Ok(());
            }
            let already_loading = state.is_loading;
            state.is_loading = true;
            already_loading
        };

        // A store can be mid-load for two reasons: its own fetch is in
        // flight under our key (join it, skipping stale cache), or the
        // dashboard aggregator is hydrating us from the combined endpoint
        // (nothing under our key; fetching now would duplicate work, so
        // leave it to the aggregator to settle us).
        if already_loading && !inner.coordinator.is_in_flight(inner.resource.cache_key()) {
            return Ok(());
        }

        let options = if already_loading {
            LoadOptions::skip_cache()
        } else {
            LoadOptions::default()
        };

        let transport = Arc::clone(&inner.transport);
        let endpoint = inner.resource.endpoint().to_string();
        let result = inner
            .coordinator
            .load(inner.resource.cache_key(), options, move || async move {
                Ok(transport.get_json(&endpoint).await?)
            })
            .await;

        match result {
            Ok(raw) => {
                let parsed = {
                    let state = inner.lock_state();
                    inner.resource.parse(&raw, &state.data)
                };
                match parsed {
                    Ok(data) => {
                        let snapshot = {
                            let mut state = inner.lock_state();
                            state.data = data;
                            state.is_loading = false;
                            state.has_loaded_from_server = true;
                            state.data.clone()
                        };
                        inner.resource.after_load(&snapshot);
                        Ok(())
                    }
                    Err(err) => inner.settle_failed_load(err),
                }
            }
            Err(err) => inner.settle_failed_load(err),
        }
    }

    /// Apply a synchronous local mutation. The caller follows up with
    /// [`save_to_server`](Self::save_to_server); mutation and persistence
    /// are separate so a burst of edits schedules a single write.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut R::State) -> T) -> T {
        let mut state = self.inner.lock_state();
        f(&mut state.data)
    }

    /// Request persistence of the current collection.
    ///
    /// No-op before the first hydration completes or while a load is in
    /// flight. The body is serialized when the write actually happens, so a
    /// debounced save carries the newest state at fire time.
    pub async fn save_to_server(&self, request: SaveRequest) -> SyncResult<()> {
        let inner = &self.inner;
        {
            let state = inner.lock_state();
            if !state.has_loaded_from_server || state.is_loading {
                tracing::debug!(
                    key = inner.resource.cache_key(),
                    loaded = state.has_loaded_from_server,
                    loading = state.is_loading,
                    "save skipped"
                );
                return Ok(());
            }
        }

        let flush_inner = Arc::clone(inner);
        if request.immediate {
            inner
                .scheduler
                .flush_now(async move { flush_inner.flush().await })
                .await;
        } else {
            inner
                .scheduler
                .schedule(async move { flush_inner.flush().await });
        }
        Ok(())
    }

    /// Clone of the current collection state.
    pub fn snapshot(&self) -> R::State {
        self.inner.lock_state().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock_state().is_loading
    }

    pub fn has_loaded_from_server(&self) -> bool {
        self.inner.lock_state().has_loaded_from_server
    }

    /// Whether a debounced save is waiting to fire.
    pub fn has_pending_save(&self) -> bool {
        self.inner.scheduler.has_pending()
    }

    // ------------------------------------------------------------------
    // Aggregate injection hooks.
    //
    // The dashboard aggregator hydrates several stores from one combined
    // payload, bypassing each store's own loader. These hooks keep the
    // store's flags consistent while it does so.
    // ------------------------------------------------------------------

    /// Mark the store loading before an external (aggregate) fetch starts,
    /// so independent `load_from_server` callers join that fetch instead of
    /// issuing their own.
    pub fn begin_external_load(&self) {
        self.inner.lock_state().is_loading = true;
    }

    /// Inject externally parsed state and mark the store hydrated.
    pub fn apply_loaded(&self, data: R::State) {
        let snapshot = {
            let mut state = self.inner.lock_state();
            state.data = data;
            state.is_loading = false;
            state.has_loaded_from_server = true;
            state.data.clone()
        };
        self.inner.resource.after_load(&snapshot);
    }

    /// Settle an external load without touching the data (aggregate
    /// failure): spinner released, latch set, records untouched.
    pub fn settle_external_load(&self) {
        let mut state = self.inner.lock_state();
        state.is_loading = false;
        state.has_loaded_from_server = true;
    }

    /// Release the spinner without latching or touching data. Used when the
    /// combined payload simply had no key for this domain; the store is
    /// left exactly as it was before the aggregate fetch began.
    pub fn cancel_external_load(&self) {
        self.inner.lock_state().is_loading = false;
    }
}

impl<R: Resource> Inner<R> {
    fn settle_failed_load(&self, err: SyncError) -> SyncResult<()> {
        tracing::warn!(key = self.resource.cache_key(), %err, "load failed");
        {
            let mut state = self.lock_state();
            state.is_loading = false;
            // Deliberate: latch anyway, otherwise a retry loop keeps the
            // loading spinner alive forever.
            state.has_loaded_from_server = true;
        }
        if err.is_unauthorized() {
            let _ = self.events.send(SyncEvent::AuthExpired);
        }
        Err(err)
    }

    /// Serialize and POST the full current collection. Failures are logged
    /// and dropped; a server-side `blocked` rejection is silent success.
    async fn flush(self: Arc<Self>) {
        let body = {
            let state = self.lock_state();
            match self.resource.serialize(&state.data) {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(
                        key = self.resource.cache_key(),
                        %err,
                        "serialize failed, save dropped"
                    );
                    return;
                }
            }
        };
        match self.transport.post_json(self.resource.endpoint(), &body).await {
            Ok(_) => {
                // The cached GET payload predates this write; drop it so a
                // forced reload within the TTL refetches instead of
                // reverting to pre-save state.
                self.coordinator.clear(self.resource.cache_key());
                let snapshot = self.lock_state().data.clone();
                self.resource.after_save(&snapshot);
            }
            Err(TransportError::Blocked) => {
                tracing::debug!(key = self.resource.cache_key(), "save blocked by server");
            }
            Err(err) => {
                tracing::warn!(key = self.resource.cache_key(), %err, "save dropped");
                let _ = self.events.send(SyncEvent::SaveDropped {
                    key: self.resource.cache_key().to_string(),
                });
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState<R::State>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
