//! Dashboard aggregation: one combined fetch fanned out into the domain
//! stores.
//!
//! On first render every widget wants its data at once. Instead of four
//! separate GETs, the aggregator issues a single `/api/dashboard` request
//! and injects each sub-payload directly into its store, bypassing the
//! per-store load path. Stores are flagged `is_loading` before the fetch so
//! a widget independently calling `load_from_server` during the window sees
//! an in-progress load and does not issue its own request.

use crate::registry::StoreRegistry;
use opsboard_sync::{
    EntityStore, LoadOptions, Resource, SyncResult, Transport,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Coordinator key for the combined fetch, so simultaneous widget mounts
/// dedup against each other like any other load.
pub const DASHBOARD_CACHE_KEY: &str = "dashboard-data";

/// Combined endpoint returning one object keyed by domain name.
pub const DASHBOARD_ENDPOINT: &str = "/api/dashboard";

/// Default minimum spacing between combined fetches. Coarser than and
/// checked before the coordinator's TTL.
pub const DEFAULT_DASHBOARD_THROTTLE: Duration = Duration::from_secs(30);

pub struct DashboardAggregator {
    registry: Arc<StoreRegistry>,
    transport: Arc<dyn Transport>,
    throttle: Duration,
    last_success: Mutex<Option<Instant>>,
}

impl DashboardAggregator {
    pub fn new(registry: Arc<StoreRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self::with_throttle(registry, transport, DEFAULT_DASHBOARD_THROTTLE)
    }

    pub fn with_throttle(
        registry: Arc<StoreRegistry>,
        transport: Arc<dyn Transport>,
        throttle: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            throttle,
            last_success: Mutex::new(None),
        }
    }

    /// Load every dashboard domain through one combined request.
    ///
    /// Short-circuits if the last successful aggregate load is younger than
    /// the throttle. On success each domain key present in the payload is
    /// written into its store; absent keys leave their stores untouched
    /// (absent is not "empty" - an independently hydrated store keeps its
    /// records). On failure every sub-store is settled so no spinner
    /// deadlocks, but data is left as-is.
    pub async fn load_dashboard_data(&self) -> SyncResult<()> {
        if let Some(at) = *self.lock_last_success() {
            if at.elapsed() < self.throttle {
                tracing::debug!("dashboard load throttled");
                return Ok(());
            }
        }

        let registry = &self.registry;
        registry.todos().begin_external_load();
        registry.sales().begin_external_load();
        registry.calendar().begin_external_load();
        registry.quick_links().begin_external_load();

        let transport = Arc::clone(&self.transport);
        let result = registry
            .coordinator()
            .load(DASHBOARD_CACHE_KEY, LoadOptions::default(), move || async move {
                Ok(transport.get_json(DASHBOARD_ENDPOINT).await?)
            })
            .await;

        match result {
            Ok(raw) => {
                inject(registry.todos(), raw.get("todos"));
                inject(registry.sales(), raw.get("sales"));
                inject(registry.calendar(), raw.get("calendar"));
                inject(registry.quick_links(), raw.get("quickLinks"));
                *self.lock_last_success() = Some(Instant::now());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "dashboard load failed");
                registry.todos().settle_external_load();
                registry.sales().settle_external_load();
                registry.calendar().settle_external_load();
                registry.quick_links().settle_external_load();
                Err(err)
            }
        }
    }

    fn lock_last_success(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.last_success
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write one domain's sub-payload straight into its store. A missing key
/// releases the spinner and changes nothing else; an unparseable payload is
/// treated like a failed load for that store alone.
fn inject<R>(store: &EntityStore<R>, payload: Option<&Value>)
where
    R: Resource,
    R::State: DeserializeOwned,
{
    match payload {
        Some(value) => match serde_json::from_value::<R::State>(value.clone()) {
            Ok(state) => store.apply_loaded(state),
            Err(err) => {
                tracing::warn!(key = store.cache_key(), %err, "bad aggregate sub-payload");
                store.settle_external_load();
            }
        },
        None => store.cancel_external_load(),
    }
}
