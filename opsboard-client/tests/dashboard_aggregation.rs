//! Aggregate-load behavior: fan-out into the domain stores, the coarse
//! throttle, partial payloads, and dedup against individual store loads.

use async_trait::async_trait;
use opsboard_client::{DashboardAggregator, StoreRegistry};
use opsboard_core::{CalendarState, TodoState};
use opsboard_sync::{LoadCoordinator, LoadRequest, Transport, TransportError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::advance;

struct MockTransport {
    delay: Duration,
    responses: Mutex<HashMap<String, Result<Value, TransportError>>>,
    gets: Mutex<Vec<String>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::from_millis(20),
            responses: Mutex::new(HashMap::new()),
            gets: Mutex::new(Vec::new()),
        })
    }

    fn respond(&self, endpoint: &str, result: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), result);
    }

    fn gets_for(&self, endpoint: &str) -> usize {
        self.gets
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == endpoint)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, endpoint: &str) -> Result<Value, TransportError> {
        self.gets.lock().unwrap().push(endpoint.to_string());
        tokio::time::sleep(self.delay).await;
        self.responses
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or(Err(TransportError::Http {
                status: 404,
                body: String::new(),
            }))
    }

    async fn post_json(&self, _endpoint: &str, _body: &Value) -> Result<Value, TransportError> {
        Ok(json!({"ok": true}))
    }
}

fn full_dashboard_payload() -> Value {
    let mut todos = TodoState::default();
    todos.add("ship release");
    todos.add("file taxes");
    let mut calendar = CalendarState::default();
    calendar.add_event("standup", chrono::Utc::now());

    json!({
        "todos": serde_json::to_value(&todos).unwrap(),
        "sales": {"leads": []},
        "calendar": serde_json::to_value(&calendar).unwrap(),
        "quickLinks": {"links": []},
    })
}

fn harness(transport: Arc<MockTransport>) -> (Arc<StoreRegistry>, DashboardAggregator) {
    let (registry, _events) = StoreRegistry::new(LoadCoordinator::with_defaults(), transport.clone());
    let aggregator = DashboardAggregator::new(Arc::clone(&registry), transport);
    (registry, aggregator)
}

#[tokio::test(start_paused = true)]
async fn aggregate_load_hydrates_every_present_domain() {
    let transport = MockTransport::new();
    transport.respond("/api/dashboard", Ok(full_dashboard_payload()));
    let (registry, aggregator) = harness(Arc::clone(&transport));

    aggregator.load_dashboard_data().await.unwrap();

    assert_eq!(transport.gets_for("/api/dashboard"), 1);
    assert_eq!(registry.todos().snapshot().todos.len(), 2);
    assert_eq!(registry.calendar().snapshot().events.len(), 1);
    assert!(registry.todos().has_loaded_from_server());
    assert!(registry.sales().has_loaded_from_server());
    assert!(registry.calendar().has_loaded_from_server());
    assert!(registry.quick_links().has_loaded_from_server());
    assert!(!registry.todos().is_loading());
}

#[tokio::test(start_paused = true)]
async fn repeat_within_throttle_is_a_noop() {
    let transport = MockTransport::new();
    transport.respond("/api/dashboard", Ok(full_dashboard_payload()));
    let (_registry, aggregator) = harness(Arc::clone(&transport));

    aggregator.load_dashboard_data().await.unwrap();
    advance(Duration::from_secs(10)).await;
    aggregator.load_dashboard_data().await.unwrap();

    assert_eq!(transport.gets_for("/api/dashboard"), 1);
}

#[tokio::test(start_paused = true)]
async fn throttle_expiry_allows_a_fresh_fetch() {
    let transport = MockTransport::new();
    transport.respond("/api/dashboard", Ok(full_dashboard_payload()));
    let (_registry, aggregator) = harness(Arc::clone(&transport));

    aggregator.load_dashboard_data().await.unwrap();
    // Past both the 30s throttle and the coordinator TTL.
    advance(Duration::from_secs(31)).await;
    aggregator.load_dashboard_data().await.unwrap();

    assert_eq!(transport.gets_for("/api/dashboard"), 2);
}

#[tokio::test(start_paused = true)]
async fn absent_domain_is_left_untouched() {
    let transport = MockTransport::new();
    let mut calendar = CalendarState::default();
    calendar.add_event("existing", chrono::Utc::now());
    transport.respond(
        "/api/calendar",
        Ok(serde_json::to_value(&calendar).unwrap()),
    );
    // Combined payload without the calendar key.
    transport.respond(
        "/api/dashboard",
        Ok(json!({
            "todos": {"todos": []},
            "sales": {"leads": []},
            "quickLinks": {"links": []},
        })),
    );
    let (registry, aggregator) = harness(Arc::clone(&transport));

    // Calendar hydrated independently before the aggregate call.
    registry
        .calendar()
        .load_from_server(LoadRequest::default())
        .await
        .unwrap();

    aggregator.load_dashboard_data().await.unwrap();

    // Absent key: records and latch exactly as before, spinner released.
    assert_eq!(registry.calendar().snapshot().events.len(), 1);
    assert!(registry.calendar().has_loaded_from_server());
    assert!(!registry.calendar().is_loading());
    // Present keys were applied.
    assert!(registry.todos().has_loaded_from_server());
    assert!(registry.quick_links().has_loaded_from_server());
}

#[tokio::test(start_paused = true)]
async fn absent_domain_that_never_loaded_keeps_latch_unset() {
    let transport = MockTransport::new();
    transport.respond(
        "/api/dashboard",
        Ok(json!({
            "todos": {"todos": []},
            "sales": {"leads": []},
            "quickLinks": {"links": []},
        })),
    );
    let (registry, aggregator) = harness(Arc::clone(&transport));

    aggregator.load_dashboard_data().await.unwrap();

    assert!(!registry.calendar().has_loaded_from_server());
    assert!(!registry.calendar().is_loading());
}

#[tokio::test(start_paused = true)]
async fn aggregate_failure_settles_every_store() {
    let transport = MockTransport::new();
    transport.respond(
        "/api/dashboard",
        Err(TransportError::Http {
            status: 503,
            body: String::new(),
        }),
    );
    let (registry, aggregator) = harness(Arc::clone(&transport));

    let result = aggregator.load_dashboard_data().await;
    assert!(result.is_err());

    for (loaded, loading) in [
        (
            registry.todos().has_loaded_from_server(),
            registry.todos().is_loading(),
        ),
        (
            registry.sales().has_loaded_from_server(),
            registry.sales().is_loading(),
        ),
        (
            registry.calendar().has_loaded_from_server(),
            registry.calendar().is_loading(),
        ),
        (
            registry.quick_links().has_loaded_from_server(),
            registry.quick_links().is_loading(),
        ),
    ] {
        assert!(loaded, "store must latch after aggregate failure");
        assert!(!loading, "spinner must release after aggregate failure");
    }
    assert!(registry.todos().snapshot().todos.is_empty());
}

#[tokio::test(start_paused = true)]
async fn widget_load_during_aggregate_window_issues_no_fetch() {
    let transport = MockTransport::new();
    transport.respond("/api/dashboard", Ok(full_dashboard_payload()));
    let (registry, aggregator) = harness(Arc::clone(&transport));

    let todos = registry.todos().clone();
    let (aggregate, widget) = tokio::join!(
        aggregator.load_dashboard_data(),
        todos.load_from_server(LoadRequest::default()),
    );

    aggregate.unwrap();
    widget.unwrap();
    assert_eq!(transport.gets_for("/api/dashboard"), 1);
    assert_eq!(transport.gets_for("/api/todos"), 0);
    assert_eq!(registry.todos().snapshot().todos.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn store_handles_share_one_underlying_store() {
    let transport = MockTransport::new();
    let (registry, _aggregator) = harness(transport);

    // A cloned handle writes into the same store the registry hands out.
    let handle = registry.todos().clone();
    handle.mutate(|state| {
        state.add("from the clone");
    });

    assert_eq!(registry.todos().snapshot().todos.len(), 1);
}
