//! Minimal headless entry point: hydrate every store once and report what
//! the server holds. Useful as a smoke check against a running backend.

use opsboard_client::{
    ClientConfig, ClientError, DashboardAggregator, RestClient, StoreRegistry,
};
use opsboard_sync::{CoordinatorConfig, LoadCoordinator, LoadRequest, SyncEvent, Transport};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::load()?;
    let transport: Arc<dyn Transport> = Arc::new(RestClient::new(&config)?);
    let coordinator =
        LoadCoordinator::new(CoordinatorConfig::new().with_cache_ttl(config.cache_ttl()));

    let (registry, mut events) = StoreRegistry::new(coordinator, Arc::clone(&transport));
    let aggregator = DashboardAggregator::with_throttle(
        Arc::clone(&registry),
        transport,
        config.dashboard_throttle(),
    );

    aggregator.load_dashboard_data().await?;
    registry
        .expenses()
        .load_from_server(LoadRequest::default())
        .await?;
    registry
        .email_templates()
        .load_from_server(LoadRequest::default())
        .await?;

    tracing::info!(
        todos = registry.todos().snapshot().todos.len(),
        leads = registry.sales().snapshot().leads.len(),
        events = registry.calendar().snapshot().events.len(),
        links = registry.quick_links().snapshot().links.len(),
        expenses = registry.expenses().snapshot().expenses.len(),
        templates = registry.email_templates().snapshot().templates.len(),
        "dashboard hydrated"
    );

    while let Ok(event) = events.try_recv() {
        match event {
            SyncEvent::AuthExpired => tracing::warn!("session expired during hydration"),
            SyncEvent::SaveDropped { key } => tracing::warn!(key, "save dropped"),
        }
    }

    Ok(())
}
