//! Calendar store.
//!
//! Events carry a `recurring_pattern` field that is persisted as-is; no
//! instance expansion happens anywhere in the client.

use super::{parse_state, serialize_state};
use opsboard_core::{CalendarEvent, CalendarState, RecordId, Timestamp};
use opsboard_sync::{EntityStore, Resource, SaveRequest, SyncResult};
use serde_json::Value;

pub type CalendarStore = EntityStore<CalendarResource>;

pub struct CalendarResource;

impl Resource for CalendarResource {
    type State = CalendarState;

    fn cache_key(&self) -> &str {
        "calendar-data"
    }

    fn endpoint(&self) -> &str {
        "/api/calendar"
    }

    fn parse(&self, raw: &Value, _previous: &Self::State) -> SyncResult<Self::State> {
        parse_state(self.cache_key(), raw)
    }

    fn serialize(&self, state: &Self::State) -> SyncResult<Value> {
        serialize_state(self.cache_key(), state)
    }
}

pub async fn add_event(
    store: &CalendarStore,
    title: &str,
    starts_at: Timestamp,
) -> SyncResult<RecordId> {
    let id = store.mutate(|state| state.add_event(title, starts_at));
    store.save_to_server(SaveRequest::default()).await?;
    Ok(id)
}

pub async fn update_event(
    store: &CalendarStore,
    id: RecordId,
    apply: impl FnOnce(&mut CalendarEvent),
) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.update_event(id, apply));
    if changed {
        store.save_to_server(SaveRequest::default()).await?;
    }
    Ok(changed)
}

pub async fn delete_event(store: &CalendarStore, id: RecordId) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.delete(id));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}
