//! Sales pipeline store.

use super::{parse_state, serialize_state};
use opsboard_core::{RecordId, SalesStage, SalesState};
use opsboard_sync::{EntityStore, Resource, SaveRequest, SyncResult};
use serde_json::Value;

pub type SalesStore = EntityStore<SalesResource>;

pub struct SalesResource;

impl Resource for SalesResource {
    type State = SalesState;

    fn cache_key(&self) -> &str {
        "sales-data"
    }

    fn endpoint(&self) -> &str {
        "/api/sales"
    }

    fn parse(&self, raw: &Value, _previous: &Self::State) -> SyncResult<Self::State> {
        parse_state(self.cache_key(), raw)
    }

    fn serialize(&self, state: &Self::State) -> SyncResult<Value> {
        serialize_state(self.cache_key(), state)
    }
}

pub async fn add_lead(
    store: &SalesStore,
    company: &str,
    contact: &str,
    value_cents: i64,
) -> SyncResult<RecordId> {
    let id = store.mutate(|state| state.add_lead(company, contact, value_cents));
    store.save_to_server(SaveRequest::default()).await?;
    Ok(id)
}

/// A board drag between pipeline columns; flushed immediately.
pub async fn move_stage(
    store: &SalesStore,
    id: RecordId,
    stage: SalesStage,
) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.move_stage(id, stage));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}

pub async fn update_notes(store: &SalesStore, id: RecordId, notes: &str) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.update_notes(id, notes));
    if changed {
        store.save_to_server(SaveRequest::default()).await?;
    }
    Ok(changed)
}

pub async fn delete_lead(store: &SalesStore, id: RecordId) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.delete(id));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}
