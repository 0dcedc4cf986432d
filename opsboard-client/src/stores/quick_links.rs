//! Quick-link store.

use super::{parse_state, serialize_state};
use opsboard_core::{QuickLinkState, RecordId};
use opsboard_sync::{EntityStore, Resource, SaveRequest, SyncResult};
use serde_json::Value;

pub type QuickLinkStore = EntityStore<QuickLinkResource>;

pub struct QuickLinkResource;

impl Resource for QuickLinkResource {
    type State = QuickLinkState;

    fn cache_key(&self) -> &str {
        "quick-links-data"
    }

    fn endpoint(&self) -> &str {
        "/api/quick-links"
    }

    fn parse(&self, raw: &Value, _previous: &Self::State) -> SyncResult<Self::State> {
        parse_state(self.cache_key(), raw)
    }

    fn serialize(&self, state: &Self::State) -> SyncResult<Value> {
        serialize_state(self.cache_key(), state)
    }
}

pub async fn add_link(store: &QuickLinkStore, label: &str, url: &str) -> SyncResult<RecordId> {
    let id = store.mutate(|state| state.add(label, url));
    store.save_to_server(SaveRequest::default()).await?;
    Ok(id)
}

pub async fn delete_link(store: &QuickLinkStore, id: RecordId) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.delete(id));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}

pub async fn reorder_link(store: &QuickLinkStore, id: RecordId, to: usize) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.reorder(id, to));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}
