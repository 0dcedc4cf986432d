//! Todo list store.

use super::{parse_state, serialize_state};
use opsboard_core::{RecordId, TodoState};
use opsboard_sync::{EntityStore, Resource, SaveRequest, SyncResult};
use serde_json::Value;

pub type TodoStore = EntityStore<TodoResource>;

pub struct TodoResource;

impl Resource for TodoResource {
    type State = TodoState;

    fn cache_key(&self) -> &str {
        "todos-data"
    }

    fn endpoint(&self) -> &str {
        "/api/todos"
    }

    fn parse(&self, raw: &Value, _previous: &Self::State) -> SyncResult<Self::State> {
        parse_state(self.cache_key(), raw)
    }

    fn serialize(&self, state: &Self::State) -> SyncResult<Value> {
        serialize_state(self.cache_key(), state)
    }
}

pub async fn add_todo(store: &TodoStore, text: &str) -> SyncResult<RecordId> {
    let id = store.mutate(|state| state.add(text));
    store.save_to_server(SaveRequest::default()).await?;
    Ok(id)
}

pub async fn update_text(store: &TodoStore, id: RecordId, text: &str) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.update_text(id, text));
    if changed {
        store.save_to_server(SaveRequest::default()).await?;
    }
    Ok(changed)
}

/// Keystroke-driven, so debounced.
pub async fn update_notes(store: &TodoStore, id: RecordId, notes: &str) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.update_notes(id, notes));
    if changed {
        store.save_to_server(SaveRequest::default()).await?;
    }
    Ok(changed)
}

pub async fn toggle_done(store: &TodoStore, id: RecordId) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.toggle_done(id));
    if changed {
        store.save_to_server(SaveRequest::default()).await?;
    }
    Ok(changed)
}

/// Deletes must stick immediately.
pub async fn delete_todo(store: &TodoStore, id: RecordId) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.delete(id));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}

/// Fires on drag-drop, so flushed immediately.
pub async fn reorder_todo(store: &TodoStore, id: RecordId, to: usize) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.reorder(id, to));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}
