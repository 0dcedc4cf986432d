//! Email template store. Hydrates through its own endpoint only.

use super::{parse_state, serialize_state};
use opsboard_core::{EmailTemplateState, RecordId};
use opsboard_sync::{EntityStore, Resource, SaveRequest, SyncResult};
use serde_json::Value;

pub type EmailTemplateStore = EntityStore<EmailTemplateResource>;

pub struct EmailTemplateResource;

impl Resource for EmailTemplateResource {
    type State = EmailTemplateState;

    fn cache_key(&self) -> &str {
        "email-templates-data"
    }

    fn endpoint(&self) -> &str {
        "/api/email-templates"
    }

    fn parse(&self, raw: &Value, _previous: &Self::State) -> SyncResult<Self::State> {
        parse_state(self.cache_key(), raw)
    }

    fn serialize(&self, state: &Self::State) -> SyncResult<Value> {
        serialize_state(self.cache_key(), state)
    }
}

pub async fn add_template(
    store: &EmailTemplateStore,
    name: &str,
    subject: &str,
) -> SyncResult<RecordId> {
    let id = store.mutate(|state| state.add(name, subject));
    store.save_to_server(SaveRequest::default()).await?;
    Ok(id)
}

/// Template bodies are edited in a large text area; debounced.
pub async fn update_body(
    store: &EmailTemplateStore,
    id: RecordId,
    body: &str,
) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.update_body(id, body));
    if changed {
        store.save_to_server(SaveRequest::default()).await?;
    }
    Ok(changed)
}

pub async fn delete_template(store: &EmailTemplateStore, id: RecordId) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.delete(id));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}
