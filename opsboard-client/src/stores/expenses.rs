//! Expense sheet store. Not part of the combined dashboard payload; it
//! hydrates through its own endpoint when the expenses view opens.

use super::{parse_state, serialize_state};
use opsboard_core::{Expense, ExpenseCategory, ExpenseState, RecordId, Timestamp};
use opsboard_sync::{EntityStore, Resource, SaveRequest, SyncResult};
use serde_json::Value;

pub type ExpenseStore = EntityStore<ExpenseResource>;

pub struct ExpenseResource;

impl Resource for ExpenseResource {
    type State = ExpenseState;

    fn cache_key(&self) -> &str {
        "expenses-data"
    }

    fn endpoint(&self) -> &str {
        "/api/expenses"
    }

    fn parse(&self, raw: &Value, _previous: &Self::State) -> SyncResult<Self::State> {
        parse_state(self.cache_key(), raw)
    }

    fn serialize(&self, state: &Self::State) -> SyncResult<Value> {
        serialize_state(self.cache_key(), state)
    }
}

pub async fn add_expense(
    store: &ExpenseStore,
    description: &str,
    amount_cents: i64,
    category: ExpenseCategory,
    incurred_on: Timestamp,
) -> SyncResult<RecordId> {
    let id = store.mutate(|state| state.add(description, amount_cents, category, incurred_on));
    store.save_to_server(SaveRequest::default()).await?;
    Ok(id)
}

pub async fn update_expense(
    store: &ExpenseStore,
    id: RecordId,
    apply: impl FnOnce(&mut Expense),
) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.update(id, apply));
    if changed {
        store.save_to_server(SaveRequest::default()).await?;
    }
    Ok(changed)
}

pub async fn delete_expense(store: &ExpenseStore, id: RecordId) -> SyncResult<bool> {
    let changed = store.mutate(|state| state.delete(id));
    if changed {
        store.save_to_server(SaveRequest::immediate()).await?;
    }
    Ok(changed)
}
