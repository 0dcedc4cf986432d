//! Per-domain store definitions.
//!
//! Each submodule binds one collection state from `opsboard-core` to its
//! REST resource (coordinator key, endpoint, wire codec) and offers the
//! domain operations the UI calls. Operations that a user expects to stick
//! immediately (deletes, drops after a drag) flush synchronously; edits
//! produced by continuous typing ride the debounce window.

use opsboard_sync::{SyncError, SyncResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub mod calendar;
pub mod email_templates;
pub mod expenses;
pub mod quick_links;
pub mod sales;
pub mod todos;

pub use calendar::{CalendarResource, CalendarStore};
pub use email_templates::{EmailTemplateResource, EmailTemplateStore};
pub use expenses::{ExpenseResource, ExpenseStore};
pub use quick_links::{QuickLinkResource, QuickLinkStore};
pub use sales::{SalesResource, SalesStore};
pub use todos::{TodoResource, TodoStore};

pub(crate) fn parse_state<S: DeserializeOwned>(key: &str, raw: &Value) -> SyncResult<S> {
    serde_json::from_value(raw.clone()).map_err(|err| SyncError::Parse {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) fn serialize_state<S: Serialize>(key: &str, state: &S) -> SyncResult<Value> {
    serde_json::to_value(state).map_err(|err| SyncError::Parse {
        key: key.to_string(),
        reason: format!("serialize: {err}"),
    })
}
