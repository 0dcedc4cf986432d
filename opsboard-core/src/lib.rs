//! Opsboard Core - Domain Records
//!
//! Pure data structures for the dashboard domains (todos, sales pipeline,
//! calendar, quick links, expenses, email templates) plus the per-domain
//! collection state types with their synchronous mutators. No I/O and no
//! async code lives here; persistence is the sync layer's job.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod records;
pub mod state;

pub use records::{
    CalendarEvent, EmailTemplate, Expense, ExpenseCategory, QuickLink, RecurringPattern,
    SalesLead, SalesStage, TodoItem,
};
pub use state::{
    CalendarState, EmailTemplateState, ExpenseState, QuickLinkState, SalesState, TodoState,
};

/// Record identifier. Plain v4 UUIDs; creation order is not significant
/// because every domain carries an explicit `position` or timestamp.
pub type RecordId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new record identifier.
pub fn new_record_id() -> RecordId {
    Uuid::new_v4()
}
