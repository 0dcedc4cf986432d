//! Record structures for every dashboard domain.
//!
//! Field names serialize in camelCase because the wire format mirrors the
//! dashboard API's JSON payloads.

use crate::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A single todo entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: RecordId,
    pub text: String,
    #[serde(default)]
    pub notes: String,
    pub done: bool,
    /// Manual sort position within the list, 0-based.
    pub position: u32,
    pub updated_at: Timestamp,
}

/// Pipeline stage for a sales lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesStage {
    Prospect,
    Contacted,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

/// A lead moving through the sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLead {
    pub id: RecordId,
    pub company: String,
    pub contact: String,
    pub stage: SalesStage,
    #[serde(default)]
    pub notes: String,
    pub value_cents: i64,
    pub updated_at: Timestamp,
}

/// Recurrence descriptor carried on calendar events.
///
/// The dashboard stores this field but never expands it into generated
/// instances; see the design notes for the open question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringPattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: RecordId,
    pub title: String,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    #[serde(default)]
    pub notes: String,
    pub recurring_pattern: Option<RecurringPattern>,
    pub updated_at: Timestamp,
}

/// A pinned link on the dashboard home view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickLink {
    pub id: RecordId,
    pub label: String,
    pub url: String,
    pub position: u32,
    pub updated_at: Timestamp,
}

/// Spending category for an expense row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Software,
    Travel,
    Office,
    Marketing,
    Other,
}

/// A tracked expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: RecordId,
    pub description: String,
    pub amount_cents: i64,
    pub category: ExpenseCategory,
    pub incurred_on: Timestamp,
    pub updated_at: Timestamp,
}

/// A reusable email template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: RecordId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub updated_at: Timestamp,
}
