//! Per-domain collection state.
//!
//! Each state struct is the locally-mutable working copy of one server-side
//! collection. Mutators run synchronously, stamp `updated_at` on the touched
//! record, and return whether anything changed so callers can decide whether
//! a save is worth scheduling.

use crate::records::*;
use crate::{new_record_id, RecordId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Working copy of the todo collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoState {
    pub todos: Vec<TodoItem>,
}

impl TodoState {
    pub fn add(&mut self, text: impl Into<String>) -> RecordId {
        let id = new_record_id();
        let position = self.todos.len() as u32;
        self.todos.push(TodoItem {
            id,
            text: text.into(),
            notes: String::new(),
            done: false,
            position,
            updated_at: Utc::now(),
        });
        id
    }

    pub fn update_text(&mut self, id: RecordId, text: impl Into<String>) -> bool {
        self.touch(id, |todo| todo.text = text.into())
    }

    pub fn update_notes(&mut self, id: RecordId, notes: impl Into<String>) -> bool {
        self.touch(id, |todo| todo.notes = notes.into())
    }

    pub fn toggle_done(&mut self, id: RecordId) -> bool {
        self.touch(id, |todo| todo.done = !todo.done)
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.todos.len();
        self.todos.retain(|todo| todo.id != id);
        if self.todos.len() == before {
            return false;
        }
        self.renumber();
        true
    }

    /// Move a todo to a new position, shifting everything in between.
    pub fn reorder(&mut self, id: RecordId, to: usize) -> bool {
        let Some(from) = self.todos.iter().position(|todo| todo.id == id) else {
            return false;
        };
        let to = to.min(self.todos.len() - 1);
        if from == to {
            return false;
        }
        let todo = self.todos.remove(from);
        self.todos.insert(to, todo);
        self.renumber();
        true
    }

    fn touch(&mut self, id: RecordId, apply: impl FnOnce(&mut TodoItem)) -> bool {
        match self.todos.iter_mut().find(|todo| todo.id == id) {
            Some(todo) => {
                apply(todo);
                todo.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    fn renumber(&mut self) {
        let now = Utc::now();
        for (index, todo) in self.todos.iter_mut().enumerate() {
            if todo.position != index as u32 {
                todo.position = index as u32;
                todo.updated_at = now;
            }
        }
    }
}

/// Working copy of the sales pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesState {
    pub leads: Vec<SalesLead>,
}

impl SalesState {
    pub fn add_lead(
        &mut self,
        company: impl Into<String>,
        contact: impl Into<String>,
        value_cents: i64,
    ) -> RecordId {
        let id = new_record_id();
        self.leads.push(SalesLead {
            id,
            company: company.into(),
            contact: contact.into(),
            stage: SalesStage::Prospect,
            notes: String::new(),
            value_cents,
            updated_at: Utc::now(),
        });
        id
    }

    pub fn move_stage(&mut self, id: RecordId, stage: SalesStage) -> bool {
        self.touch(id, |lead| lead.stage = stage)
    }

    pub fn update_notes(&mut self, id: RecordId, notes: impl Into<String>) -> bool {
        self.touch(id, |lead| lead.notes = notes.into())
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.leads.len();
        self.leads.retain(|lead| lead.id != id);
        self.leads.len() != before
    }

    fn touch(&mut self, id: RecordId, apply: impl FnOnce(&mut SalesLead)) -> bool {
        match self.leads.iter_mut().find(|lead| lead.id == id) {
            Some(lead) => {
                apply(lead);
                lead.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

/// Working copy of the calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarState {
    pub events: Vec<CalendarEvent>,
}

impl CalendarState {
    pub fn add_event(&mut self, title: impl Into<String>, starts_at: Timestamp) -> RecordId {
        let id = new_record_id();
        self.events.push(CalendarEvent {
            id,
            title: title.into(),
            starts_at,
            ends_at: None,
            notes: String::new(),
            recurring_pattern: None,
            updated_at: Utc::now(),
        });
        id
    }

    pub fn update_event(
        &mut self,
        id: RecordId,
        apply: impl FnOnce(&mut CalendarEvent),
    ) -> bool {
        match self.events.iter_mut().find(|event| event.id == id) {
            Some(event) => {
                apply(event);
                event.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }
}

/// Working copy of the quick-link list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickLinkState {
    pub links: Vec<QuickLink>,
}

impl QuickLinkState {
    pub fn add(&mut self, label: impl Into<String>, url: impl Into<String>) -> RecordId {
        let id = new_record_id();
        let position = self.links.len() as u32;
        self.links.push(QuickLink {
            id,
            label: label.into(),
            url: url.into(),
            position,
            updated_at: Utc::now(),
        });
        id
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.links.len();
        self.links.retain(|link| link.id != id);
        if self.links.len() == before {
            return false;
        }
        self.renumber();
        true
    }

    pub fn reorder(&mut self, id: RecordId, to: usize) -> bool {
        let Some(from) = self.links.iter().position(|link| link.id == id) else {
            return false;
        };
        let to = to.min(self.links.len() - 1);
        if from == to {
            return false;
        }
        let link = self.links.remove(from);
        self.links.insert(to, link);
        self.renumber();
        true
    }

    fn renumber(&mut self) {
        let now = Utc::now();
        for (index, link) in self.links.iter_mut().enumerate() {
            if link.position != index as u32 {
                link.position = index as u32;
                link.updated_at = now;
            }
        }
    }
}

/// Working copy of the expense sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseState {
    pub expenses: Vec<Expense>,
}

impl ExpenseState {
    pub fn add(
        &mut self,
        description: impl Into<String>,
        amount_cents: i64,
        category: ExpenseCategory,
        incurred_on: Timestamp,
    ) -> RecordId {
        let id = new_record_id();
        self.expenses.push(Expense {
            id,
            description: description.into(),
            amount_cents,
            category,
            incurred_on,
            updated_at: Utc::now(),
        });
        id
    }

    pub fn update(&mut self, id: RecordId, apply: impl FnOnce(&mut Expense)) -> bool {
        match self.expenses.iter_mut().find(|expense| expense.id == id) {
            Some(expense) => {
                apply(expense);
                expense.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|expense| expense.id != id);
        self.expenses.len() != before
    }
}

/// Working copy of the email template library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplateState {
    pub templates: Vec<EmailTemplate>,
}

impl EmailTemplateState {
    pub fn add(&mut self, name: impl Into<String>, subject: impl Into<String>) -> RecordId {
        let id = new_record_id();
        self.templates.push(EmailTemplate {
            id,
            name: name.into(),
            subject: subject.into(),
            body: String::new(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn update_body(&mut self, id: RecordId, body: impl Into<String>) -> bool {
        match self.templates.iter_mut().find(|template| template.id == id) {
            Some(template) => {
                template.body = body.into();
                template.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.templates.len();
        self.templates.retain(|template| template.id != id);
        self.templates.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_add_assigns_sequential_positions() {
        let mut state = TodoState::default();
        state.add("first");
        state.add("second");
        state.add("third");

        let positions: Vec<u32> = state.todos.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn todo_delete_renumbers_remaining() {
        let mut state = TodoState::default();
        let a = state.add("a");
        state.add("b");
        state.add("c");

        assert!(state.delete(a));
        let positions: Vec<u32> = state.todos.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(state.todos[0].text, "b");
    }

    #[test]
    fn todo_reorder_moves_and_renumbers() {
        let mut state = TodoState::default();
        let a = state.add("a");
        state.add("b");
        state.add("c");

        assert!(state.reorder(a, 2));
        let texts: Vec<&str> = state.todos.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "a"]);
        assert_eq!(state.todos[2].position, 2);
    }

    #[test]
    fn todo_mutation_stamps_updated_at() {
        let mut state = TodoState::default();
        let id = state.add("task");
        let stamped = state.todos[0].updated_at;

        // A later mutation moves the stamp forward (or keeps it equal on
        // coarse clocks, never backwards).
        assert!(state.update_notes(id, "some notes"));
        assert!(state.todos[0].updated_at >= stamped);
        assert_eq!(state.todos[0].notes, "some notes");
    }

    #[test]
    fn mutators_report_missing_ids() {
        let mut todos = TodoState::default();
        let mut sales = SalesState::default();
        let ghost = new_record_id();

        assert!(!todos.toggle_done(ghost));
        assert!(!todos.delete(ghost));
        assert!(!sales.move_stage(ghost, SalesStage::Won));
    }

    #[test]
    fn sales_stage_moves() {
        let mut state = SalesState::default();
        let id = state.add_lead("Acme", "Jo", 120_000);
        assert_eq!(state.leads[0].stage, SalesStage::Prospect);

        assert!(state.move_stage(id, SalesStage::Proposal));
        assert_eq!(state.leads[0].stage, SalesStage::Proposal);
    }

    #[test]
    fn record_wire_format_is_camel_case() {
        let mut state = TodoState::default();
        state.add("task");
        let value = serde_json::to_value(&state.todos[0]).unwrap();
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("updated_at").is_none());
    }
}
