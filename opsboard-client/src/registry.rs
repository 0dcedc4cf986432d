//! Process-wide store registry.
//!
//! Each REST resource must have exactly one writer store, because every
//! save is a full-collection overwrite. The registry makes that invariant
//! structural: it is the only construction path the application uses, and
//! it builds each store exactly once. Store handles are cheap clones that
//! all share the underlying state.

use crate::stores::{
    CalendarResource, CalendarStore, EmailTemplateResource, EmailTemplateStore, ExpenseResource,
    ExpenseStore, QuickLinkResource, QuickLinkStore, SalesResource, SalesStore, TodoResource,
    TodoStore,
};
use opsboard_sync::{event_channel, EntityStore, LoadCoordinator, SyncEventReceiver, Transport};
use std::sync::Arc;

pub struct StoreRegistry {
    coordinator: LoadCoordinator,
    todos: TodoStore,
    sales: SalesStore,
    calendar: CalendarStore,
    quick_links: QuickLinkStore,
    expenses: ExpenseStore,
    email_templates: EmailTemplateStore,
}

impl StoreRegistry {
    /// Build every domain store against one coordinator and one transport.
    /// Returns the registry plus the receiver for sync events (auth expiry,
    /// dropped saves) that the application loop consumes.
    pub fn new(
        coordinator: LoadCoordinator,
        transport: Arc<dyn Transport>,
    ) -> (Arc<Self>, SyncEventReceiver) {
        let (events, receiver) = event_channel();
        let registry = Arc::new(Self {
            todos: EntityStore::new(
                TodoResource,
                coordinator.clone(),
                Arc::clone(&transport),
                events.clone(),
            ),
            sales: EntityStore::new(
                SalesResource,
                coordinator.clone(),
                Arc::clone(&transport),
                events.clone(),
            ),
            calendar: EntityStore::new(
                CalendarResource,
                coordinator.clone(),
                Arc::clone(&transport),
                events.clone(),
            ),
            quick_links: EntityStore::new(
                QuickLinkResource,
                coordinator.clone(),
                Arc::clone(&transport),
                events.clone(),
            ),
            expenses: EntityStore::new(
                ExpenseResource,
                coordinator.clone(),
                Arc::clone(&transport),
                events.clone(),
            ),
            email_templates: EntityStore::new(
                EmailTemplateResource,
                coordinator.clone(),
                Arc::clone(&transport),
                events,
            ),
            coordinator,
        });
        (registry, receiver)
    }

    pub fn coordinator(&self) -> &LoadCoordinator {
        &self.coordinator
    }

    pub fn todos(&self) -> &TodoStore {
        &self.todos
    }

    pub fn sales(&self) -> &SalesStore {
        &self.sales
    }

    pub fn calendar(&self) -> &CalendarStore {
        &self.calendar
    }

    pub fn quick_links(&self) -> &QuickLinkStore {
        &self.quick_links
    }

    pub fn expenses(&self) -> &ExpenseStore {
        &self.expenses
    }

    pub fn email_templates(&self) -> &EmailTemplateStore {
        &self.email_templates
    }
}
