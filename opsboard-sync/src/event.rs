//! Out-of-band notifications from the sync layer to the embedding app.

use tokio::sync::mpsc;

/// Events the application may want to react to. `AuthExpired` is the hook
/// for forcing navigation to the login route after a 401; `SaveDropped`
/// lets a UI surface that a debounced write was lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    AuthExpired,
    SaveDropped { key: String },
}

/// Sender half handed to every store. Unbounded so emitting never blocks a
/// store operation; the consumer is a UI loop that drains promptly.
pub type SyncEventSender = mpsc::UnboundedSender<SyncEvent>;

/// Receiver half owned by the application event loop.
pub type SyncEventReceiver = mpsc::UnboundedReceiver<SyncEvent>;

/// Create the event channel shared by all stores.
pub fn event_channel() -> (SyncEventSender, SyncEventReceiver) {
    mpsc::unbounded_channel()
}
