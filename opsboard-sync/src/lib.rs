//! Opsboard Sync - Client-State Synchronization Layer
//!
//! The coordination core of the dashboard client: request deduplication and
//! TTL caching ([`coordinator`]), per-domain entity stores with load/save
//! plumbing ([`store`]), trailing-debounce persistence ([`scheduler`]), and
//! the transport seam the client crate implements over HTTP ([`transport`]).
//!
//! # Design
//!
//! Everything here is explicitly constructed and injected - one
//! [`LoadCoordinator`] per application, one [`EntityStore`] per REST
//! resource - rather than living in globals. Execution is cooperative: the
//! only suspension points are awaited transport calls and debounce timers,
//! and internal maps are guarded by mutexes that are never held across an
//! await.

pub mod coordinator;
pub mod error;
pub mod event;
pub mod scheduler;
pub mod store;
pub mod transport;

pub use coordinator::{CoordinatorConfig, LoadCoordinator, LoadOptions, DEFAULT_CACHE_TTL};
pub use error::{SyncError, SyncResult, TransportError};
pub use event::{event_channel, SyncEvent, SyncEventReceiver, SyncEventSender};
pub use scheduler::{SaveScheduler, DEFAULT_DEBOUNCE_INTERVAL};
pub use store::{EntityStore, LoadRequest, Resource, SaveRequest};
pub use transport::Transport;
