//! Opsboard Client - dashboard API wiring.
//!
//! Connects the generic sync layer to the real dashboard backend: the
//! `reqwest` transport, one store definition per domain, the process-wide
//! store registry, and the dashboard aggregator.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod registry;
pub mod stores;

pub use api::RestClient;
pub use config::{AuthConfig, ClientConfig, ConfigError};
pub use dashboard::{DashboardAggregator, DASHBOARD_CACHE_KEY, DEFAULT_DASHBOARD_THROTTLE};
pub use error::ClientError;
pub use registry::StoreRegistry;
