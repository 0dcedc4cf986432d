//! Error types for the client crate.

use crate::config::ConfigError;
use opsboard_sync::SyncError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
