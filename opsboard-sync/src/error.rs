//! Error types for the synchronization layer.
//!
//! Everything here is `Clone` because load errors are fanned out to every
//! caller that joined an in-flight request.

use thiserror::Error;

/// Transport-level failures, classified by how the sync layer reacts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// HTTP 401. The session is gone; the caller is expected to force
    /// navigation to the login route. Never retried.
    #[error("unauthorized")]
    Unauthorized,

    /// The server refused a save with `{"blocked": true}` in the body.
    /// Treated as a silent no-op by the save path.
    #[error("save blocked by server")]
    Blocked,

    /// Any other non-2xx response.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection-level failure (DNS, timeout, refused, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the JSON we expected.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors surfaced by load and save operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The payload arrived but the domain parser rejected it.
    #[error("parse error for {key}: {reason}")]
    Parse { key: String, reason: String },
}

impl SyncError {
    /// True for 401s, which abort without retry and trigger a login redirect.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Unauthorized))
    }

    /// True for server-side save rejections that must stay silent.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Blocked))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
