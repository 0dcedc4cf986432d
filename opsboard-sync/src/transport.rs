//! Transport seam between the sync layer and the dashboard API.
//!
//! The sync layer never talks HTTP directly; it goes through this trait so
//! tests can substitute a scripted transport and the client crate can plug
//! in its `reqwest`-backed implementation.

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;

/// Async JSON transport for one REST backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the collection payload for an endpoint.
    async fn get_json(&self, endpoint: &str) -> Result<Value, TransportError>;

    /// Persist a full-collection overwrite body to an endpoint.
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, TransportError>;
}

impl TransportError {
    /// Classify a non-2xx response. 401 means the session is gone; a JSON
    /// body carrying `"blocked": true` is the server refusing to let a save
    /// wipe out non-empty data.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 {
            return Self::Unauthorized;
        }
        if let Ok(value) = serde_json::from_str::<Value>(&body) {
            if value.get("blocked").and_then(Value::as_bool) == Some(true) {
                return Self::Blocked;
            }
        }
        Self::Http { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_maps_to_unauthorized() {
        let err = TransportError::from_status(401, String::new());
        assert_eq!(err, TransportError::Unauthorized);
    }

    #[test]
    fn blocked_body_maps_to_blocked() {
        let err = TransportError::from_status(409, r#"{"blocked":true}"#.to_string());
        assert_eq!(err, TransportError::Blocked);
    }

    #[test]
    fn blocked_false_stays_http() {
        let err = TransportError::from_status(409, r#"{"blocked":false}"#.to_string());
        assert!(matches!(err, TransportError::Http { status: 409, .. }));
    }

    #[test]
    fn non_json_body_stays_http() {
        let err = TransportError::from_status(500, "oops".to_string());
        assert!(matches!(err, TransportError::Http { status: 500, .. }));
    }
}
