//! The session trait and its error taxonomy

use std::sync::Arc;

use snowpick_core::Table;

/// Shared handle to a session; administrative objects hold one of these
pub type SessionRef = Arc<dyn Session>;

/// Errors from submitting a statement
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Classify a vendor error by its message text
    ///
    /// The vendor SDK surfaces server errors as strings; the interesting
    /// distinctions (missing object, insufficient privileges) only appear in
    /// the message.
    pub fn classify(message: String) -> SessionError {
        if message.contains("does not exist") || message.contains("not found") {
            SessionError::ObjectNotFound(message)
        } else if message.contains("Insufficient privileges")
            || message.contains("not authorized")
            || message.contains("Unsupported feature")
        {
            SessionError::PermissionDenied(message)
        } else {
            SessionError::Query(message)
        }
    }

    /// True for errors the discovery filters tolerate
    ///
    /// SHOW on edition-gated object types fails with a privilege or
    /// unsupported-feature error on standard accounts; the filter cascade
    /// treats that as "no objects of this type".
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SessionError::PermissionDenied(_))
    }
}

/// A connection that can submit SQL text and return tabular output
#[async_trait::async_trait]
pub trait Session: Send + Sync {
    /// Backend name, e.g. "Snowflake"
    fn name(&self) -> &'static str;

    /// Submit one statement and collect its output
    async fn query(&self, sql: &str) -> Result<Table, SessionError>;

    /// Round-trip check that the connection works
    async fn test_connection(&self) -> Result<(), SessionError> {
        self.query("SELECT 1").await.map(|_| ())
    }
}
