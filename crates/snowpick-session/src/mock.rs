//! Scripted session for testing
//!
//! [`MockSession`] maps SQL statements to canned tables or errors and
//! records everything executed, so tests can drive the object methods and
//! the filter cascade without a warehouse. Statements are matched after
//! whitespace/case normalization, because the formatting helpers indent
//! their SQL.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use snowpick_core::Table;

use crate::session::{Session, SessionError};

/// Collapse whitespace, strip the trailing semicolon, uppercase
fn normalize(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(';')
        .trim()
        .to_uppercase()
}

/// In-memory session returning scripted responses
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing a `SessionRef` to the code under test.
pub struct MockSession {
    responses: Arc<RwLock<HashMap<String, Result<Table, SessionError>>>>,
    executed: Arc<RwLock<Vec<String>>>,
    fail_connection: bool,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            executed: Arc::new(RwLock::new(Vec::new())),
            fail_connection: false,
        }
    }

    /// Script a table response for a statement
    pub async fn respond(&self, sql: &str, table: Table) {
        self.responses
            .write()
            .await
            .insert(normalize(sql), Ok(table));
    }

    /// Script an error for a statement
    pub async fn fail(&self, sql: &str, error: SessionError) {
        self.responses
            .write()
            .await
            .insert(normalize(sql), Err(error));
    }

    /// All statements executed so far, normalized
    pub async fn executed(&self) -> Vec<String> {
        self.executed.read().await.clone()
    }

    /// Number of statements executed so far
    pub async fn executed_count(&self) -> usize {
        self.executed.read().await.len()
    }

    /// Make `test_connection` fail
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockSession {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            executed: Arc::clone(&self.executed),
            fail_connection: self.fail_connection,
        }
    }
}

#[async_trait::async_trait]
impl Session for MockSession {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn query(&self, sql: &str) -> Result<Table, SessionError> {
        let key = normalize(sql);
        self.executed.write().await.push(key.clone());

        match self.responses.read().await.get(&key) {
            Some(response) => response.clone(),
            None => Err(SessionError::Query(format!(
                "no scripted response for: {key}"
            ))),
        }
    }

    async fn test_connection(&self) -> Result<(), SessionError> {
        if self.fail_connection {
            Err(SessionError::Network("scripted connection failure".into()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn scripted_response_is_returned() {
        let session = MockSession::new();
        let table = Table::builder(["name"]).row(["COMPUTE_WH"]).build().unwrap();
        session.respond("show warehouses in account", table.clone()).await;

        let result = session.query("SHOW  WAREHOUSES\n IN ACCOUNT;").await.unwrap();
        assert_eq!(result, table);
    }

    #[tokio::test]
    async fn unscripted_statement_errors() {
        let session = MockSession::new();
        let err = session.query("SHOW TABLES IN ACCOUNT").await.unwrap_err();
        assert!(matches!(err, SessionError::Query(msg) if msg.contains("no scripted response")));
    }

    #[tokio::test]
    async fn scripted_error_is_returned() {
        let session = MockSession::new();
        session
            .fail(
                "show alerts in account",
                SessionError::PermissionDenied("needs Enterprise".into()),
            )
            .await;

        let err = session.query("SHOW ALERTS IN ACCOUNT").await.unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[tokio::test]
    async fn executed_statements_are_recorded() {
        let session = MockSession::new();
        session.respond("select 1", Table::empty()).await;

        let _ = session.query("SELECT 1").await;
        let _ = session.query("SHOW ROLES IN ACCOUNT").await;

        assert_eq!(
            session.executed().await,
            vec!["SELECT 1".to_string(), "SHOW ROLES IN ACCOUNT".to_string()]
        );
    }

    #[tokio::test]
    async fn clones_share_scripted_state() {
        let session = MockSession::new();
        let handle = session.clone();
        session.respond("select 1", Table::empty()).await;

        assert!(handle.query("SELECT 1").await.is_ok());
        assert_eq!(session.executed_count().await, 1);
    }

    #[tokio::test]
    async fn connection_failure_flag() {
        let session = MockSession::new().with_connection_failure();
        assert!(session.test_connection().await.is_err());
    }
}
