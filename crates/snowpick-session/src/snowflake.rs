//! Snowflake backend over the `snowflake-api` crate
//!
//! Compiled behind the `snowflake` cargo feature. Administrative statements
//! (SHOW, DESCRIBE) come back from the vendor as JSON rows; data statements
//! come back as Arrow record batches. Both are flattened into the
//! string-typed [`Table`] the rest of the workspace expects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let session = SnowflakeSession::with_password("xy12345.us-east-1", "ADMIN", "...")
//!     .with_warehouse("COMPUTE_WH")
//!     .with_role("SYSADMIN")
//!     .build()?;
//! ```

use snowpick_core::{Credentials, SessionConfig, Table};

use crate::session::{Session, SessionError};

#[cfg(feature = "snowflake")]
use snowflake_api::{QueryResult, SnowflakeApi};

/// Builder for [`SnowflakeSession`]
pub struct SnowflakeSessionBuilder {
    account: String,
    user: String,
    credentials: Credentials,
    warehouse: Option<String>,
    role: Option<String>,
    database: Option<String>,
    schema: Option<String>,
}

impl std::fmt::Debug for SnowflakeSessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `Credentials` intentionally has no `Debug` impl; redact it here
        f.debug_struct("SnowflakeSessionBuilder")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("credentials", &"<redacted>")
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .finish()
    }
}

impl SnowflakeSessionBuilder {
    fn new(account: impl Into<String>, user: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            account: account.into(),
            user: user.into(),
            credentials,
            warehouse: None,
            role: None,
            database: None,
            schema: None,
        }
    }

    /// Start a builder with password authentication
    pub fn with_password(
        account: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(account, user, Credentials::Password(password.into()))
    }

    /// Start a builder with key-pair authentication (PEM private key)
    pub fn with_key_pair(
        account: impl Into<String>,
        user: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Self {
        Self::new(account, user, Credentials::PrivateKeyPem(private_key_pem.into()))
    }

    /// Start a builder from a connection profile
    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        let credentials = config
            .credentials()
            .map_err(|e| SessionError::Config(e.to_string()))?;
        let mut builder = Self::new(&config.account, &config.user, credentials);
        builder.warehouse = config.warehouse.clone();
        builder.role = config.role.clone();
        builder.database = config.database.clone();
        builder.schema = config.schema.clone();
        Ok(builder)
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Authenticate and build the session
    #[cfg(feature = "snowflake")]
    pub fn build(self) -> Result<SnowflakeSession, SessionError> {
        let api = match &self.credentials {
            Credentials::Password(password) => SnowflakeApi::with_password_auth(
                &self.account,
                self.warehouse.as_deref(),
                self.database.as_deref(),
                self.schema.as_deref(),
                &self.user,
                self.role.as_deref(),
                password,
            )
            .map_err(|e| {
                SessionError::Authentication(format!("password auth failed: {e}"))
            })?,
            Credentials::PrivateKeyPem(pem) => SnowflakeApi::with_certificate_auth(
                &self.account,
                self.warehouse.as_deref(),
                self.database.as_deref(),
                self.schema.as_deref(),
                &self.user,
                self.role.as_deref(),
                pem,
            )
            .map_err(|e| {
                SessionError::Authentication(format!("key-pair auth failed: {e}"))
            })?,
        };

        Ok(SnowflakeSession { api })
    }

    /// Build without the `snowflake` feature compiled in
    #[cfg(not(feature = "snowflake"))]
    pub fn build(self) -> Result<SnowflakeSession, SessionError> {
        Err(SessionError::Config(
            "Snowflake support not compiled; rebuild with: cargo build --features snowflake"
                .to_string(),
        ))
    }
}

/// A live session against a Snowflake account
pub struct SnowflakeSession {
    #[cfg(feature = "snowflake")]
    api: SnowflakeApi,

    #[cfg(not(feature = "snowflake"))]
    _unconstructable: std::convert::Infallible,
}

impl SnowflakeSession {
    /// Builder entry point with password authentication
    pub fn with_password(
        account: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> SnowflakeSessionBuilder {
        SnowflakeSessionBuilder::with_password(account, user, password)
    }

    /// Builder entry point with key-pair authentication
    pub fn with_key_pair(
        account: impl Into<String>,
        user: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> SnowflakeSessionBuilder {
        SnowflakeSessionBuilder::with_key_pair(account, user, private_key_pem)
    }

    /// Builder entry point from a connection profile
    pub fn from_config(config: &SessionConfig) -> Result<SnowflakeSessionBuilder, SessionError> {
        SnowflakeSessionBuilder::from_config(config)
    }
}

/// Render one JSON cell as the optional string the [`Table`] model uses
fn json_cell(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(feature = "snowflake")]
fn arrow_batches_to_table(
    batches: Vec<arrow_array::RecordBatch>,
) -> Result<Table, SessionError> {
    use arrow_array::Array;

    let Some(first) = batches.first() else {
        return Ok(Table::empty());
    };

    let columns: Vec<String> = first
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let mut rows = Vec::new();
    for batch in &batches {
        for row_idx in 0..batch.num_rows() {
            let mut row = Vec::with_capacity(columns.len());
            for col in batch.columns() {
                if col.is_null(row_idx) {
                    row.push(None);
                } else {
                    let rendered = arrow_cast::display::array_value_to_string(col, row_idx)
                        .map_err(|e| {
                            SessionError::InvalidResponse(format!("arrow cell render: {e}"))
                        })?;
                    row.push(Some(rendered));
                }
            }
            rows.push(row);
        }
    }

    Table::new(columns, rows).map_err(|e| SessionError::InvalidResponse(e.to_string()))
}

#[cfg(feature = "snowflake")]
fn json_result_to_table(json: snowflake_api::JsonResult) -> Result<Table, SessionError> {
    let columns: Vec<String> = json.schema.iter().map(|f| f.name.clone()).collect();

    let rows_value = json
        .value
        .as_array()
        .ok_or_else(|| SessionError::InvalidResponse("JSON result is not an array".into()))?;

    let mut rows = Vec::with_capacity(rows_value.len());
    for row_value in rows_value {
        let cells = row_value
            .as_array()
            .ok_or_else(|| SessionError::InvalidResponse("JSON row is not an array".into()))?;
        rows.push(cells.iter().map(json_cell).collect());
    }

    Table::new(columns, rows).map_err(|e| SessionError::InvalidResponse(e.to_string()))
}

#[cfg(feature = "snowflake")]
#[async_trait::async_trait]
impl Session for SnowflakeSession {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    async fn query(&self, sql: &str) -> Result<Table, SessionError> {
        tracing::debug!(sql, "submitting statement");

        let result = self
            .api
            .exec(sql)
            .await
            .map_err(|e| SessionError::classify(e.to_string()))?;

        match result {
            QueryResult::Arrow(batches) => arrow_batches_to_table(batches),
            QueryResult::Json(json) => json_result_to_table(json),
            QueryResult::Empty => Ok(Table::empty()),
        }
    }
}

#[cfg(not(feature = "snowflake"))]
#[async_trait::async_trait]
impl Session for SnowflakeSession {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    async fn query(&self, _sql: &str) -> Result<Table, SessionError> {
        Err(SessionError::Config(
            "Snowflake support not compiled; rebuild with: cargo build --features snowflake"
                .to_string(),
        ))
    }
}
