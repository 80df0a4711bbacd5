//! Account-level objects
//!
//! [`AccountObject`] carries the shared operations (DESCRIBE, GET_DDL,
//! SHOW GRANTS, CREATE/DROP/UNDROP, GRANT); the typed wrappers add what only
//! their type supports: warehouse sizing and usage history, role and user
//! grant listings. Operations a type does not support fail locally with the
//! supported set in the message, before any SQL is sent.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use snowpick_core::{AccountObjectType, Privilege, PrivilegeTarget, Table};
use snowpick_session::SessionRef;

use crate::error::ObjectError;

fn supported_list<I: IntoIterator<Item = AccountObjectType>>(types: I) -> String {
    types
        .into_iter()
        .map(|t| t.singular())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One account-level object in a Snowflake account
#[derive(Clone)]
pub struct AccountObject {
    session: SessionRef,
    pub name: String,
    pub object_type: AccountObjectType,
}

impl fmt::Debug for AccountObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountObject")
            .field("name", &self.name)
            .field("object_type", &self.object_type)
            .finish()
    }
}

impl PartialEq for AccountObject {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.object_type == other.object_type
    }
}

impl AccountObject {
    pub fn new(
        session: SessionRef,
        name: impl Into<String>,
        object_type: AccountObjectType,
    ) -> Self {
        Self {
            session,
            name: name.into(),
            object_type,
        }
    }

    pub(crate) fn session(&self) -> &SessionRef {
        &self.session
    }

    fn quoted(&self) -> String {
        format!("\"{}\"", self.name)
    }

    async fn status(&self, sql: String) -> Result<String, ObjectError> {
        let table = self.session.query(&sql).await?;
        table
            .first_value()
            .map(str::to_string)
            .ok_or(ObjectError::EmptyResult(sql))
    }

    /// `DESCRIBE <type> "<name>"`; not every type supports DESCRIBE
    pub async fn describe(&self) -> Result<Table, ObjectError> {
        if !self.object_type.supports_describe() {
            return Err(ObjectError::Unsupported {
                operation: "DESCRIBE",
                object_type: self.object_type.singular(),
                supported: supported_list(
                    AccountObjectType::ALL
                        .into_iter()
                        .filter(|t| t.supports_describe()),
                ),
            });
        }
        let sql = format!("DESCRIBE {} {}", self.object_type.singular(), self.quoted());
        Ok(self.session.query(&sql).await?)
    }

    /// Fetch the object's DDL via GET_DDL (databases and schemas only)
    pub async fn ddl(&self) -> Result<String, ObjectError> {
        if !self.object_type.supports_ddl() {
            return Err(ObjectError::Unsupported {
                operation: "GET_DDL",
                object_type: self.object_type.singular(),
                supported: supported_list(
                    AccountObjectType::ALL.into_iter().filter(|t| t.supports_ddl()),
                ),
            });
        }
        let sql = format!(
            "SELECT GET_DDL('{}', '{}')",
            self.object_type.singular(),
            self.name
        );
        self.status(sql).await
    }

    /// `SHOW GRANTS ON <type> "<name>"`
    pub async fn grants_on(&self) -> Result<Table, ObjectError> {
        let sql = format!(
            "SHOW GRANTS ON {} {}",
            self.object_type.singular(),
            self.quoted()
        );
        Ok(self.session.query(&sql).await?)
    }

    /// Grant privileges on this object to a role; returns the status string
    pub async fn grant(&self, privileges: &[&str], role: &str) -> Result<String, ObjectError> {
        let target = PrivilegeTarget::AccountObject {
            object_type: self.object_type,
            name: self.name.clone(),
        };
        let validated = privileges
            .iter()
            .map(|p| Privilege::new(target.clone(), p))
            .collect::<Result<Vec<_>, _>>()?;

        let names: Vec<&str> = validated.iter().map(|p| p.name()).collect();
        let sql = format!(
            "GRANT {} ON {} {} TO ROLE {}",
            names.join(", "),
            self.object_type.singular(),
            self.quoted(),
            role
        );
        self.status(sql).await
    }

    /// `DROP <type> IF EXISTS "<name>"`; returns the status string
    pub async fn drop(&self) -> Result<String, ObjectError> {
        let sql = format!(
            "DROP {} IF EXISTS {}",
            self.object_type.singular(),
            self.quoted()
        );
        self.status(sql).await
    }

    /// `UNDROP <type> "<name>"` (databases and schemas only)
    pub async fn undrop(&self) -> Result<String, ObjectError> {
        if !self.object_type.supports_undrop() {
            return Err(ObjectError::Unsupported {
                operation: "UNDROP",
                object_type: self.object_type.singular(),
                supported: supported_list(
                    AccountObjectType::ALL
                        .into_iter()
                        .filter(|t| t.supports_undrop()),
                ),
            });
        }
        let sql = format!("UNDROP {} {}", self.object_type.singular(), self.quoted());
        self.status(sql).await
    }

    /// `CREATE [OR REPLACE] <type> "<name>"`; returns the status string
    pub async fn create(&self, replace: bool) -> Result<String, ObjectError> {
        let sql = if replace {
            format!(
                "CREATE OR REPLACE {} {}",
                self.object_type.singular(),
                self.quoted()
            )
        } else {
            format!("CREATE {} {}", self.object_type.singular(), self.quoted())
        };
        self.status(sql).await
    }
}

macro_rules! account_object_wrapper {
    ($(#[$doc:meta])* $name:ident => $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            inner: AccountObject,
        }

        impl $name {
            pub fn new(session: SessionRef, name: impl Into<String>) -> Self {
                Self {
                    inner: AccountObject::new(session, name, AccountObjectType::$variant),
                }
            }
        }

        impl Deref for $name {
            type Target = AccountObject;

            fn deref(&self) -> &AccountObject {
                &self.inner
            }
        }

        impl From<$name> for AccountObject {
            fn from(wrapper: $name) -> AccountObject {
                wrapper.inner
            }
        }
    };
}

account_object_wrapper!(
    /// A virtual warehouse
    Warehouse => Warehouse
);
account_object_wrapper!(
    /// A role
    Role => Role
);
account_object_wrapper!(
    /// A user
    User => User
);
account_object_wrapper!(
    /// A database
    Database => Database
);
account_object_wrapper!(
    /// A schema (account-level view of it; see `SchemaObject` for objects
    /// inside one)
    Schema => Schema
);
account_object_wrapper!(
    /// An API/security/notification/storage integration
    Integration => Integration
);
account_object_wrapper!(
    /// A network policy
    NetworkPolicy => NetworkPolicy
);
account_object_wrapper!(
    /// A resource monitor
    ResourceMonitor => ResourceMonitor
);
account_object_wrapper!(
    /// A share
    Share => Share
);

/// Warehouse size parse failure
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown warehouse size: {0}; supported: XSMALL, SMALL, MEDIUM, LARGE, XLARGE, 2XLARGE, 3XLARGE, 4XLARGE, 5XLARGE, 6XLARGE")]
pub struct WarehouseSizeError(pub String);

/// Valid warehouse sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarehouseSize {
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
    X2Large,
    X3Large,
    X4Large,
    X5Large,
    X6Large,
}

impl WarehouseSize {
    /// The keyword `ALTER WAREHOUSE ... SET WAREHOUSE_SIZE` accepts
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::XSmall => "XSMALL",
            Self::Small => "SMALL",
            Self::Medium => "MEDIUM",
            Self::Large => "LARGE",
            Self::XLarge => "XLARGE",
            Self::X2Large => "X2LARGE",
            Self::X3Large => "X3LARGE",
            Self::X4Large => "X4LARGE",
            Self::X5Large => "X5LARGE",
            Self::X6Large => "X6LARGE",
        }
    }
}

impl fmt::Display for WarehouseSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for WarehouseSize {
    type Err = WarehouseSizeError;

    /// Accepts the vendor's alias spellings: "X-SMALL", "2X-LARGE",
    /// "XXLARGE", "X2LARGE", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "").to_uppercase().as_str() {
            "XSMALL" => Ok(Self::XSmall),
            "SMALL" => Ok(Self::Small),
            "MEDIUM" => Ok(Self::Medium),
            "LARGE" => Ok(Self::Large),
            "XLARGE" => Ok(Self::XLarge),
            "2XLARGE" | "X2LARGE" | "XXLARGE" => Ok(Self::X2Large),
            "3XLARGE" | "X3LARGE" | "XXXLARGE" => Ok(Self::X3Large),
            "4XLARGE" | "X4LARGE" => Ok(Self::X4Large),
            "5XLARGE" | "X5LARGE" => Ok(Self::X5Large),
            "6XLARGE" | "X6LARGE" => Ok(Self::X6Large),
            _ => Err(WarehouseSizeError(s.to_string())),
        }
    }
}

/// Unit of the relative date ranges in the history table functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryInterval {
    #[default]
    Hour,
    Day,
}

impl HistoryInterval {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl Warehouse {
    /// `ALTER WAREHOUSE IF EXISTS <name> SUSPEND`; returns the status string
    pub async fn suspend(&self) -> Result<String, ObjectError> {
        self.inner
            .status(format!("ALTER WAREHOUSE IF EXISTS {} SUSPEND", self.name))
            .await
    }

    /// `ALTER WAREHOUSE IF EXISTS <name> RESUME`; returns the status string
    pub async fn resume(&self) -> Result<String, ObjectError> {
        self.inner
            .status(format!("ALTER WAREHOUSE IF EXISTS {} RESUME", self.name))
            .await
    }

    /// Resize the warehouse; returns the status string
    pub async fn resize(&self, size: WarehouseSize) -> Result<String, ObjectError> {
        self.inner
            .status(format!(
                "ALTER WAREHOUSE IF EXISTS {} SET WAREHOUSE_SIZE = {}",
                self.name,
                size.keyword()
            ))
            .await
    }

    /// Set the idle seconds before automatic suspension
    ///
    /// Zero means the warehouse never suspends. The suspender runs about
    /// once a minute, so values under 60 are not exact.
    pub async fn set_auto_suspend(&self, seconds: u32) -> Result<String, ObjectError> {
        self.inner
            .status(format!(
                "ALTER WAREHOUSE IF EXISTS {} SET AUTO_SUSPEND = {}",
                self.name, seconds
            ))
            .await
    }

    fn history_sql(&self, function: &str, start: u32, end: u32, interval: HistoryInterval) -> String {
        format!(
            "SELECT * FROM TABLE(INFORMATION_SCHEMA.{}(\
             DATE_RANGE_START => DATEADD('{interval}', -{start}, CURRENT_DATE()), \
             DATE_RANGE_END => DATEADD('{interval}', -{end}, CURRENT_DATE()), \
             WAREHOUSE_NAME => '{name}'))",
            function,
            interval = interval.keyword(),
            name = self.name,
        )
    }

    /// Warehouse activity over a relative range (last 14 days at most)
    ///
    /// Needs MONITOR on the warehouse or MONITOR USAGE on the account.
    /// `start`/`end` count intervals back from now; the result carries
    /// START_TIME, END_TIME, WAREHOUSE_NAME, AVG_RUNNING, AVG_QUEUED_LOAD,
    /// AVG_QUEUED_PROVISIONING, AVG_BLOCKED.
    pub async fn load_history(
        &self,
        start: u32,
        end: u32,
        interval: HistoryInterval,
    ) -> Result<Table, ObjectError> {
        let sql = self.history_sql("WAREHOUSE_LOAD_HISTORY", start, end, interval);
        Ok(self.session().query(&sql).await?)
    }

    /// Hourly credit usage over a relative range
    ///
    /// Needs MONITOR USAGE on the account. The result carries START_TIME,
    /// END_TIME, WAREHOUSE_NAME, CREDITS_USED, CREDITS_USED_COMPUTE,
    /// CREDITS_USED_CLOUD_SERVICES.
    pub async fn metering_history(
        &self,
        start: u32,
        end: u32,
        interval: HistoryInterval,
    ) -> Result<Table, ObjectError> {
        let sql = self.history_sql("WAREHOUSE_METERING_HISTORY", start, end, interval);
        Ok(self.session().query(&sql).await?)
    }
}

impl Role {
    /// `SHOW GRANTS TO ROLE <name>`
    pub async fn grants_to(&self) -> Result<Table, ObjectError> {
        let sql = format!("SHOW GRANTS TO ROLE {}", self.name);
        Ok(self.session().query(&sql).await?)
    }

    /// `SHOW GRANTS OF ROLE <name>`: who has been granted this role
    pub async fn grants_of(&self) -> Result<Table, ObjectError> {
        let sql = format!("SHOW GRANTS OF ROLE {}", self.name);
        Ok(self.session().query(&sql).await?)
    }

    /// `SHOW FUTURE GRANTS TO ROLE <name>`
    pub async fn future_grants(&self) -> Result<Table, ObjectError> {
        let sql = format!("SHOW FUTURE GRANTS TO ROLE {}", self.name);
        Ok(self.session().query(&sql).await?)
    }
}

impl User {
    /// `SHOW GRANTS TO USER <name>`
    pub async fn grants_to(&self) -> Result<Table, ObjectError> {
        let sql = format!("SHOW GRANTS TO USER {}", self.name);
        Ok(self.session().query(&sql).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snowpick_session::MockSession;
    use std::sync::Arc;

    fn session_ref(session: &MockSession) -> SessionRef {
        Arc::new(session.clone())
    }

    fn status(value: &str) -> Table {
        Table::builder(["status"]).row([value]).build().unwrap()
    }

    #[test]
    fn wrapper_carries_type_tag() {
        let session = MockSession::new();
        let warehouse = Warehouse::new(session_ref(&session), "COMPUTE_WH");
        assert_eq!(warehouse.name, "COMPUTE_WH");
        assert_eq!(warehouse.object_type, AccountObjectType::Warehouse);

        let role = Role::new(session_ref(&session), "ANALYST");
        assert_eq!(role.object_type, AccountObjectType::Role);
    }

    #[tokio::test]
    async fn describe_checks_support() {
        let session = MockSession::new();
        let role = Role::new(session_ref(&session), "ANALYST");

        let err = role.describe().await.unwrap_err();
        assert!(matches!(err, ObjectError::Unsupported { operation: "DESCRIBE", .. }));
        assert_eq!(session.executed_count().await, 0);
    }

    #[tokio::test]
    async fn describe_supported_type() {
        let session = MockSession::new();
        session
            .respond(
                "DESCRIBE WAREHOUSE \"COMPUTE_WH\"",
                Table::builder(["key", "value"]).row(["size", "XSMALL"]).build().unwrap(),
            )
            .await;

        let warehouse = Warehouse::new(session_ref(&session), "COMPUTE_WH");
        assert_eq!(warehouse.describe().await.unwrap().num_rows(), 1);
    }

    #[tokio::test]
    async fn ddl_only_for_databases_and_schemas() {
        let session = MockSession::new();
        session
            .respond("SELECT GET_DDL('DATABASE', 'ANALYTICS')", status("create database ..."))
            .await;

        let database = Database::new(session_ref(&session), "ANALYTICS");
        assert_eq!(database.ddl().await.unwrap(), "create database ...");

        let warehouse = Warehouse::new(session_ref(&session), "COMPUTE_WH");
        assert!(matches!(
            warehouse.ddl().await,
            Err(ObjectError::Unsupported { operation: "GET_DDL", .. })
        ));
    }

    #[tokio::test]
    async fn drop_and_undrop() {
        let session = MockSession::new();
        session
            .respond("DROP DATABASE IF EXISTS \"ANALYTICS\"", status("ANALYTICS successfully dropped."))
            .await;
        session
            .respond("UNDROP DATABASE \"ANALYTICS\"", status("Database ANALYTICS successfully restored."))
            .await;

        let database = Database::new(session_ref(&session), "ANALYTICS");
        assert!(database.drop().await.unwrap().contains("dropped"));
        assert!(database.undrop().await.unwrap().contains("restored"));

        let user = User::new(session_ref(&session), "ALICE");
        assert!(matches!(
            user.undrop().await,
            Err(ObjectError::Unsupported { operation: "UNDROP", .. })
        ));
    }

    #[tokio::test]
    async fn create_or_replace() {
        let session = MockSession::new();
        session
            .respond("CREATE OR REPLACE ROLE \"ANALYST\"", status("Role ANALYST successfully created."))
            .await;

        let role = Role::new(session_ref(&session), "ANALYST");
        assert!(role.create(true).await.unwrap().contains("created"));
    }

    #[tokio::test]
    async fn grant_validates_per_type() {
        let session = MockSession::new();
        session
            .respond(
                "GRANT USAGE, OPERATE ON WAREHOUSE \"COMPUTE_WH\" TO ROLE ANALYST",
                status("Statement executed successfully."),
            )
            .await;

        let warehouse = Warehouse::new(session_ref(&session), "COMPUTE_WH");
        assert!(warehouse.grant(&["usage", "operate"], "ANALYST").await.is_ok());

        // SELECT is not a warehouse privilege.
        assert!(matches!(
            warehouse.grant(&["SELECT"], "ANALYST").await,
            Err(ObjectError::Privilege(_))
        ));
    }

    #[tokio::test]
    async fn warehouse_suspend_resume_resize() {
        let session = MockSession::new();
        session
            .respond("ALTER WAREHOUSE IF EXISTS COMPUTE_WH SUSPEND", status("Statement executed successfully."))
            .await;
        session
            .respond("ALTER WAREHOUSE IF EXISTS COMPUTE_WH RESUME", status("Statement executed successfully."))
            .await;
        session
            .respond(
                "ALTER WAREHOUSE IF EXISTS COMPUTE_WH SET WAREHOUSE_SIZE = SMALL",
                status("Statement executed successfully."),
            )
            .await;
        session
            .respond(
                "ALTER WAREHOUSE IF EXISTS COMPUTE_WH SET AUTO_SUSPEND = 60",
                status("Statement executed successfully."),
            )
            .await;

        let warehouse = Warehouse::new(session_ref(&session), "COMPUTE_WH");
        assert!(warehouse.suspend().await.is_ok());
        assert!(warehouse.resume().await.is_ok());
        assert!(warehouse.resize(WarehouseSize::Small).await.is_ok());
        assert!(warehouse.set_auto_suspend(60).await.is_ok());
    }

    #[tokio::test]
    async fn load_history_formats_table_function() {
        let session = MockSession::new();
        session
            .respond(
                "SELECT * FROM TABLE(INFORMATION_SCHEMA.WAREHOUSE_LOAD_HISTORY(\
                 DATE_RANGE_START => DATEADD('hour', -12, CURRENT_DATE()), \
                 DATE_RANGE_END => DATEADD('hour', -0, CURRENT_DATE()), \
                 WAREHOUSE_NAME => 'COMPUTE_WH'))",
                Table::builder(["WAREHOUSE_NAME", "AVG_RUNNING"]).row(["COMPUTE_WH", "0.5"]).build().unwrap(),
            )
            .await;

        let warehouse = Warehouse::new(session_ref(&session), "COMPUTE_WH");
        let history = warehouse
            .load_history(12, 0, HistoryInterval::Hour)
            .await
            .unwrap();
        assert_eq!(history.num_rows(), 1);
    }

    #[tokio::test]
    async fn role_grant_listings() {
        let session = MockSession::new();
        let grants = Table::builder(["privilege", "granted_on"]).row(["USAGE", "WAREHOUSE"]).build().unwrap();
        session.respond("SHOW GRANTS TO ROLE ANALYST", grants.clone()).await;
        session.respond("SHOW GRANTS OF ROLE ANALYST", grants.clone()).await;
        session.respond("SHOW FUTURE GRANTS TO ROLE ANALYST", grants.clone()).await;

        let role = Role::new(session_ref(&session), "ANALYST");
        assert_eq!(role.grants_to().await.unwrap(), grants);
        assert_eq!(role.grants_of().await.unwrap(), grants);
        assert_eq!(role.future_grants().await.unwrap(), grants);
    }

    #[test]
    fn warehouse_size_aliases() {
        assert_eq!("X-SMALL".parse::<WarehouseSize>().unwrap(), WarehouseSize::XSmall);
        assert_eq!("2X-LARGE".parse::<WarehouseSize>().unwrap(), WarehouseSize::X2Large);
        assert_eq!("XXLARGE".parse::<WarehouseSize>().unwrap(), WarehouseSize::X2Large);
        assert_eq!("x6large".parse::<WarehouseSize>().unwrap(), WarehouseSize::X6Large);
        assert!("HUGE".parse::<WarehouseSize>().is_err());
    }
}
