//! Privilege vocabulary and validation
//!
//! Snowflake rejects a GRANT with the wrong privilege for an object type
//! only after a round trip. The lookup tables here mirror the documented
//! privilege sets per object type so a bad privilege fails locally, with the
//! allowed set in the error message.

use crate::object_type::{AccountObjectType, SchemaObjectType};

/// Global (account-level) privileges
pub const GLOBAL_PRIVILEGES: &[&str] = &[
    "CREATE ACCOUNT",
    "CREATE DATA EXCHANGE LISTING",
    "CREATE DATABASE",
    "CREATE INTEGRATION",
    "CREATE NETWORK POLICY",
    "CREATE ROLE",
    "CREATE SHARE",
    "CREATE USER",
    "CREATE WAREHOUSE",
    "APPLY MASKING POLICY",
    "APPLY PASSWORD POLICY",
    "APPLY ROW ACCESS POLICY",
    "APPLY SESSION POLICY",
    "APPLY TAG",
    "ATTACH POLICY",
    "EXECUTE ALERT",
    "EXECUTE TASK",
    "IMPORT SHARE",
    "MANAGE GRANTS",
    "MONITOR EXECUTION",
    "MONITOR USAGE",
    "OVERRIDE SHARE RESTRICTIONS",
];

/// Privileges grantable on an account-level object type
pub fn account_object_privileges(object_type: AccountObjectType) -> &'static [&'static str] {
    match object_type {
        AccountObjectType::User => &["MONITOR", "OWNERSHIP"],
        AccountObjectType::Role => &["USAGE", "OWNERSHIP"],
        AccountObjectType::ResourceMonitor => &["MODIFY", "MONITOR", "OWNERSHIP"],
        AccountObjectType::Warehouse => {
            &["MODIFY", "MONITOR", "USAGE", "OPERATE", "OWNERSHIP"]
        }
        AccountObjectType::Database => &[
            "CREATE DATABASE ROLE",
            "CREATE SCHEMA",
            "IMPORTED PRIVILEGES",
            "MODIFY",
            "MONITOR",
            "USAGE",
            "OWNERSHIP",
        ],
        AccountObjectType::Integration => &["USAGE", "USE_ANY_ROLE", "OWNERSHIP"],
        AccountObjectType::NetworkPolicy => &["OWNERSHIP"],
        AccountObjectType::Share => &["IMPORTED PRIVILEGES", "OWNERSHIP"],
        AccountObjectType::Schema => &[
            "MODIFY",
            "MONITOR",
            "USAGE",
            "CREATE ALERT",
            "CREATE EXTERNAL TABLE",
            "CREATE FILE FORMAT",
            "CREATE FUNCTION",
            "CREATE MASKING POLICY",
            "CREATE MATERIALIZED VIEW",
            "CREATE PASSWORD POLICY",
            "CREATE PIPE",
            "CREATE PROCEDURE",
            "CREATE ROW ACCESS POLICY",
            "CREATE SECRET",
            "CREATE SESSION POLICY",
            "CREATE SEQUENCE",
            "CREATE STAGE",
            "CREATE STREAM",
            "CREATE TAG",
            "CREATE TABLE",
            "CREATE TASK",
            "CREATE VIEW",
            "ADD SEARCH OPTIMIZATION",
            "OWNERSHIP",
        ],
    }
}

/// Privileges grantable on a schema-level object type
///
/// Internal and external stages differ (READ/WRITE vs USAGE); a single Stage
/// type carries the union.
pub fn schema_object_privileges(object_type: SchemaObjectType) -> &'static [&'static str] {
    match object_type {
        SchemaObjectType::Alert => &["OPERATE", "OWNERSHIP"],
        SchemaObjectType::ExternalFunction => &["USAGE", "OWNERSHIP"],
        SchemaObjectType::ExternalTable => &["SELECT", "REFERENCES", "OWNERSHIP"],
        SchemaObjectType::FileFormat => &["USAGE", "OWNERSHIP"],
        SchemaObjectType::MaterializedView => &["SELECT", "REFERENCES", "OWNERSHIP"],
        SchemaObjectType::MaskingPolicy => &["APPLY", "OWNERSHIP"],
        SchemaObjectType::PasswordPolicy => &["APPLY", "OWNERSHIP"],
        SchemaObjectType::Pipe => &["MONITOR", "OPERATE", "OWNERSHIP"],
        SchemaObjectType::Procedure => &["USAGE", "OWNERSHIP"],
        SchemaObjectType::RowAccessPolicy => &["APPLY", "OWNERSHIP"],
        SchemaObjectType::Secret => &["USAGE", "OWNERSHIP"],
        SchemaObjectType::SessionPolicy => &["APPLY", "OWNERSHIP"],
        SchemaObjectType::Sequence => &["USAGE", "OWNERSHIP"],
        SchemaObjectType::Stage => &["READ", "WRITE", "USAGE", "OWNERSHIP"],
        SchemaObjectType::Stream => &["SELECT", "OWNERSHIP"],
        SchemaObjectType::Table => &[
            "SELECT",
            "INSERT",
            "UPDATE",
            "DELETE",
            "TRUNCATE",
            "REFERENCES",
            "OWNERSHIP",
        ],
        SchemaObjectType::Tag => &["APPLY", "OWNERSHIP"],
        SchemaObjectType::Task => &["MONITOR", "OPERATE", "OWNERSHIP"],
        SchemaObjectType::UserFunction => &["USAGE", "OWNERSHIP"],
        SchemaObjectType::View => &["SELECT", "REFERENCES", "OWNERSHIP"],
    }
}

/// What a privilege is granted on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeTarget {
    /// The account itself (global privileges)
    Account,

    /// An account-level object
    AccountObject {
        object_type: AccountObjectType,
        name: String,
    },

    /// A schema-level object, named by its qualified name
    SchemaObject {
        object_type: SchemaObjectType,
        qualified_name: String,
    },
}

impl PrivilegeTarget {
    /// The allowed privilege names for this target
    pub fn allowed_privileges(&self) -> &'static [&'static str] {
        match self {
            Self::Account => GLOBAL_PRIVILEGES,
            Self::AccountObject { object_type, .. } => account_object_privileges(*object_type),
            Self::SchemaObject { object_type, .. } => schema_object_privileges(*object_type),
        }
    }

    /// The `ON <target>` clause of a GRANT
    pub fn sql(&self) -> String {
        match self {
            Self::Account => "ACCOUNT".to_string(),
            Self::AccountObject { object_type, name } => {
                format!("{} \"{}\"", object_type.singular(), name)
            }
            Self::SchemaObject {
                object_type,
                qualified_name,
            } => format!("{} {}", object_type.singular(), qualified_name),
        }
    }
}

impl std::fmt::Display for PrivilegeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Privilege validation failure
#[derive(Debug, Clone, thiserror::Error)]
#[error("privilege {privilege} is not supported on {target}; allowed: {}", allowed.join(", "))]
pub struct PrivilegeError {
    pub privilege: String,
    pub target: String,
    pub allowed: Vec<String>,
}

/// A privilege validated against its target's lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privilege {
    target: PrivilegeTarget,
    name: &'static str,
}

impl Privilege {
    /// Validate `name` (case-insensitive) against the target's allowed set
    pub fn new(target: PrivilegeTarget, name: &str) -> Result<Self, PrivilegeError> {
        let wanted = name.trim().to_uppercase();
        let allowed = target.allowed_privileges();
        match allowed.iter().copied().find(|p| *p == wanted) {
            Some(found) => Ok(Self {
                target,
                name: found,
            }),
            None => Err(PrivilegeError {
                privilege: name.to_string(),
                target: target.sql(),
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn target(&self) -> &PrivilegeTarget {
        &self.target
    }
}
