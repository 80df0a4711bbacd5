//! Object-type taxonomy
//!
//! Snowflake's administrative surface splits into schema-level objects
//! (tables, views, pipes, policies, ...) and account-level objects
//! (warehouses, roles, users, ...). SQL wants the singular keyword in
//! DESCRIBE/GRANT/DROP and the plural in SHOW, and a few types answer SHOW
//! with a different column shape. The enums here carry all of that so the
//! rest of the crate never touches raw type strings.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Failure to recognize an object-type keyword
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown object type: {0}")]
pub struct ObjectTypeParseError(pub String);

/// Python-style `re.match`: the pattern must match at the start of the text
fn matches_at_start(pattern: &Regex, text: &str) -> bool {
    pattern.find(text).is_some_and(|m| m.start() == 0)
}

/// Schema-level object types
///
/// Some of these (alerts, most policies) require an Enterprise or Business
/// Critical edition; SHOW on them fails with a permission error on standard
/// accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaObjectType {
    Alert,
    ExternalFunction,
    ExternalTable,
    FileFormat,
    MaterializedView,
    MaskingPolicy,
    PasswordPolicy,
    Pipe,
    Procedure,
    RowAccessPolicy,
    Secret,
    SessionPolicy,
    Sequence,
    Stage,
    Stream,
    Table,
    Tag,
    Task,
    UserFunction,
    View,
}

impl SchemaObjectType {
    /// Every schema-level type, in SHOW cascade order
    pub const ALL: [SchemaObjectType; 20] = [
        Self::Alert,
        Self::ExternalFunction,
        Self::ExternalTable,
        Self::FileFormat,
        Self::MaterializedView,
        Self::MaskingPolicy,
        Self::PasswordPolicy,
        Self::Pipe,
        Self::Procedure,
        Self::RowAccessPolicy,
        Self::Secret,
        Self::SessionPolicy,
        Self::Sequence,
        Self::Stage,
        Self::Stream,
        Self::Table,
        Self::Tag,
        Self::Task,
        Self::UserFunction,
        Self::View,
    ];

    /// The singular SQL keyword, as used in DESCRIBE/GRANT/DROP
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Alert => "ALERT",
            Self::ExternalFunction => "EXTERNAL FUNCTION",
            Self::ExternalTable => "EXTERNAL TABLE",
            Self::FileFormat => "FILE FORMAT",
            Self::MaterializedView => "MATERIALIZED VIEW",
            Self::MaskingPolicy => "MASKING POLICY",
            Self::PasswordPolicy => "PASSWORD POLICY",
            Self::Pipe => "PIPE",
            Self::Procedure => "PROCEDURE",
            Self::RowAccessPolicy => "ROW ACCESS POLICY",
            Self::Secret => "SECRET",
            Self::SessionPolicy => "SESSION POLICY",
            Self::Sequence => "SEQUENCE",
            Self::Stage => "STAGE",
            Self::Stream => "STREAM",
            Self::Table => "TABLE",
            Self::Tag => "TAG",
            Self::Task => "TASK",
            Self::UserFunction => "USER FUNCTION",
            Self::View => "VIEW",
        }
    }

    /// The plural SQL keyword, as used in SHOW
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Alert => "ALERTS",
            Self::ExternalFunction => "EXTERNAL FUNCTIONS",
            Self::ExternalTable => "EXTERNAL TABLES",
            Self::FileFormat => "FILE FORMATS",
            Self::MaterializedView => "MATERIALIZED VIEWS",
            Self::MaskingPolicy => "MASKING POLICIES",
            Self::PasswordPolicy => "PASSWORD POLICIES",
            Self::Pipe => "PIPES",
            Self::Procedure => "PROCEDURES",
            Self::RowAccessPolicy => "ROW ACCESS POLICIES",
            Self::Secret => "SECRETS",
            Self::SessionPolicy => "SESSION POLICIES",
            Self::Sequence => "SEQUENCES",
            Self::Stage => "STAGES",
            Self::Stream => "STREAMS",
            Self::Table => "TABLES",
            Self::Tag => "TAGS",
            Self::Task => "TASKS",
            Self::UserFunction => "USER FUNCTIONS",
            Self::View => "VIEWS",
        }
    }

    /// The type keyword GET_DDL expects
    ///
    /// GET_DDL does not know "USER FUNCTION"; it wants plain FUNCTION.
    pub fn ddl_keyword(&self) -> &'static str {
        match self {
            Self::UserFunction => "FUNCTION",
            other => other.singular(),
        }
    }

    /// Types whose SHOW output uses catalog_name/arguments instead of
    /// database_name/name
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Self::ExternalFunction | Self::Procedure | Self::UserFunction
        )
    }

    /// Select types whose plural keyword matches the pattern (anchored at
    /// the start, against the uppercase keyword)
    pub fn matching(pattern: &Regex) -> Vec<SchemaObjectType> {
        Self::ALL
            .into_iter()
            .filter(|ty| matches_at_start(pattern, ty.plural()))
            .collect()
    }
}

impl fmt::Display for SchemaObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for SchemaObjectType {
    type Err = ObjectTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|ty| ty.singular() == normalized || ty.plural() == normalized)
            .ok_or_else(|| ObjectTypeParseError(s.to_string()))
    }
}

/// Account-level object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountObjectType {
    Warehouse,
    Role,
    User,
    Database,
    Schema,
    Integration,
    NetworkPolicy,
    ResourceMonitor,
    Share,
}

impl AccountObjectType {
    pub const ALL: [AccountObjectType; 9] = [
        Self::Warehouse,
        Self::Role,
        Self::User,
        Self::Database,
        Self::Schema,
        Self::Integration,
        Self::NetworkPolicy,
        Self::ResourceMonitor,
        Self::Share,
    ];

    pub fn singular(&self) -> &'static str {
        match self {
            Self::Warehouse => "WAREHOUSE",
            Self::Role => "ROLE",
            Self::User => "USER",
            Self::Database => "DATABASE",
            Self::Schema => "SCHEMA",
            Self::Integration => "INTEGRATION",
            Self::NetworkPolicy => "NETWORK POLICY",
            Self::ResourceMonitor => "RESOURCE MONITOR",
            Self::Share => "SHARE",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Self::Warehouse => "WAREHOUSES",
            Self::Role => "ROLES",
            Self::User => "USERS",
            Self::Database => "DATABASES",
            Self::Schema => "SCHEMAS",
            Self::Integration => "INTEGRATIONS",
            Self::NetworkPolicy => "NETWORK POLICIES",
            Self::ResourceMonitor => "RESOURCE MONITORS",
            Self::Share => "SHARES",
        }
    }

    /// Types DESCRIBE accepts
    pub fn supports_describe(&self) -> bool {
        matches!(
            self,
            Self::Database
                | Self::Schema
                | Self::Integration
                | Self::NetworkPolicy
                | Self::Share
                | Self::User
                | Self::Warehouse
        )
    }

    /// Types GET_DDL accepts
    pub fn supports_ddl(&self) -> bool {
        matches!(self, Self::Database | Self::Schema)
    }

    /// Types UNDROP accepts
    pub fn supports_undrop(&self) -> bool {
        matches!(self, Self::Database | Self::Schema)
    }

    /// Select types whose plural keyword matches the pattern
    ///
    /// "NETWORK" on its own still selects NETWORK POLICIES, so a caller typing
    /// the family name gets the policies.
    pub fn matching(pattern: &Regex) -> Vec<AccountObjectType> {
        Self::ALL
            .into_iter()
            .filter(|ty| {
                matches_at_start(pattern, ty.plural())
                    || (*ty == Self::NetworkPolicy
                        && pattern.as_str().to_uppercase().contains("NETWORK"))
            })
            .collect()
    }
}

impl fmt::Display for AccountObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for AccountObjectType {
    type Err = ObjectTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|ty| ty.singular() == normalized || ty.plural() == normalized)
            .ok_or_else(|| ObjectTypeParseError(s.to_string()))
    }
}

/// Integration kinds, each with its own SHOW statement
///
/// `SHOW INTEGRATIONS` alone misses kind-specific metadata; the account
/// filter issues one SHOW per kind and unions the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    Api,
    Security,
    Notification,
    Storage,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 4] = [
        Self::Api,
        Self::Security,
        Self::Notification,
        Self::Storage,
    ];

    /// The SHOW keyword for this kind
    pub fn show_keyword(&self) -> &'static str {
        match self {
            Self::Api => "API INTEGRATIONS",
            Self::Security => "SECURITY INTEGRATIONS",
            Self::Notification => "NOTIFICATION INTEGRATIONS",
            Self::Storage => "STORAGE INTEGRATIONS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn singular_plural_pairs() {
        assert_eq!(SchemaObjectType::MaskingPolicy.singular(), "MASKING POLICY");
        assert_eq!(SchemaObjectType::MaskingPolicy.plural(), "MASKING POLICIES");
        assert_eq!(AccountObjectType::NetworkPolicy.singular(), "NETWORK POLICY");
        assert_eq!(AccountObjectType::NetworkPolicy.plural(), "NETWORK POLICIES");
    }

    #[test]
    fn ddl_keyword_exception() {
        assert_eq!(SchemaObjectType::UserFunction.ddl_keyword(), "FUNCTION");
        assert_eq!(SchemaObjectType::Table.ddl_keyword(), "TABLE");
    }

    #[test]
    fn callable_types() {
        assert!(SchemaObjectType::Procedure.is_callable());
        assert!(SchemaObjectType::UserFunction.is_callable());
        assert!(SchemaObjectType::ExternalFunction.is_callable());
        assert!(!SchemaObjectType::Table.is_callable());
    }

    #[test]
    fn matching_selects_by_prefix() {
        let pattern = Regex::new("TABLE").unwrap();
        let selected = SchemaObjectType::matching(&pattern);
        assert_eq!(
            selected,
            vec![SchemaObjectType::Table]
        );

        // ".*TABLES" matches EXTERNAL TABLES too.
        let pattern = Regex::new(".*TABLES").unwrap();
        let selected = SchemaObjectType::matching(&pattern);
        assert_eq!(
            selected,
            vec![SchemaObjectType::ExternalTable, SchemaObjectType::Table]
        );
    }

    #[test]
    fn matching_is_anchored_at_start() {
        // "VIEWS" must not select MATERIALIZED VIEWS: the match is anchored.
        let pattern = Regex::new("VIEWS").unwrap();
        assert_eq!(
            SchemaObjectType::matching(&pattern),
            vec![SchemaObjectType::View]
        );
    }

    #[test]
    fn match_all_selects_everything() {
        let pattern = Regex::new(".*").unwrap();
        assert_eq!(SchemaObjectType::matching(&pattern).len(), 20);
        assert_eq!(AccountObjectType::matching(&pattern).len(), 9);
    }

    #[test]
    fn network_shorthand_selects_policies() {
        let pattern = Regex::new("NETWORK").unwrap();
        assert_eq!(
            AccountObjectType::matching(&pattern),
            vec![AccountObjectType::NetworkPolicy]
        );
    }

    #[test]
    fn parse_accepts_either_form() {
        assert_eq!(
            "masking policies".parse::<SchemaObjectType>().unwrap(),
            SchemaObjectType::MaskingPolicy
        );
        assert_eq!(
            "Table".parse::<SchemaObjectType>().unwrap(),
            SchemaObjectType::Table
        );
        assert_eq!(
            "resource_monitor".parse::<AccountObjectType>().unwrap(),
            AccountObjectType::ResourceMonitor
        );
        assert!("gizmo".parse::<SchemaObjectType>().is_err());
    }
}
