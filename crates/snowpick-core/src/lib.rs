//! Snowpick Core
//!
//! Domain model for the Snowflake administrative surface: tabular results of
//! SHOW/DESCRIBE statements, the object-type taxonomy, privilege tables, and
//! connection configuration. No I/O happens here.

pub mod config;
pub mod object_type;
pub mod privilege;
pub mod table;

pub use config::{ConfigError, Credentials, SessionConfig};
pub use object_type::{AccountObjectType, IntegrationKind, ObjectTypeParseError, SchemaObjectType};
pub use privilege::{Privilege, PrivilegeError, PrivilegeTarget};
pub use table::{Table, TableError};
