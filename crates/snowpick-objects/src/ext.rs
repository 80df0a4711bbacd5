//! Session extension trait
//!
//! The convenience surface: constructors for objects and filters hang off
//! the session handle itself, so callers go from a connection to typed
//! handles without importing every constructor.
//!
//! ```rust,ignore
//! use snowpick_objects::SessionExt;
//!
//! let session: SessionRef = Arc::new(SnowflakeSession::from_config(&config)?.build()?);
//! let wh = session.warehouse("COMPUTE_WH");
//! let tables = session
//!     .schema_object_filter(&["ANALYTICS"], &[".*"], &[".*"], &["table"])
//!     .find()
//!     .await?;
//! ```

use snowpick_core::{AccountObjectType, SchemaObjectType};
use snowpick_session::SessionRef;

use crate::account_object::{
    AccountObject, Database, Integration, NetworkPolicy, ResourceMonitor, Role, Schema, Share,
    User, Warehouse,
};
use crate::filter::{AccountObjectFilter, SchemaObjectFilter};
use crate::schema_object::SchemaObject;

/// Object and filter constructors on the session handle
pub trait SessionExt {
    fn schema_object(
        &self,
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        object_type: SchemaObjectType,
    ) -> SchemaObject;

    /// A schema-object filter with the default ignore lists
    fn schema_object_filter(
        &self,
        databases: &[&str],
        schemas: &[&str],
        object_names: &[&str],
        object_types: &[&str],
    ) -> SchemaObjectFilter;

    fn account_object(
        &self,
        name: impl Into<String>,
        object_type: AccountObjectType,
    ) -> AccountObject;

    fn account_object_filter(
        &self,
        object_names: &[&str],
        object_types: &[&str],
    ) -> AccountObjectFilter;

    fn warehouse(&self, name: impl Into<String>) -> Warehouse;
    fn role(&self, name: impl Into<String>) -> Role;
    fn user(&self, name: impl Into<String>) -> User;
    fn database(&self, name: impl Into<String>) -> Database;
    fn schema(&self, name: impl Into<String>) -> Schema;
    fn integration(&self, name: impl Into<String>) -> Integration;
    fn network_policy(&self, name: impl Into<String>) -> NetworkPolicy;
    fn resource_monitor(&self, name: impl Into<String>) -> ResourceMonitor;
    fn share(&self, name: impl Into<String>) -> Share;
}

impl SessionExt for SessionRef {
    fn schema_object(
        &self,
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        object_type: SchemaObjectType,
    ) -> SchemaObject {
        SchemaObject::new(SessionRef::clone(self), database, schema, name, object_type)
    }

    fn schema_object_filter(
        &self,
        databases: &[&str],
        schemas: &[&str],
        object_names: &[&str],
        object_types: &[&str],
    ) -> SchemaObjectFilter {
        SchemaObjectFilter::new(
            SessionRef::clone(self),
            databases,
            schemas,
            object_names,
            object_types,
        )
    }

    fn account_object(
        &self,
        name: impl Into<String>,
        object_type: AccountObjectType,
    ) -> AccountObject {
        AccountObject::new(SessionRef::clone(self), name, object_type)
    }

    fn account_object_filter(
        &self,
        object_names: &[&str],
        object_types: &[&str],
    ) -> AccountObjectFilter {
        AccountObjectFilter::new(SessionRef::clone(self), object_names, object_types)
    }

    fn warehouse(&self, name: impl Into<String>) -> Warehouse {
        Warehouse::new(SessionRef::clone(self), name)
    }

    fn role(&self, name: impl Into<String>) -> Role {
        Role::new(SessionRef::clone(self), name)
    }

    fn user(&self, name: impl Into<String>) -> User {
        User::new(SessionRef::clone(self), name)
    }

    fn database(&self, name: impl Into<String>) -> Database {
        Database::new(SessionRef::clone(self), name)
    }

    fn schema(&self, name: impl Into<String>) -> Schema {
        Schema::new(SessionRef::clone(self), name)
    }

    fn integration(&self, name: impl Into<String>) -> Integration {
        Integration::new(SessionRef::clone(self), name)
    }

    fn network_policy(&self, name: impl Into<String>) -> NetworkPolicy {
        NetworkPolicy::new(SessionRef::clone(self), name)
    }

    fn resource_monitor(&self, name: impl Into<String>) -> ResourceMonitor {
        ResourceMonitor::new(SessionRef::clone(self), name)
    }

    fn share(&self, name: impl Into<String>) -> Share {
        Share::new(SessionRef::clone(self), name)
    }
}
