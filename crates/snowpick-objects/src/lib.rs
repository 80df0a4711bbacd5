//! Snowpick Objects
//!
//! The administrative objects themselves: [`SchemaObject`] for schema-level
//! objects (tables, views, pipes, ...), the [`AccountObject`] family
//! (warehouses, roles, users, ...), validated [`Grant`]s, and the discovery
//! filters that turn a cascade of SHOW statements into typed object lists.
//! Everything speaks through the [`snowpick_session::Session`] seam.

pub mod account_object;
pub mod error;
pub mod ext;
pub mod filter;
pub mod grant;
pub mod schema_object;

pub use account_object::{
    AccountObject, Database, HistoryInterval, Integration, NetworkPolicy, ResourceMonitor, Role,
    Schema, Share, User, Warehouse, WarehouseSize, WarehouseSizeError,
};
pub use error::ObjectError;
pub use ext::SessionExt;
pub use filter::{AccountObjectFilter, SchemaObjectFilter};
pub use grant::Grant;
pub use schema_object::{CreateMethod, SchemaObject};
