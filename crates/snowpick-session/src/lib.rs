//! Session seam over the Snowflake SQL surface
//!
//! Everything downstream (objects, filters, CLI) talks to a [`Session`]: one
//! async method that takes SQL text and returns a [`snowpick_core::Table`].
//! The real backend wraps the `snowflake-api` crate behind the `snowflake`
//! cargo feature; [`MockSession`] scripts responses for tests.

pub mod mock;
pub mod session;
pub mod snowflake;

pub use mock::MockSession;
pub use session::{Session, SessionError, SessionRef};
pub use snowflake::{SnowflakeSession, SnowflakeSessionBuilder};
