//! Error type for object operations and filters

use snowpick_core::{PrivilegeError, TableError};
use snowpick_session::SessionError;

/// Errors from administrative object methods and discovery filters
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Privilege(#[from] PrivilegeError),

    #[error("cannot write DDL file: {0}")]
    Io(#[from] std::io::Error),

    #[error("{operation} is not supported for {object_type}; supported: {supported}")]
    Unsupported {
        operation: &'static str,
        object_type: &'static str,
        supported: String,
    },

    #[error("statement returned no rows: {0}")]
    EmptyResult(String),

    #[error("invalid filter pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}
