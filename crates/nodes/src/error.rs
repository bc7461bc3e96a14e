//! Node-level error type.

use db::DbError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors produced while running one statement for one input item.
///
/// Neither variant is retried; the engine's processing policy decides
/// whether the run aborts or records the error and moves on.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeError {
    /// The statement was blank after substitution; nothing was sent.
    #[error("Query cannot be empty")]
    EmptyStatement,

    /// The database client rejected or failed the statement.
    #[error("{message}")]
    ClientExecution {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<Value>,
    },
}

impl From<DbError> for NodeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Execution { message, context } => Self::ClientExecution { message, context },
            other => Self::ClientExecution { message: other.to_string(), context: None },
        }
    }
}
