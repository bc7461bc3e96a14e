//! Typed error type for the db crate.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DbError {
    /// The database handle or connection could not be opened.
    #[error("connection error: {0}")]
    Connection(String),

    /// The statement was sent but the database rejected it (syntax,
    /// constraint violation, transport failure, ...).
    #[error("{message}")]
    Execution {
        message: String,
        /// Structured detail reported alongside the message, if any.
        context: Option<Value>,
    },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl DbError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution { message: message.into(), context: None }
    }
}

impl From<libsql::Error> for DbError {
    fn from(err: libsql::Error) -> Self {
        match err {
            libsql::Error::ConnectionFailed(msg) => Self::Connection(msg),
            libsql::Error::SqliteFailure(code, msg) => Self::Execution {
                message: msg,
                context: Some(serde_json::json!({ "code": code })),
            },
            other => Self::execution(other.to_string()),
        }
    }
}
