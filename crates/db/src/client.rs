//! The `StatementClient` trait — the contract between the executor and a
//! database connection.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::DbError;

/// A single result row: column name → JSON value.
pub type Row = Map<String, Value>;

/// The statement actually sent to the database.
///
/// `params` is empty when placeholders were substituted into `sql`
/// textually; otherwise it holds named arguments (`"$name"`) for the
/// database to bind natively.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

impl Statement {
    /// A statement with no bound arguments.
    pub fn text(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: Vec::new() }
    }

    /// `true` when the SQL text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// Everything the database reported for one executed statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Column names, in select-list order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Number of rows changed by a mutation.
    pub changes: Option<u64>,
    pub last_insert_rowid: Option<i64>,
}

/// A configured database handle.
///
/// Implementations own their connection; `close` releases it and is called
/// exactly once by the executor after the last statement.
#[async_trait]
pub trait StatementClient: Send + Sync {
    /// Execute one statement and collect its full result.
    async fn execute(&self, statement: &Statement) -> Result<ExecutionResult, DbError>;

    /// Release every resource held by the client.
    fn close(&mut self);
}

#[async_trait]
impl<C: StatementClient + ?Sized> StatementClient for Box<C> {
    async fn execute(&self, statement: &Statement) -> Result<ExecutionResult, DbError> {
        (**self).execute(statement).await
    }

    fn close(&mut self) {
        (**self).close()
    }
}
