//! `MockClient` — a test double for `StatementClient`.
//!
//! Records every statement it receives and how often it was closed, and
//! answers with programmer-specified results. Handles are `Arc`s so tests
//! can keep observing after the client has been moved into an executor.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::{ExecutionResult, Statement, StatementClient};
use crate::DbError;

/// What the client answers for one `execute` call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Result(ExecutionResult),
    Fail(DbError),
}

/// A mock client that replays scripted responses in call order.
///
/// Once the script is exhausted every further call gets the fallback
/// response.
pub struct MockClient {
    script: Mutex<VecDeque<MockResponse>>,
    fallback: MockResponse,
    /// All statements seen by this client (in call order).
    pub calls: Arc<Mutex<Vec<Statement>>>,
    /// Number of `close` calls.
    pub closes: Arc<AtomicUsize>,
}

impl MockClient {
    /// A client that always succeeds with `result`.
    pub fn returning(result: ExecutionResult) -> Self {
        Self::with_fallback(MockResponse::Result(result))
    }

    /// A client that always fails with an execution error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_fallback(MockResponse::Fail(DbError::execution(message)))
    }

    /// A client that answers with `script` first, then with an empty result.
    pub fn scripted(script: impl IntoIterator<Item = MockResponse>) -> Self {
        let client = Self::returning(ExecutionResult::default());
        *client.script.lock().unwrap() = script.into_iter().collect();
        client
    }

    fn with_fallback(fallback: MockResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times `execute` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatementClient for MockClient {
    async fn execute(&self, statement: &Statement) -> Result<ExecutionResult, DbError> {
        self.calls.lock().unwrap().push(statement.clone());

        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match response {
            MockResponse::Result(result) => Ok(result),
            MockResponse::Fail(err) => Err(err),
        }
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Build an `ExecutionResult` holding the given rows.
pub fn rows(rows: Vec<serde_json::Value>) -> ExecutionResult {
    let rows: Vec<_> = rows
        .into_iter()
        .filter_map(|row| match row {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    let columns = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    ExecutionResult { columns, rows, changes: Some(0), last_insert_rowid: None }
}

/// Build an `ExecutionResult` for a mutation.
pub fn mutation(changes: u64, last_insert_rowid: Option<i64>) -> ExecutionResult {
    ExecutionResult { changes: Some(changes), last_insert_rowid, ..Default::default() }
}
