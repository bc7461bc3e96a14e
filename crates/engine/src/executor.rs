//! Statement execution engine.
//!
//! `StatementExecutor` runs one node invocation:
//! 1. Takes ownership of a configured client and guards its release.
//! 2. Iterates over the input items in order, one at a time.
//! 3. Binds the statement template against each item and dispatches it.
//! 4. Collects the records per item, or handles the failure according to
//!    the configured [`ProcessingPolicy`].
//! 5. Closes the client exactly once, whichever way the run ends.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use db::StatementClient;
use nodes::{dispatch, prepare, BindMode, NodeError, OutputRecord};

use crate::models::{Item, NodeParameters};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What happens when one item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPolicy {
    /// Abort the run and return the error with the failing item's index.
    #[default]
    FailFast,
    /// Record the error at the item's position and carry on.
    ContinueOnFailure,
}

/// Tuning knobs for the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub policy: ProcessingPolicy,
    /// Whether placeholder values are inlined or bound by the database.
    pub bind_mode: BindMode,
}

// ---------------------------------------------------------------------------
// Client release guard
// ---------------------------------------------------------------------------

/// Owns a client for the duration of a run and closes it on drop, so the
/// release also happens on early returns and while unwinding.
pub struct ClientGuard<C: StatementClient> {
    client: C,
}

impl<C: StatementClient> ClientGuard<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: StatementClient> Deref for ClientGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

impl<C: StatementClient> Drop for ClientGuard<C> {
    fn drop(&mut self) {
        self.client.close();
        debug!("database client released");
    }
}

// ---------------------------------------------------------------------------
// StatementExecutor
// ---------------------------------------------------------------------------

/// Stateless orchestrator for a single invocation.
///
/// The returned outer vector has one entry per input item, in input order;
/// every entry holds at least one record.
pub struct StatementExecutor {
    config: ExecutorConfig,
}

impl StatementExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Run `params` against every item.
    ///
    /// # Errors
    /// Under [`ProcessingPolicy::FailFast`], the first failing item's error
    /// as [`EngineError::ItemFailed`].
    pub async fn run<C>(
        &self,
        client: C,
        items: &[Item],
        params: &NodeParameters,
    ) -> Result<Vec<Vec<OutputRecord>>, EngineError>
    where
        C: StatementClient,
    {
        self.run_with(client, items, |_, _| params.clone()).await
    }

    /// Like [`run`](Self::run), but resolves the node parameters per item,
    /// for hosts whose parameters may depend on the item being processed.
    #[instrument(skip_all, fields(items = items.len(), policy = ?self.config.policy))]
    pub async fn run_with<C, F>(
        &self,
        client: C,
        items: &[Item],
        mut resolve: F,
    ) -> Result<Vec<Vec<OutputRecord>>, EngineError>
    where
        C: StatementClient,
        F: FnMut(usize, &Item) -> NodeParameters,
    {
        let client = ClientGuard::new(client);
        let mut output = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let params = resolve(index, item);

            match self.process_item(&*client, index, item, &params).await {
                Ok(records) => {
                    debug!("item {} produced {} record(s)", index, records.len());
                    output.push(records);
                }

                Err(err) => match self.config.policy {
                    ProcessingPolicy::ContinueOnFailure => {
                        warn!("item {} failed, continuing: {}", index, err);
                        output.push(vec![OutputRecord::error(index, err)]);
                    }
                    ProcessingPolicy::FailFast => {
                        error!("item {} failed, aborting run: {}", index, err);
                        return Err(EngineError::ItemFailed { index, source: err });
                    }
                },
            }
        }

        info!("processed {} item(s)", output.len());
        Ok(output)
    }

    async fn process_item<C>(
        &self,
        client: &C,
        index: usize,
        item: &Item,
        params: &NodeParameters,
    ) -> Result<Vec<OutputRecord>, NodeError>
    where
        C: StatementClient,
    {
        if params.query.trim().is_empty() {
            return Err(NodeError::EmptyStatement);
        }

        let statement = prepare(&params.query, item, self.config.bind_mode);
        dispatch(&statement, &params.query_type, client, index).await
    }
}

/// Flatten per-item records into the single output stream the host expects.
pub fn flatten(output: Vec<Vec<OutputRecord>>) -> Vec<OutputRecord> {
    output.into_iter().flatten().collect()
}
