//! Engine-level error types.

use nodes::NodeError;
use thiserror::Error;

/// Errors that abort a whole invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An item failed under the fail-fast policy; remaining items were
    /// not processed.
    #[error("item {index} failed: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: NodeError,
    },
}

impl EngineError {
    /// Position of the input item that caused the failure.
    pub fn index(&self) -> usize {
        match self {
            Self::ItemFailed { index, .. } => *index,
        }
    }
}
