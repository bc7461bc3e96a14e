//! `engine` crate — runs the statement node over a batch of input items.

pub mod error;
pub mod executor;
pub mod models;

pub use error::EngineError;
pub use executor::{flatten, ClientGuard, ExecutorConfig, ProcessingPolicy, StatementExecutor};
pub use models::{Item, NodeParameters};
