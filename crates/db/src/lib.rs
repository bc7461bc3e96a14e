//! `db` crate — the database client boundary.
//!
//! Defines the [`StatementClient`] contract the executor talks to, the
//! `libsql`-backed implementation, connection credentials, and a mock
//! client for tests. No result mapping lives here.

pub mod client;
pub mod credentials;
pub mod error;
pub mod libsql_client;
pub mod mock;

pub use client::{ExecutionResult, Row, Statement, StatementClient};
pub use credentials::Credentials;
pub use error::DbError;
pub use libsql_client::LibsqlClient;
