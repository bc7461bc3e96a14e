//! `nodes` crate — the LibSQL statement node's core.
//!
//! - [`binder`] resolves `$name` placeholders against an input item.
//! - [`dispatcher`] sends the statement to a [`db::StatementClient`] and maps
//!   the result by [`StatementKind`].
//! - [`record`] holds the uniform output records.

pub mod binder;
pub mod dispatcher;
pub mod error;
pub mod kind;
pub mod record;

pub use binder::{bind, bind_native, prepare, BindMode};
pub use dispatcher::dispatch;
pub use error::NodeError;
pub use kind::StatementKind;
pub use record::{OutputRecord, Outcome, Payload};
