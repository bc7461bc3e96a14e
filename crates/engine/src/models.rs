//! Invocation inputs: the items to process and the node parameters applied
//! to each of them.

use nodes::StatementKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One input item: named values available to placeholders.
pub type Item = Map<String, Value>;

/// The statement a node runs, as configured by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeParameters {
    /// Statement template with `$name` placeholders.
    #[serde(default)]
    pub query: String,
    /// Declared kind, matched case-insensitively.
    #[serde(default = "default_query_type")]
    pub query_type: String,
}

fn default_query_type() -> String {
    "SELECT".to_string()
}

impl NodeParameters {
    pub fn new(query: impl Into<String>, query_type: impl Into<String>) -> Self {
        Self { query: query.into(), query_type: query_type.into() }
    }

    pub fn kind(&self) -> StatementKind {
        StatementKind::parse(&self.query_type)
    }
}
