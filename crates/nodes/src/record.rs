//! Output records — the uniform unit handed back to the host.

use db::{ExecutionResult, Row};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Value};

use crate::{NodeError, StatementKind};

pub const NO_ROWS_FOUND: &str = "No rows found";

/// What a dispatched statement produced, classified by declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// SELECT: the returned rows, possibly none.
    Rows(Vec<Row>),
    /// CREATE / INSERT / UPDATE / DELETE.
    Mutation {
        changes: u64,
        last_insert_rowid: Option<i64>,
        query: String,
        query_type: String,
    },
    /// Any other kind: the raw client result.
    Raw {
        result: ExecutionResult,
        query: String,
        query_type: String,
    },
}

impl Outcome {
    /// Classify `result` by the declared `query_type`, matched ignoring
    /// case. The declared text is kept as written for the output.
    pub fn classify(query_type: &str, query: &str, result: ExecutionResult) -> Self {
        match StatementKind::parse(query_type) {
            StatementKind::Select => Self::Rows(result.rows),
            kind if kind.is_mutation() => Self::Mutation {
                changes: result.changes.unwrap_or(0),
                last_insert_rowid: result.last_insert_rowid,
                query: query.to_string(),
                query_type: query_type.to_string(),
            },
            _ => Self::Raw {
                result,
                query: query.to_string(),
                query_type: query_type.to_string(),
            },
        }
    }

    /// Expand into records for input item `index`. Always yields at least
    /// one record.
    pub fn into_records(self, index: usize) -> Vec<OutputRecord> {
        match self {
            Self::Rows(rows) if rows.is_empty() => vec![OutputRecord::new(index, Payload::NoRows)],
            Self::Rows(rows) => rows
                .into_iter()
                .map(|row| OutputRecord::new(index, Payload::Row(row)))
                .collect(),
            Self::Mutation { changes, last_insert_rowid, query, query_type } => vec![OutputRecord::new(
                index,
                Payload::Mutation { changes, last_insert_rowid, query, query_type },
            )],
            Self::Raw { result, query, query_type } => {
                vec![OutputRecord::new(index, Payload::Raw { result, query, query_type })]
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Row(Row),
    NoRows,
    Mutation {
        changes: u64,
        last_insert_rowid: Option<i64>,
        query: String,
        query_type: String,
    },
    Raw {
        result: ExecutionResult,
        query: String,
        query_type: String,
    },
    /// A per-item failure captured under the continue-on-failure policy.
    Error(NodeError),
}

impl Payload {
    /// The JSON object the host sees for this record.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Row(row) => Value::Object(row.clone()),
            Self::NoRows => json!({ "result": NO_ROWS_FOUND }),
            Self::Mutation { changes, last_insert_rowid, query, query_type } => json!({
                "success": true,
                "changes": changes,
                "lastInsertRowid": last_insert_rowid,
                "query": query,
                "queryType": query_type,
            }),
            Self::Raw { result, query, query_type } => json!({
                "result": result,
                "query": query,
                "queryType": query_type,
            }),
            Self::Error(err) => json!({ "error": err.to_string() }),
        }
    }
}

/// One output record, paired with the input item that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub index: usize,
    pub payload: Payload,
}

impl OutputRecord {
    pub fn new(index: usize, payload: Payload) -> Self {
        Self { index, payload }
    }

    pub fn error(index: usize, err: NodeError) -> Self {
        Self::new(index, Payload::Error(err))
    }

    pub fn json(&self) -> Value {
        self.payload.to_json()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, Payload::Error(_))
    }
}

/// Serializes in the host's item shape:
/// `{ "json": {..}, "pairedItem": index, "error"?: {..} }`.
impl Serialize for OutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let error = match &self.payload {
            Payload::Error(err) => Some(err),
            _ => None,
        };
        let mut map = serializer.serialize_map(Some(if error.is_some() { 3 } else { 2 }))?;
        map.serialize_entry("json", &self.json())?;
        map.serialize_entry("pairedItem", &self.index)?;
        if let Some(err) = error {
            map.serialize_entry("error", err)?;
        }
        map.end()
    }
}
