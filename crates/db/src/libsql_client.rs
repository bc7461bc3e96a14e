//! `LibsqlClient` — `StatementClient` backed by the `libsql` crate.
//!
//! Supports a remote database (`libsql://`, `https://`) addressed by
//! [`Credentials`], and a local in-memory database for tests.

use async_trait::async_trait;
use libsql::params::Params;
use libsql::{Connection, Database};
use serde_json::{Number, Value};
use tracing::{debug, info};

use crate::client::{ExecutionResult, Row, Statement, StatementClient};
use crate::{Credentials, DbError};

pub struct LibsqlClient {
    // `conn` is declared first so it is dropped before the database handle.
    conn: Option<Connection>,
    db: Option<Database>,
}

impl LibsqlClient {
    /// Open a connection to the remote database named by `credentials`.
    pub async fn connect(credentials: &Credentials) -> Result<Self, DbError> {
        credentials.validate()?;
        info!("Connecting to LibSQL database at {}", credentials.database_url);

        let db = libsql::Builder::new_remote(
            credentials.database_url.clone(),
            credentials.token.clone(),
        )
        .build()
        .await
        .map_err(|e| DbError::Connection(format!("failed to open LibSQL database: {e}")))?;

        Self::from_database(db)
    }

    /// Open a fresh in-memory database.
    pub async fn open_memory() -> Result<Self, DbError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DbError::Connection(format!("failed to create in-memory database: {e}")))?;

        Self::from_database(db)
    }

    fn from_database(db: Database) -> Result<Self, DbError> {
        let conn = db
            .connect()
            .map_err(|e| DbError::Connection(format!("failed to create connection: {e}")))?;
        Ok(Self { conn: Some(conn), db: Some(db) })
    }

    /// `false` once [`StatementClient::close`] has run.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

#[async_trait]
impl StatementClient for LibsqlClient {
    async fn execute(&self, statement: &Statement) -> Result<ExecutionResult, DbError> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| DbError::Connection("client is closed".into()))?;

        debug!(sql = %statement.sql, params = statement.params.len(), "executing statement");

        // SQLite keeps `changes()` and `last_insert_rowid()` from the last
        // mutation; only trust them if this statement moved the total.
        let total_before = conn.total_changes();
        let mut rows = conn.query(&statement.sql, to_params(&statement.params)).await?;

        let columns: Vec<String> = (0..rows.column_count())
            .map(|idx| rows.column_name(idx).unwrap_or_default().to_string())
            .collect();

        let mut collected = Vec::new();
        while let Some(row) = rows.next().await? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                let value = row.get_value(idx as i32)?;
                record.insert(name.clone(), to_json(value));
            }
            collected.push(record);
        }

        let mutated = conn.total_changes() != total_before;
        let changes = if mutated { conn.changes() } else { 0 };
        let last_insert_rowid = match conn.last_insert_rowid() {
            id if mutated && id != 0 => Some(id),
            _ => None,
        };

        Ok(ExecutionResult {
            columns,
            rows: collected,
            changes: Some(changes),
            last_insert_rowid,
        })
    }

    fn close(&mut self) {
        if self.conn.take().is_some() {
            debug!("LibSQL connection closed");
        }
        self.db.take();
    }
}

fn to_params(params: &[(String, Value)]) -> Params {
    if params.is_empty() {
        return Params::None;
    }
    Params::Named(
        params
            .iter()
            .map(|(name, value)| (name.clone(), to_sql_value(value)))
            .collect(),
    )
}

/// Convert a JSON argument to the value bound by the database.
///
/// Booleans become `0`/`1`; arrays and objects are bound as their JSON text.
pub(crate) fn to_sql_value(value: &Value) -> libsql::Value {
    match value {
        Value::Null => libsql::Value::Null,
        Value::Bool(b) => libsql::Value::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => libsql::Value::Integer(i),
            None => libsql::Value::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => libsql::Value::Text(s.clone()),
        other => libsql::Value::Text(other.to_string()),
    }
}

/// Convert a column value to JSON. Non-finite reals become `null`; blobs
/// become an array of byte values.
pub(crate) fn to_json(value: libsql::Value) -> Value {
    match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::from(i),
        libsql::Value::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        libsql::Value::Text(s) => Value::String(s),
        libsql::Value::Blob(bytes) => Value::Array(bytes.into_iter().map(Value::from).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_insert_select_against_memory_database() {
        let client = LibsqlClient::open_memory().await.unwrap();

        client
            .execute(&Statement::text(
                "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, score REAL)",
            ))
            .await
            .unwrap();

        let inserted = client
            .execute(&Statement::text(
                "INSERT INTO people (name, score) VALUES ('O''Brien', 1.5)",
            ))
            .await
            .unwrap();
        assert_eq!(inserted.changes, Some(1));
        assert_eq!(inserted.last_insert_rowid, Some(1));
        assert!(inserted.rows.is_empty());

        let selected = client
            .execute(&Statement::text("SELECT id, name, score FROM people"))
            .await
            .unwrap();
        assert_eq!(selected.columns, vec!["id", "name", "score"]);
        assert_eq!(selected.rows.len(), 1);
        assert_eq!(selected.rows[0]["id"], json!(1));
        assert_eq!(selected.rows[0]["name"], json!("O'Brien"));
        assert_eq!(selected.rows[0]["score"], json!(1.5));
    }

    #[tokio::test]
    async fn statements_after_a_mutation_report_their_own_counts() {
        let client = LibsqlClient::open_memory().await.unwrap();
        client
            .execute(&Statement::text("CREATE TABLE a (n INTEGER)"))
            .await
            .unwrap();

        let inserted = client
            .execute(&Statement::text("INSERT INTO a VALUES (1), (2), (3)"))
            .await
            .unwrap();
        assert_eq!(inserted.changes, Some(3));
        assert_eq!(inserted.last_insert_rowid, Some(3));

        let created = client
            .execute(&Statement::text("CREATE TABLE b (n INTEGER)"))
            .await
            .unwrap();
        assert_eq!(created.changes, Some(0));
        assert_eq!(created.last_insert_rowid, None);

        let selected = client
            .execute(&Statement::text("SELECT n FROM a"))
            .await
            .unwrap();
        assert_eq!(selected.changes, Some(0));
        assert_eq!(selected.rows.len(), 3);

        let updated = client
            .execute(&Statement::text("UPDATE a SET n = n + 1 WHERE n > 1"))
            .await
            .unwrap();
        assert_eq!(updated.changes, Some(2));
    }

    #[tokio::test]
    async fn named_arguments_are_bound_natively() {
        let client = LibsqlClient::open_memory().await.unwrap();
        client
            .execute(&Statement::text("CREATE TABLE kv (k TEXT, v INTEGER)"))
            .await
            .unwrap();

        let insert = Statement {
            sql: "INSERT INTO kv (k, v) VALUES ($k, $v)".into(),
            params: vec![("$k".into(), json!("it's")), ("$v".into(), json!(true))],
        };
        client.execute(&insert).await.unwrap();

        let rows = client
            .execute(&Statement::text("SELECT k, v FROM kv"))
            .await
            .unwrap()
            .rows;
        assert_eq!(rows[0]["k"], json!("it's"));
        assert_eq!(rows[0]["v"], json!(1));
    }

    #[tokio::test]
    async fn syntax_error_surfaces_as_execution_error() {
        let client = LibsqlClient::open_memory().await.unwrap();
        let err = client.execute(&Statement::text("SELEC nonsense")).await.unwrap_err();
        assert!(matches!(err, DbError::Execution { .. }));
    }

    #[tokio::test]
    async fn closed_client_refuses_statements() {
        let mut client = LibsqlClient::open_memory().await.unwrap();
        client.close();
        assert!(!client.is_open());
        // Closing twice is harmless.
        client.close();

        let err = client.execute(&Statement::text("SELECT 1")).await.unwrap_err();
        assert!(matches!(err, DbError::Connection(_)));
    }

    #[test]
    fn values_convert_both_ways() {
        assert!(matches!(to_sql_value(&json!(42)), libsql::Value::Integer(42)));
        assert!(matches!(to_sql_value(&json!(false)), libsql::Value::Integer(0)));
        assert!(matches!(to_sql_value(&json!(null)), libsql::Value::Null));
        assert!(matches!(to_sql_value(&json!(2.5)), libsql::Value::Real(f) if f == 2.5));
        assert!(matches!(
            to_sql_value(&json!([1, 2])),
            libsql::Value::Text(ref s) if s == "[1,2]"
        ));

        assert_eq!(to_json(libsql::Value::Real(f64::NAN)), Value::Null);
        assert_eq!(to_json(libsql::Value::Blob(vec![1, 255])), json!([1, 255]));
    }
}
