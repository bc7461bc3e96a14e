//! Statement dispatcher — runs one prepared statement and maps the result
//! into output records according to the declared kind.

use db::{Statement, StatementClient};
use tracing::debug;

use crate::record::{OutputRecord, Outcome};
use crate::NodeError;

/// Execute `statement` for input item `index` and map the result by the
/// declared `query_type`.
///
/// # Errors
/// - [`NodeError::EmptyStatement`] if the statement text is blank; the
///   client is not called.
/// - [`NodeError::ClientExecution`] if the client fails.
pub async fn dispatch<C>(
    statement: &Statement,
    query_type: &str,
    client: &C,
    index: usize,
) -> Result<Vec<OutputRecord>, NodeError>
where
    C: StatementClient + ?Sized,
{
    if statement.is_blank() {
        return Err(NodeError::EmptyStatement);
    }

    let result = client.execute(statement).await?;
    debug!(
        index,
        query_type,
        rows = result.rows.len(),
        changes = ?result.changes,
        "statement executed"
    );

    Ok(Outcome::classify(query_type, &statement.sql, result).into_records(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::mock::{self, MockClient, MockResponse};
    use serde_json::json;

    #[tokio::test]
    async fn blank_statement_never_reaches_client() {
        let client = MockClient::returning(mock::rows(vec![]));

        for sql in ["", "   ", "\n\t "] {
            let err = dispatch(&Statement::text(sql), "SELECT", &client, 0)
                .await
                .unwrap_err();
            assert_eq!(err, NodeError::EmptyStatement);
        }
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn select_without_rows_yields_placeholder() {
        let client = MockClient::returning(mock::rows(vec![]));
        let records = dispatch(&Statement::text("SELECT * FROM t"), "SELECT", &client, 0)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].json(), json!({ "result": "No rows found" }));
    }

    #[tokio::test]
    async fn select_emits_one_record_per_row() {
        let client = MockClient::returning(mock::rows(vec![
            json!({ "id": 1, "name": "a" }),
            json!({ "id": 2, "name": "b" }),
            json!({ "id": 3, "name": "c" }),
        ]));
        let records = dispatch(&Statement::text("SELECT * FROM t"), "select", &client, 2)
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.index == 2));
        assert_eq!(records[1].json(), json!({ "id": 2, "name": "b" }));
    }

    #[tokio::test]
    async fn insert_reports_changes_and_last_id() {
        let client = MockClient::returning(mock::mutation(1, Some(7)));
        let sql = "INSERT INTO t (name) VALUES ('x')";
        let records = dispatch(&Statement::text(sql), "INSERT", &client, 0)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let json = records[0].json();
        assert_eq!(json["success"], true);
        assert_eq!(json["changes"], 1);
        assert_eq!(json["lastInsertRowid"], 7);
        assert_eq!(json["query"], sql);
        assert_eq!(json["queryType"], "INSERT");
    }

    #[tokio::test]
    async fn query_type_is_echoed_as_declared() {
        let client = MockClient::scripted([
            MockResponse::Result(mock::mutation(2, Some(5))),
            MockResponse::Result(mock::rows(vec![json!({ "user_version": 1 })])),
        ]);

        let insert = dispatch(&Statement::text("INSERT INTO t VALUES (1), (2)"), "insert", &client, 0)
            .await
            .unwrap();
        assert_eq!(insert[0].json()["queryType"], "insert");
        assert_eq!(insert[0].json()["success"], true);

        let raw = dispatch(&Statement::text("PRAGMA user_version"), "Pragma", &client, 1)
            .await
            .unwrap();
        assert_eq!(raw[0].json()["queryType"], "Pragma");
    }

    #[tokio::test]
    async fn client_failure_becomes_node_error() {
        let client = MockClient::failing("SQLITE_ERROR: no such table: t");
        let err = dispatch(&Statement::text("SELECT * FROM t"), "SELECT", &client, 0)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            NodeError::ClientExecution {
                message: "SQLITE_ERROR: no such table: t".into(),
                context: None,
            }
        );
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn statement_is_sent_exactly_as_prepared() {
        let client = MockClient::returning(mock::mutation(0, None));
        let stmt = Statement {
            sql: "DELETE FROM t WHERE id = $id".into(),
            params: vec![("$id".into(), json!(4))],
        };
        dispatch(&stmt, "DELETE", &client, 0).await.unwrap();

        assert_eq!(client.calls.lock().unwrap()[0], stmt);
    }
}
