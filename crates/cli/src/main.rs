//! `libsql-node` CLI entry-point.
//!
//! Available sub-commands:
//! - `execute` — run a statement against a LibSQL database for every input item.
//! - `bind`    — print the substituted statement for every input item.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use db::{Credentials, LibsqlClient};
use engine::{flatten, ExecutorConfig, Item, NodeParameters, ProcessingPolicy, StatementExecutor};
use nodes::BindMode;

#[derive(Parser)]
#[command(
    name = "libsql-node",
    about = "Run parameterized statements against a LibSQL database",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct StatementArgs {
    /// Statement template; `$name` placeholders are filled from each item.
    #[arg(long)]
    query: String,
    /// JSON file holding an array of input items (objects).
    /// Without it a single empty item is processed.
    #[arg(long)]
    items: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Execute the statement once per input item and print the output records.
    Execute {
        #[command(flatten)]
        statement: StatementArgs,
        /// Declared statement kind (CREATE, INSERT, UPDATE, DELETE, SELECT or other).
        #[arg(long, default_value = "SELECT")]
        query_type: String,
        #[arg(long, env = "LIBSQL_URL")]
        url: String,
        #[arg(long, env = "LIBSQL_AUTH_TOKEN", default_value = "", hide_env_values = true)]
        token: String,
        /// Record failed items in the output instead of aborting.
        #[arg(long)]
        continue_on_fail: bool,
        /// Let the database bind placeholder values instead of inlining them.
        #[arg(long)]
        native_params: bool,
    },
    /// Print the substituted statement for every input item without connecting.
    Bind {
        #[command(flatten)]
        statement: StatementArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Execute {
            statement,
            query_type,
            url,
            token,
            continue_on_fail,
            native_params,
        } => {
            let items = load_items(statement.items.as_deref())?;
            let params = NodeParameters::new(statement.query, query_type);
            let config = ExecutorConfig {
                policy: if continue_on_fail {
                    ProcessingPolicy::ContinueOnFailure
                } else {
                    ProcessingPolicy::FailFast
                },
                bind_mode: if native_params { BindMode::Native } else { BindMode::Inline },
            };

            let client = LibsqlClient::connect(&Credentials::new(url, token)).await?;
            info!("Executing {} statement for {} item(s)", params.kind(), items.len());

            let output = StatementExecutor::new(config)
                .run(client, &items, &params)
                .await?;

            println!("{}", serde_json::to_string_pretty(&flatten(output))?);
        }
        Command::Bind { statement } => {
            let items = load_items(statement.items.as_deref())?;
            for item in &items {
                println!("{}", nodes::bind(&statement.query, item));
            }
        }
    }

    Ok(())
}

/// Read input items from `path`, or a single empty item when absent.
fn load_items(path: Option<&Path>) -> Result<Vec<Item>> {
    let Some(path) = path else {
        return Ok(vec![Item::new()]);
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read items file {}", path.display()))?;
    parse_items(&content).with_context(|| format!("invalid items file {}", path.display()))
}

fn parse_items(content: &str) -> Result<Vec<Item>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            serde_json::Value::Object(map) => Ok(map),
            other => bail!("item {index} is not an object: {other}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_must_be_an_array_of_objects() {
        let items = parse_items(r#"[{ "id": 1 }, { "name": "x" }]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);

        assert!(parse_items(r#"[{ "id": 1 }, 3]"#).is_err());
        assert!(parse_items(r#"{ "id": 1 }"#).is_err());
    }

    #[test]
    fn missing_items_file_means_one_empty_item() {
        let items = load_items(None).unwrap();
        assert_eq!(items, vec![Item::new()]);
    }

    #[test]
    fn cli_parses_execute_flags() {
        let cli = Cli::try_parse_from([
            "libsql-node",
            "execute",
            "--query",
            "SELECT * FROM t WHERE id = $id",
            "--query-type",
            "select",
            "--url",
            "libsql://db.example.io",
            "--continue-on-fail",
        ])
        .unwrap();

        match cli.command {
            Command::Execute { statement, query_type, continue_on_fail, native_params, .. } => {
                assert_eq!(statement.query, "SELECT * FROM t WHERE id = $id");
                assert_eq!(query_type, "select");
                assert!(continue_on_fail);
                assert!(!native_params);
            }
            Command::Bind { .. } => panic!("expected execute"),
        }
    }
}
