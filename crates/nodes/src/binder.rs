//! Parameter binder — resolves `$name` placeholders against an input item.
//!
//! Two paths share one scan:
//! - [`bind`] inlines values as SQL literals (strings quoted, embedded `'`
//!   doubled). This only guards against statement corruption, not injection.
//! - [`bind_native`] leaves the text alone and returns the values as named
//!   arguments for the database to bind itself.
//!
//! A placeholder without a value is left exactly as written. Substituted
//! text is never scanned again.

use std::sync::OnceLock;

use db::Statement;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How placeholder values reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindMode {
    /// Substitute values into the statement text.
    #[default]
    Inline,
    /// Send values as named arguments.
    Native,
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$([A-Za-z0-9_]+)").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

/// Build the statement for `template` using the selected `mode`.
pub fn prepare(template: &str, values: &Map<String, Value>, mode: BindMode) -> Statement {
    match mode {
        BindMode::Inline => Statement::text(bind(template, values)),
        BindMode::Native => bind_native(template, values),
    }
}

/// Substitute every placeholder that has a value with its SQL literal.
pub fn bind(template: &str, values: &Map<String, Value>) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => literal(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Keep `template` as is and collect one named argument per distinct
/// placeholder that has a value, in order of first appearance.
pub fn bind_native(template: &str, values: &Map<String, Value>) -> Statement {
    let mut params: Vec<(String, Value)> = Vec::new();

    for caps in placeholder().captures_iter(template) {
        let token = &caps[0];
        if params.iter().any(|(name, _)| name == token) {
            continue;
        }
        if let Some(value) = values.get(&caps[1]) {
            params.push((token.to_string(), value.clone()));
        }
    }

    Statement { sql: template.to_string(), params }
}

/// Render a value as it appears in inline SQL.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => other.to_string(),
    }
}
