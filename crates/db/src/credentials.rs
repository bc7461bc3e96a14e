//! Connection settings for a LibSQL database.

use serde::Deserialize;

use crate::DbError;

pub const DEFAULT_DATABASE_URL: &str = "libsql://";

/// Address and auth token of the target database.
///
/// Both values are opaque to the executor; they are handed to the client
/// as-is.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub token: String,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

impl Credentials {
    pub fn new(database_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self { database_url: database_url.into(), token: token.into() }
    }

    /// Reject URLs that cannot name a database (empty, or the bare scheme
    /// left over from the default).
    pub fn validate(&self) -> Result<(), DbError> {
        let url = self.database_url.trim();
        if url.is_empty() || url == DEFAULT_DATABASE_URL {
            return Err(DbError::InvalidCredentials(format!(
                "database URL '{}' does not name a database",
                self.database_url
            )));
        }
        Ok(())
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self { database_url: default_database_url(), token: String::new() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("database_url", &self.database_url)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}
