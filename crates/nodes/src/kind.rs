//! Declared statement kinds.

use std::fmt;

/// The kind a caller declares for a statement. Only result mapping depends
/// on it; substitution does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Create,
    Insert,
    Update,
    Delete,
    Select,
    /// Any other declared kind, kept as written.
    Other(String),
}

impl StatementKind {
    /// Parse a declared kind, ignoring case. Never fails: unknown kinds land
    /// in [`StatementKind::Other`].
    pub fn parse(declared: &str) -> Self {
        match declared.to_ascii_uppercase().as_str() {
            "CREATE" => Self::Create,
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "SELECT" => Self::Select,
            _ => Self::Other(declared.to_string()),
        }
    }

    /// Whether the kind reports a mutation summary.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Create | Self::Insert | Self::Update | Self::Delete)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "CREATE",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Select => "SELECT",
            Self::Other(declared) => declared,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
