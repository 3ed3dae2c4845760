//! PostgreSQL schema name
//!
//! Table names cannot be bound as parameters, so the schema is formatted into
//! query text. Construction is the only gate.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// PostgreSQL truncates identifiers beyond this length.
const MAX_LEN: usize = 63;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// A bare SQL identifier naming the schema that holds the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "schema" });
        }
        if name.len() > MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "schema",
                max: MAX_LEN,
            });
        }
        if !IDENTIFIER.is_match(name) {
            return Err(ValidationError::InvalidFormat {
                field: "schema",
                reason: "must start with a letter or underscore and contain only letters, digits and underscores",
            });
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `schema.table`, ready to splice into a statement.
    pub fn table(&self, table: &str) -> String {
        format!("{}.{}", self.0, table)
    }
}

impl Default for SchemaName {
    fn default() -> Self {
        Self("schema1".to_string())
    }
}

impl FromStr for SchemaName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
