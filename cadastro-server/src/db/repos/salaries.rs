//! Salary transaction table, keyed by `login`
//!
//! One row per login; an update replaces `transacao` rather than appending.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{key_text, RecordRepo, Table};
use crate::models::SchemaName;

pub const SALARIES: Table = Table {
    name: "salario",
    key: "login",
    columns: &["transacao"],
};

/// Create/update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryInput {
    pub login: Option<Value>,
    pub transacao: Option<Value>,
}

impl SalaryInput {
    pub fn key(&self) -> String {
        key_text(self.login.as_ref())
    }
}

impl<'a> RecordRepo<'a> {
    pub fn salaries(schema: &'a SchemaName) -> Self {
        Self::new(schema, &SALARIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_transacao_is_kept_as_sent() {
        let input: SalaryInput = serde_json::from_str(r#"{"login":"alice","transacao":100}"#).unwrap();
        assert_eq!(input.key(), "alice");
        assert_eq!(input.transacao, Some(json!(100)));
    }
}
