//! Contact table, keyed by `login`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{key_text, RecordRepo, Table};
use crate::models::SchemaName;

pub const CONTACTS: Table = Table {
    name: "contato",
    key: "login",
    columns: &["email", "telefone", "redes_sociais"],
};

/// Create/update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInput {
    pub login: Option<Value>,
    pub email: Option<Value>,
    pub telefone: Option<Value>,
    pub redes_sociais: Option<Value>,
}

impl ContactInput {
    pub fn key(&self) -> String {
        key_text(self.login.as_ref())
    }
}

impl<'a> RecordRepo<'a> {
    pub fn contacts(schema: &'a SchemaName) -> Self {
        Self::new(schema, &CONTACTS)
    }
}
