//! Personal data table, keyed by `usuario`
//!
//! Creation normally goes through [`crate::dual_write::create_personal_data`],
//! which runs the insert inside a transaction and mirrors the stored row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::{key_text, Record, RecordRepo, Table};
use crate::models::SchemaName;

pub const PERSONAL_DATA: Table = Table {
    name: "dados_pessoais",
    key: "usuario",
    columns: &["nome", "sobrenome", "data_nascimento", "cpf"],
};

/// Create/update payload. Any JSON value is accepted; the store decides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalDataInput {
    pub usuario: Option<Value>,
    pub nome: Option<Value>,
    pub sobrenome: Option<Value>,
    pub data_nascimento: Option<Value>,
    pub cpf: Option<Value>,
}

impl PersonalDataInput {
    pub fn key(&self) -> String {
        key_text(self.usuario.as_ref())
    }
}

impl<'a> RecordRepo<'a> {
    pub fn personal_data(schema: &'a SchemaName) -> Self {
        Self::new(schema, &PERSONAL_DATA)
    }
}

/// Fields written to the document-store mirror for a stored row.
///
/// `nome` is stored there as `primeiro_nome`; the key is the document path.
pub fn mirror_fields(record: &Record) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("primeiro_nome".into(), record.get("nome").clone());
    for column in ["sobrenome", "data_nascimento", "cpf"] {
        fields.insert(column.into(), record.get(column).clone());
    }
    fields
}
