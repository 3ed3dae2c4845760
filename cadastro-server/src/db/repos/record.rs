//! Shared statement shapes for the three record tables
//!
//! Payloads travel to PostgreSQL as one `jsonb` parameter and are expanded
//! with `jsonb_populate_record`, so the store coerces each value to whatever
//! type its column has. Rows come back through `row_to_json`, so a table with
//! extra or differently typed columns is returned as it stands.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgConnection;

use crate::db::DbError;
use crate::models::SchemaName;

/// Name, key and data columns of a record table.
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub key: &'static str,
    /// Non-key columns, all overwritten by an update
    pub columns: &'static [&'static str],
}

/// A stored row, exactly as the store rendered it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    /// Column value; `Null` when the row has no such column.
    pub fn get(&self, column: &str) -> &Value {
        self.0.get(column).unwrap_or(&Value::Null)
    }

    /// Column value as text, for keys and log fields.
    pub fn text(&self, column: &str) -> String {
        key_text(Some(self.get(column)))
    }
}

/// Render a JSON scalar the way it would appear in a path segment.
///
/// Strings are taken as-is, `null` and absent values become empty.
pub fn key_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Record repository over one table
pub struct RecordRepo<'a> {
    schema: &'a SchemaName,
    table: &'static Table,
}

impl<'a> RecordRepo<'a> {
    pub fn new(schema: &'a SchemaName, table: &'static Table) -> Self {
        Self { schema, table }
    }

    pub async fn insert<T: Serialize + Sync>(
        &self,
        conn: &mut PgConnection,
        input: &T,
    ) -> Result<Record, DbError> {
        let sql = insert_sql(self.schema, self.table);
        let Json(row): Json<Record> = sqlx::query_scalar(&sql)
            .bind(Json(input))
            .fetch_one(conn)
            .await?;
        Ok(row)
    }

    /// Overwrite every non-key column. `None` when the key matched nothing.
    pub async fn update<T: Serialize + Sync>(
        &self,
        conn: &mut PgConnection,
        input: &T,
    ) -> Result<Option<Record>, DbError> {
        let sql = update_sql(self.schema, self.table);
        let row: Option<Json<Record>> = sqlx::query_scalar(&sql)
            .bind(Json(input))
            .fetch_optional(conn)
            .await?;
        Ok(row.map(|Json(row)| row))
    }

    /// Delete by key. `None` when nothing was deleted.
    pub async fn delete(&self, conn: &mut PgConnection, key: &str) -> Result<Option<Record>, DbError> {
        let mut selector = Map::new();
        selector.insert(self.table.key.to_string(), Value::String(key.to_string()));

        let sql = delete_sql(self.schema, self.table);
        let row: Option<Json<Record>> = sqlx::query_scalar(&sql)
            .bind(Json(Value::Object(selector)))
            .fetch_optional(conn)
            .await?;
        Ok(row.map(|Json(row)| row))
    }

    /// Every row, in whatever order the store returns them.
    pub async fn list(&self, conn: &mut PgConnection) -> Result<Vec<Record>, DbError> {
        let sql = list_sql(self.schema, self.table);
        let rows: Vec<Json<Record>> = sqlx::query_scalar(&sql).fetch_all(conn).await?;
        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }
}

fn all_columns(table: &Table) -> Vec<&'static str> {
    std::iter::once(table.key)
        .chain(table.columns.iter().copied())
        .collect()
}

fn insert_sql(schema: &SchemaName, table: &Table) -> String {
    let qualified = schema.table(table.name);
    let columns = all_columns(table).join(", ");
    format!(
        "INSERT INTO {qualified} AS t ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{qualified}, $1) \
         RETURNING row_to_json(t.*)"
    )
}

fn update_sql(schema: &SchemaName, table: &Table) -> String {
    let qualified = schema.table(table.name);
    let assignments = table
        .columns
        .iter()
        .map(|c| format!("{c} = r.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {qualified} AS t SET {assignments} \
         FROM jsonb_populate_record(NULL::{qualified}, $1) AS r \
         WHERE t.{key} = r.{key} \
         RETURNING row_to_json(t.*)",
        key = table.key
    )
}

fn delete_sql(schema: &SchemaName, table: &Table) -> String {
    let qualified = schema.table(table.name);
    format!(
        "DELETE FROM {qualified} AS t \
         USING jsonb_populate_record(NULL::{qualified}, $1) AS r \
         WHERE t.{key} = r.{key} \
         RETURNING row_to_json(t.*)",
        key = table.key
    )
}

fn list_sql(schema: &SchemaName, table: &Table) -> String {
    format!("SELECT row_to_json(t.*) FROM {} AS t", schema.table(table.name))
}
