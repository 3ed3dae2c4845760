//! Schema bootstrap for the three record tables
//!
//! Every column except the key is nullable TEXT: payloads are stored as sent.
//! There are no foreign keys between the tables.

use sqlx::PgPool;

use super::DbError;
use crate::models::SchemaName;

/// Create the schema and tables if they are missing.
pub async fn run(pool: &PgPool, schema: &SchemaName) -> Result<(), DbError> {
    tracing::info!(schema = %schema, "bootstrapping schema");

    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            usuario TEXT PRIMARY KEY,
            nome TEXT,
            sobrenome TEXT,
            data_nascimento TEXT,
            cpf TEXT
        )
        "#,
        schema.table("dados_pessoais")
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            login TEXT PRIMARY KEY,
            email TEXT,
            telefone TEXT,
            redes_sociais TEXT
        )
        "#,
        schema.table("contato")
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            login TEXT PRIMARY KEY,
            transacao TEXT
        )
        "#,
        schema.table("salario")
    ))
    .execute(pool)
    .await?;

    tracing::info!(schema = %schema, "schema ready");
    Ok(())
}
