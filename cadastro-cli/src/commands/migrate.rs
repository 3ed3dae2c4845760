//! Schema bootstrap command

use anyhow::{Context, Result};
use clap::Parser;

use cadastro_server::ConnectionManager;

use super::db::DbArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

/// Create the schema and the three tables, then exit.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let mut config = args.db.into_config()?;
    config.bootstrap_schema = true;
    let schema = config.schema.clone();

    let db = ConnectionManager::new(config);
    db.pool()
        .await
        .with_context(|| format!("failed to bootstrap schema {schema}"))?;
    db.close().await;

    tracing::info!(%schema, "schema ready");
    Ok(())
}
