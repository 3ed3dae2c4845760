//! Database flags shared by `serve` and `migrate`

use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, ValueEnum};

use cadastro_server::models::SchemaName;
use cadastro_server::{DatabaseConfig, SslMode};

#[derive(Args, Debug)]
pub struct DbArgs {
    /// PostgreSQL connection string (falls back to DATABASE_URL)
    #[arg(long, env = "CONNECTION_STRING", hide_env_values = true)]
    pub database_url: Option<String>,

    /// TLS mode for the database connection
    #[arg(long, env = "DB_SSL_MODE", value_enum, default_value_t = SslModeArg::Require)]
    pub db_ssl_mode: SslModeArg,

    /// Upper bound on pooled connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 10)]
    pub acquire_timeout_secs: u64,

    /// Schema holding the dados_pessoais, contato and salario tables
    #[arg(long, env = "DB_SCHEMA", default_value = "schema1")]
    pub schema: SchemaName,

    /// Create the schema and tables when the pool is first built
    #[arg(
        long,
        env = "DB_BOOTSTRAP_SCHEMA",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub bootstrap_schema: bool,
}

/// TLS modes accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslModeArg {
    Disable,
    Prefer,
    /// Encrypted, certificate not validated
    Require,
    VerifyFull,
}

impl From<SslModeArg> for SslMode {
    fn from(mode: SslModeArg) -> Self {
        match mode {
            SslModeArg::Disable => SslMode::Disable,
            SslModeArg::Prefer => SslMode::Prefer,
            SslModeArg::Require => SslMode::Require,
            SslModeArg::VerifyFull => SslMode::VerifyFull,
        }
    }
}

impl DbArgs {
    pub fn into_config(self) -> Result<DatabaseConfig> {
        let url = self
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
            .context(
                "database URL not set. Set via --database-url, CONNECTION_STRING or DATABASE_URL",
            )?;

        let mut config = DatabaseConfig::new(url);
        config.ssl_mode = self.db_ssl_mode.into();
        config.max_connections = self.max_connections.max(1);
        config.acquire_timeout = Duration::from_secs(self.acquire_timeout_secs);
        config.schema = self.schema;
        config.bootstrap_schema = self.bootstrap_schema;
        Ok(config)
    }
}
