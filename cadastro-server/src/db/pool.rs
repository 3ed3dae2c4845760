//! Connection manager
//!
//! Owns the lazily built `PgPool`. Handlers hold the manager, never a bare
//! pool, so the first request after a failed build simply tries again.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::OnceCell;

use super::{migrations, DbError};
use crate::config::DatabaseConfig;
use crate::models::SchemaName;

/// Lazily initialized, bounded PostgreSQL pool.
pub struct ConnectionManager {
    config: DatabaseConfig,
    pool: OnceCell<PgPool>,
}

impl ConnectionManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    pub fn schema(&self) -> &SchemaName {
        &self.config.schema
    }

    /// The pool, built and probed on first use.
    ///
    /// A failed build is not cached; the next call starts over.
    pub async fn pool(&self) -> Result<&PgPool, DbError> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    /// True once a pool has been built and probed.
    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Check out a connection. It goes back to the pool on drop.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        Ok(self.pool().await?.acquire().await?)
    }

    /// Open a transaction on a fresh connection.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        Ok(self.pool().await?.begin().await?)
    }

    /// Close the pool if it was ever built.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("connection pool closed");
        }
    }

    async fn connect(&self) -> Result<PgPool, DbError> {
        let options = PgConnectOptions::from_str(&self.config.url)?
            .ssl_mode(self.config.ssl_mode.into());

        if self.config.ssl_mode.skips_certificate_validation() {
            tracing::warn!(
                ssl_mode = ?self.config.ssl_mode,
                "database TLS certificate is not validated"
            );
        }

        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(self.config.acquire_timeout)
            .connect_with(options)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to create connection pool"))?;

        tracing::info!(
            max_connections = self.config.max_connections,
            "connection pool created"
        );

        let now: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "database liveness probe failed"))?;
        tracing::info!(server_time = %now, "database liveness probe ok");

        if self.config.bootstrap_schema {
            migrations::run(&pool, &self.config.schema).await?;
        }

        Ok(pool)
    }
}
