//! Runtime configuration passed explicitly at startup
//!
//! Nothing here reads the environment; the CLI resolves flags, env vars and
//! `.env` files and hands the result over.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::PgSslMode;

use crate::models::SchemaName;

/// Default bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default time to wait for a pooled connection before failing the request.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Only origin allowed by CORS unless overridden.
pub const DEFAULT_CORS_ORIGIN: &str = "http://127.0.0.1:5500";

/// TLS mode for the relational connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    Disable,
    Prefer,
    /// Encrypt, but do not validate the server certificate.
    #[default]
    Require,
    VerifyFull,
}

impl SslMode {
    /// True when the server certificate is accepted without validation.
    pub fn skips_certificate_validation(self) -> bool {
        matches!(self, Self::Prefer | Self::Require)
    }
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
            SslMode::VerifyFull => PgSslMode::VerifyFull,
        }
    }
}

/// Relational store settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
    pub ssl_mode: SslMode,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Schema holding the three tables
    pub schema: SchemaName,
    /// Create the schema and tables when the pool is first built
    pub bootstrap_schema: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ssl_mode: SslMode::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            schema: SchemaName::default(),
            bootstrap_schema: false,
        }
    }
}

/// What a PUT answers when the key matched no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// 200 with an empty body (historical behaviour).
    #[default]
    Lenient,
    /// 404 like a missed delete.
    Strict,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// The single origin allowed by CORS
    pub cors_origin: String,
    /// Directory served for `/` and other static paths
    pub static_dir: PathBuf,
    pub update_policy: UpdatePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            static_dir: PathBuf::from("public"),
            update_policy: UpdatePolicy::default(),
        }
    }
}
