//! HTTP server command
//!
//! Resolves flags into [`DatabaseConfig`]/[`ServerConfig`], builds the
//! document-store mirror and runs the server until shutdown. The database is
//! not contacted until the first request that needs it.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};

use cadastro_server::config::DEFAULT_CORS_ORIGIN;
use cadastro_server::docstore::{FirestoreClient, MemoryDocumentStore, ServiceAccountKey};
use cadastro_server::{
    run_server, AppState, ConnectionManager, DocumentStore, ServerConfig, UpdatePolicy,
};

use super::db::DbArgs;

/// Project used against the emulator when none is given.
const DEFAULT_EMULATOR_PROJECT: &str = "demo-cadastro";

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Interface to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The single origin allowed by CORS
    #[arg(long, env = "CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    pub cors_origin: String,

    /// Directory served at `/`
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Answer 404 instead of an empty 200 when a PUT matches no row
    #[arg(
        long,
        env = "STRICT_UPDATES",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub strict_updates: bool,

    /// Where personal-data creations are mirrored
    #[arg(long, env = "MIRROR_BACKEND", value_enum, default_value_t = MirrorBackend::Firestore)]
    pub mirror: MirrorBackend,

    /// Service account key file for Firestore
    #[arg(
        long,
        env = "GOOGLE_APPLICATION_CREDENTIALS",
        default_value = "serviceAccountKey.json"
    )]
    pub credentials: PathBuf,

    /// Talk to a Firestore emulator at host:port instead of Google
    #[arg(long, env = "FIRESTORE_EMULATOR_HOST")]
    pub firestore_emulator_host: Option<String>,

    /// Firestore project (defaults to the key file's project)
    #[arg(long, env = "GCLOUD_PROJECT")]
    pub firestore_project: Option<String>,
}

/// Document store backends
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorBackend {
    /// Google Cloud Firestore (or its emulator)
    Firestore,
    /// In-process map, lost on exit
    Memory,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            cors_origin: self.cors_origin.clone(),
            static_dir: self.static_dir.clone(),
            update_policy: if self.strict_updates {
                UpdatePolicy::Strict
            } else {
                UpdatePolicy::Lenient
            },
        }
    }
}

async fn build_mirror(args: &ServeArgs) -> Result<Arc<dyn DocumentStore>> {
    match args.mirror {
        MirrorBackend::Memory => {
            tracing::warn!("mirror backend is in-memory; documents are lost on exit");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        MirrorBackend::Firestore => {
            let http = reqwest::Client::builder()
                .user_agent(concat!("cadastro/", env!("CARGO_PKG_VERSION")))
                .build()
                .context("failed to build HTTP client")?;

            if let Some(host) = &args.firestore_emulator_host {
                let project = args
                    .firestore_project
                    .clone()
                    .unwrap_or_else(|| DEFAULT_EMULATOR_PROJECT.to_string());
                tracing::info!(%host, %project, "using Firestore emulator");
                return Ok(Arc::new(FirestoreClient::emulator(host, project, http)));
            }

            let mut key = ServiceAccountKey::load(&args.credentials)
                .await
                .context("failed to load Firestore service account")?;
            if let Some(project) = &args.firestore_project {
                key.project_id = project.clone();
            }
            tracing::info!(project = %key.project_id, account = %key.client_email, "using Firestore");
            Ok(Arc::new(FirestoreClient::from_service_account(key, http)))
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.server_config();
    let mirror = build_mirror(&args).await?;
    let db = ConnectionManager::new(args.db.into_config()?);

    let state = Arc::new(AppState::new(db, mirror).with_update_policy(config.update_policy));

    // Blocks until shutdown
    run_server(state, config).await.context("server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServeArgs {
        let mut argv = vec!["serve", "--database-url", "postgres://localhost/cadastro"];
        argv.extend_from_slice(args);
        ServeArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn server_flags_map_onto_config() {
        let args = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--cors-origin",
            "https://app.example",
            "--static-dir",
            "site",
            "--strict-updates",
        ]);
        let config = args.server_config();

        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.cors_origin, "https://app.example");
        assert_eq!(config.static_dir, PathBuf::from("site"));
        assert_eq!(config.update_policy, UpdatePolicy::Strict);
    }

    #[tokio::test]
    async fn memory_mirror_needs_no_credentials() {
        let args = parse(&["--mirror", "memory", "--credentials", "/nonexistent.json"]);
        let mirror = build_mirror(&args).await.unwrap();
        assert_eq!(mirror.backend(), "memory");
    }

    #[tokio::test]
    async fn emulator_skips_key_file() {
        let args = parse(&[
            "--mirror",
            "firestore",
            "--credentials",
            "/nonexistent.json",
            "--firestore-emulator-host",
            "localhost:8080",
        ]);
        let mirror = build_mirror(&args).await.unwrap();
        assert_eq!(mirror.backend(), "firestore");
    }

    #[tokio::test]
    async fn missing_key_file_fails_startup() {
        let args = parse(&["--mirror", "firestore", "--credentials", "/nonexistent.json"]);
        if args.firestore_emulator_host.is_some() {
            // FIRESTORE_EMULATOR_HOST set in the environment
            return;
        }
        assert!(build_mirror(&args).await.is_err());
    }
}
