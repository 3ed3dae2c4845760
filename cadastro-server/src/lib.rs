//! cadastro-server: CRUD API over personal data, contacts and salary records
//!
//! The relational store (PostgreSQL) holds the three tables of record.
//! Personal-data creations are additionally mirrored into a document store
//! (Firestore) inside the relational transaction; see [`dual_write`].

pub mod config;
pub mod db;
pub mod docstore;
pub mod dual_write;
pub mod http;
pub mod models;

pub use config::{DatabaseConfig, ServerConfig, SslMode, UpdatePolicy};
pub use db::ConnectionManager;
pub use docstore::DocumentStore;
pub use http::{build_router, run_server, AppState};
