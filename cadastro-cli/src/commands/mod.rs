//! Command implementations for the cadastro CLI

pub mod db;
pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;
