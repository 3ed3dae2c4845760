//! Database layer - connection manager, schema bootstrap and repositories
//!
//! - Pool is built lazily by an explicitly constructed [`ConnectionManager`]
//! - Key uniqueness is left to the store; no check-then-insert
//! - Repositories run single statements; the only multi-step write is the
//!   personal-data dual write in [`crate::dual_write`]

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use error::DbError;
pub use pool::ConnectionManager;
pub use repos::*;
