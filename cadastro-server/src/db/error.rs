//! Data-layer error type

use crate::docstore::MirrorError;

/// Anything that can fail between a handler and the stores.
///
/// Display is the bare underlying message; handlers prefix it with the action
/// that failed and return it verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Mirror(#[from] MirrorError),
}
