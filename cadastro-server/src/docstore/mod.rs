//! Document store mirror
//!
//! Only full-document upserts are exposed. Nothing reads the mirror back, and
//! relational updates and deletes are never propagated to it.

pub mod credentials;
pub mod firestore;
pub mod memory;
pub mod path;
pub mod value;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub use credentials::{ServiceAccountKey, TokenSource};
pub use firestore::FirestoreClient;
pub use memory::MemoryDocumentStore;
pub use path::DocumentPath;

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    pub write_time: DateTime<Utc>,
}

/// Document store errors
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("invalid document path: {0}")]
    InvalidPath(String),

    #[error("failed to read credentials {}: {source}", path.display())]
    ReadCredentials {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    #[error("failed to sign service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("document store authentication failed: {0}")]
    Auth(String),

    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("injected failure: {0}")]
    Injected(String),
}

/// A store that accepts whole documents at a path.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Replace the document at `path` with `fields` (create if missing).
    async fn set(
        &self,
        path: &DocumentPath,
        fields: Map<String, Value>,
    ) -> Result<WriteResult, MirrorError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Error bodies from the store can be large; keep logs and responses bounded.
pub(crate) fn truncate_body(body: String) -> String {
    const LIMIT: usize = 500;
    if body.len() <= LIMIT {
        return body;
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
