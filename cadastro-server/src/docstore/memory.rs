//! In-process document store
//!
//! Backs `--mirror memory` for local runs without cloud credentials, and lets
//! tests force the mirror leg of the dual write to fail.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use super::{DocumentPath, DocumentStore, MirrorError, WriteResult};

/// Documents keyed by their full path.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, Map<String, Value>>>,
    failure: Option<String>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            documents: RwLock::default(),
            failure: Some(message.into()),
        }
    }

    /// Snapshot of the document at `path`.
    pub fn get(&self, path: &DocumentPath) -> Option<Map<String, Value>> {
        self.documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&path.to_string())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set(
        &self,
        path: &DocumentPath,
        fields: Map<String, Value>,
    ) -> Result<WriteResult, MirrorError> {
        if let Some(message) = &self.failure {
            return Err(MirrorError::Injected(message.clone()));
        }

        self.documents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.to_string(), fields);

        Ok(WriteResult {
            write_time: Utc::now(),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn set_overwrites_whole_document() {
        let store = MemoryDocumentStore::new();
        let path = DocumentPath::personal_data("alice").unwrap();

        store
            .set(&path, fields(json!({ "primeiro_nome": "Alice", "cpf": "1" })))
            .await
            .unwrap();
        store
            .set(&path, fields(json!({ "primeiro_nome": "Alicia" })))
            .await
            .unwrap();

        let doc = store.get(&path).unwrap();
        assert_eq!(doc.get("primeiro_nome"), Some(&json!("Alicia")));
        assert!(!doc.contains_key("cpf"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failing_store_writes_nothing() {
        let store = MemoryDocumentStore::failing("unavailable");
        let path = DocumentPath::personal_data("bob").unwrap();

        let err = store.set(&path, Map::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "injected failure: unavailable");
        assert!(store.is_empty());
        assert_eq!(store.backend(), "memory");
    }
}
