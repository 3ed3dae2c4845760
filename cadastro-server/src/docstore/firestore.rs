//! Firestore REST client
//!
//! `set` is a PATCH on the document resource without an update mask, which
//! replaces the whole document and creates it if absent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::credentials::{ServiceAccountKey, TokenSource};
use super::{truncate_body, value, DocumentPath, DocumentStore, MirrorError, WriteResult};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// The emulator accepts this fixed bearer token.
const EMULATOR_TOKEN: &str = "owner";

enum Auth {
    ServiceAccount(TokenSource),
    Emulator,
}

/// Subset of the Document resource returned by a write.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentResponse {
    update_time: DateTime<Utc>,
}

/// Authenticated handle to one Firestore project's default database.
pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    auth: Auth,
}

impl FirestoreClient {
    /// Production client authenticated with a service-account key.
    pub fn from_service_account(key: ServiceAccountKey, http: reqwest::Client) -> Self {
        let project_id = key.project_id.clone();
        Self {
            base_url: FIRESTORE_BASE_URL.to_string(),
            project_id,
            auth: Auth::ServiceAccount(TokenSource::new(key, http.clone())),
            http,
        }
    }

    /// Client for a local emulator, e.g. `localhost:8080`.
    pub fn emulator(host: &str, project_id: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: format!("http://{}/v1", host.trim_end_matches('/')),
            project_id: project_id.into(),
            auth: Auth::Emulator,
            http,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Segments are percent-encoded individually; ids may hold any character
    /// except `/`.
    fn document_url(&self, path: &DocumentPath) -> Result<Url, MirrorError> {
        let root = format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url, self.project_id
        );
        let mut url = Url::parse(&root)
            .map_err(|e| MirrorError::InvalidPath(format!("bad base url {}: {}", root, e)))?;
        url.path_segments_mut()
            .map_err(|_| MirrorError::InvalidPath(format!("base url {} cannot hold a path", root)))?
            .extend(path.segments());
        Ok(url)
    }

    async fn bearer_token(&self) -> Result<String, MirrorError> {
        match &self.auth {
            Auth::ServiceAccount(source) => source.access_token().await,
            Auth::Emulator => Ok(EMULATOR_TOKEN.to_string()),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn set(
        &self,
        path: &DocumentPath,
        fields: Map<String, Value>,
    ) -> Result<WriteResult, MirrorError> {
        let url = self.document_url(path)?;
        let token = self.bearer_token().await?;
        let body = json!({ "fields": value::encode_fields(&fields) });

        let response = self
            .http
            .patch(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = truncate_body(response.text().await.unwrap_or_default());
            tracing::warn!(%path, status, "document store rejected write");
            return Err(MirrorError::Status { status, body });
        }

        let document: DocumentResponse = response.json().await?;
        tracing::debug!(%path, update_time = %document.update_time, "document written");

        Ok(WriteResult {
            write_time: document.update_time,
        })
    }

    fn backend(&self) -> &'static str {
        "firestore"
    }
}
