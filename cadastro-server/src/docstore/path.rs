//! Document paths: alternating collection / document id segments

use std::fmt;

use super::MirrorError;

const USERS_COLLECTION: &str = "usuarios";
const PERSONAL_DATA_COLLECTION: &str = "dados_pessoais";

/// Path to a single document, e.g. `usuarios/alice/dados_pessoais/alice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Build a path from `collection, id, collection, id, ...`.
    pub fn new<I, S>(segments: I) -> Result<Self, MirrorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();

        if segments.is_empty() || segments.len() % 2 != 0 {
            return Err(MirrorError::InvalidPath(format!(
                "a document path needs an even number of segments, got {}",
                segments.len()
            )));
        }
        for segment in &segments {
            if segment.is_empty() {
                return Err(MirrorError::InvalidPath("empty path segment".into()));
            }
            if segment.contains('/') {
                return Err(MirrorError::InvalidPath(format!(
                    "segment '{}' contains '/'",
                    segment
                )));
            }
            if segment == "." || segment == ".." {
                return Err(MirrorError::InvalidPath(format!(
                    "segment '{}' is reserved",
                    segment
                )));
            }
        }

        Ok(Self { segments })
    }

    /// `usuarios/{usuario}/dados_pessoais/{usuario}`
    pub fn personal_data(usuario: &str) -> Result<Self, MirrorError> {
        Self::new([
            USERS_COLLECTION,
            usuario,
            PERSONAL_DATA_COLLECTION,
            usuario,
        ])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
