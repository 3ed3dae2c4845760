//! Personal-data dual write
//!
//! Order of operations:
//! 1. begin a relational transaction and insert the row
//! 2. upsert the mirror document
//! 3. commit
//!
//! A mirror failure rolls the transaction back. A commit failure after the
//! mirror write has landed is reported but not compensated: the document
//! stays in the document store with no relational row behind it.

use serde::Serialize;

use crate::db::{mirror_fields, ConnectionManager, DbError, PersonalDataInput, Record, RecordRepo};
use crate::docstore::{DocumentPath, DocumentStore, WriteResult};

/// Both legs of a successful creation.
#[derive(Debug, Clone, Serialize)]
pub struct PersonalDataCreated {
    #[serde(rename = "postgres")]
    pub record: Record,
    #[serde(rename = "firebase")]
    pub mirror: WriteResult,
}

/// Insert a personal-data row and mirror it, atomically on the relational side.
pub async fn create_personal_data(
    db: &ConnectionManager,
    mirror: &dyn DocumentStore,
    input: &PersonalDataInput,
) -> Result<PersonalDataCreated, DbError> {
    let mut tx = db.begin().await?;

    // Dropping `tx` on an insert error rolls it back.
    let record = RecordRepo::personal_data(db.schema())
        .insert(&mut tx, input)
        .await?;
    let usuario = record.text("usuario");

    let written = match write_mirror(mirror, &record).await {
        Ok(written) => written,
        Err(e) => {
            tracing::error!(
                usuario = %usuario,
                backend = mirror.backend(),
                error = %e,
                "mirror write failed, rolling back"
            );
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(usuario = %usuario, error = %rollback, "rollback failed");
            }
            return Err(e);
        }
    };

    if let Err(e) = tx.commit().await {
        tracing::warn!(
            usuario = %usuario,
            backend = mirror.backend(),
            error = %e,
            "commit failed after mirror write; document store now holds a record the database does not"
        );
        return Err(e.into());
    }

    tracing::info!(usuario = %usuario, backend = mirror.backend(), "personal data created");
    Ok(PersonalDataCreated {
        record,
        mirror: written,
    })
}

async fn write_mirror(mirror: &dyn DocumentStore, record: &Record) -> Result<WriteResult, DbError> {
    let path = DocumentPath::personal_data(&record.text("usuario"))?;
    Ok(mirror.set(&path, mirror_fields(record)).await?)
}
