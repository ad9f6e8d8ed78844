//! Document persistence contract.
//!
//! Defines the interface the editing session uses to load, create, update and
//! export documents, decoupling it from the concrete backend (REST service,
//! local files, in-memory test doubles).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::{DocumentPayload, StoredDocument};
use crate::error::Result;

/// Output formats supported by the export call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Docx,
    Html,
}

/// What to export: a persisted document, or content that is not (yet) stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExportTarget {
    Stored { id: String },
    Content { title: String, body: String },
}

/// An abstract repository for document persistence.
///
/// # Implementation Notes
///
/// Implementations own their timeout/retry policy. Any `Err` is treated by
/// the session as a failed operation; the session never retries on its own.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Loads a document by its permanent id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StoredDocument))`: Document found
    /// - `Ok(None)`: No such document upstream
    /// - `Err(_)`: Error occurred during retrieval
    async fn load(&self, id: &str) -> Result<Option<StoredDocument>>;

    /// Persists a new document and returns the permanent id assigned to it.
    async fn create(&self, payload: &DocumentPayload) -> Result<String>;

    /// Overwrites the stored title/body of an existing document.
    async fn update(&self, id: &str, payload: &DocumentPayload) -> Result<()>;

    /// Renders a document into the requested format.
    async fn export_as(&self, target: &ExportTarget, format: ExportFormat) -> Result<Vec<u8>>;
}
