//! Document domain module.
//!
//! - `model`: the open-document entity (`DocumentRecord`) and its identity
//! - `repository`: the persistence collaborator contract

mod model;
mod repository;

pub use model::{
    DEFAULT_UNTITLED_TITLE, DocumentId, DocumentOrigin, DocumentPatch, DocumentPayload,
    DocumentRecord, DocumentSummary, StoredDocument, resolve_title,
};
pub use repository::{DocumentRepository, ExportFormat, ExportTarget};
