//! Document domain model.
//!
//! `DocumentRecord` is the in-memory state of one open editor tab. Its fields
//! are private so the record can only change through operations that keep the
//! dirty/revision bookkeeping consistent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LexdraftError, Result};
use crate::template::Template;

const TEMPORARY_PREFIX: &str = "temp-";

/// Placeholder title used when none is configured.
pub const DEFAULT_UNTITLED_TITLE: &str = "Untitled Document";

/// Identity of a document inside an editing session.
///
/// A document starts either with a client-minted temporary identity (new,
/// never persisted) or with the permanent identity the persistence
/// collaborator assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DocumentId {
    Temporary(Uuid),
    Permanent(String),
}

impl DocumentId {
    /// Mints a fresh temporary identity.
    pub fn mint_temporary() -> Self {
        Self::Temporary(Uuid::new_v4())
    }

    pub fn permanent(id: impl Into<String>) -> Self {
        Self::Permanent(id.into())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// Returns the server-assigned id, if this identity is permanent.
    pub fn as_permanent(&self) -> Option<&str> {
        match self {
            Self::Permanent(id) => Some(id),
            Self::Temporary(_) => None,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporary(uuid) => write!(f, "{TEMPORARY_PREFIX}{uuid}"),
            Self::Permanent(id) => f.write_str(id),
        }
    }
}

impl FromStr for DocumentId {
    type Err = LexdraftError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LexdraftError::validation("document id must not be empty"));
        }
        if let Some(rest) = s.strip_prefix(TEMPORARY_PREFIX) {
            if let Ok(uuid) = Uuid::parse_str(rest) {
                return Ok(Self::Temporary(uuid));
            }
        }
        Ok(Self::Permanent(s.to_string()))
    }
}

/// How a record entered the session. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentOrigin {
    FromTemplate { template_id: String },
    OpenedExisting,
}

/// A document as returned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_case_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// The content sent to the persistence collaborator on create/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_case_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// A partial update to a record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl DocumentPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: None,
        }
    }

    pub fn body(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: Some(body.into()),
        }
    }
}

/// Tab-strip view of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub dirty: bool,
    pub origin: DocumentOrigin,
    pub is_active: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// An open document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    id: DocumentId,
    title: String,
    body: String,
    origin: DocumentOrigin,
    dirty: bool,
    linked_case_id: Option<String>,
    last_saved_at: Option<DateTime<Utc>>,
    revision: u64,
}

/// Returns `input` trimmed, or `fallback` when nothing is left.
pub fn resolve_title(input: &str, fallback: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

impl DocumentRecord {
    /// Creates an unsaved document seeded from a template.
    pub fn from_template(template: &Template, untitled_title: &str) -> Self {
        Self {
            id: DocumentId::mint_temporary(),
            title: resolve_title(&template.name, untitled_title),
            body: template.body.clone(),
            origin: DocumentOrigin::FromTemplate {
                template_id: template.id.clone(),
            },
            dirty: true,
            linked_case_id: None,
            last_saved_at: None,
            revision: 0,
        }
    }

    /// Creates a clean record from a document loaded through persistence.
    pub fn from_stored(stored: StoredDocument, untitled_title: &str) -> Self {
        Self {
            id: DocumentId::Permanent(stored.id),
            title: resolve_title(&stored.title, untitled_title),
            body: stored.body,
            origin: DocumentOrigin::OpenedExisting,
            dirty: false,
            linked_case_id: stored.linked_case_id,
            last_saved_at: stored.last_modified,
            revision: 0,
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn origin(&self) -> &DocumentOrigin {
        &self.origin
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn linked_case_id(&self) -> Option<&str> {
        self.linked_case_id.as_deref()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Template this record was created from, while it is still an unsaved draft.
    pub fn draft_template_id(&self) -> Option<&str> {
        match (&self.id, &self.origin) {
            (DocumentId::Temporary(_), DocumentOrigin::FromTemplate { template_id }) => {
                Some(template_id)
            }
            _ => None,
        }
    }

    /// Merges a patch into the record.
    ///
    /// Empty titles are ignored. Returns `true` when anything was applied, in
    /// which case the record is dirty and its revision has advanced.
    pub fn apply_patch(&mut self, patch: DocumentPatch) -> bool {
        let mut changed = false;

        if let Some(title) = patch.title {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                self.title = trimmed.to_string();
                changed = true;
            }
        }

        if let Some(body) = patch.body {
            self.body = body;
            changed = true;
        }

        if changed {
            self.touch();
        }
        changed
    }

    pub fn set_linked_case(&mut self, case_id: Option<String>) {
        self.linked_case_id = case_id;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.dirty = true;
    }

    /// Validates the record for saving and returns its resolved title.
    pub fn validate_for_save(&self) -> Result<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(LexdraftError::validation(
                "a title is required before the document can be saved",
            ));
        }
        Ok(title.to_string())
    }

    /// Content to persist for the current state.
    pub fn payload(&self) -> DocumentPayload {
        DocumentPayload {
            title: self.title.clone(),
            body: self.body.clone(),
            linked_case_id: self.linked_case_id.clone(),
            template_id: match &self.origin {
                DocumentOrigin::FromTemplate { template_id } => Some(template_id.clone()),
                DocumentOrigin::OpenedExisting => None,
            },
        }
    }

    /// Records a successful save of `saved_revision`.
    ///
    /// The record only becomes clean if no edit arrived after the saved
    /// snapshot was taken.
    pub fn mark_saved(&mut self, saved_revision: u64, at: DateTime<Utc>) {
        if self.revision == saved_revision {
            self.dirty = false;
        }
        self.last_saved_at = Some(at);
    }

    /// Moves the record under its permanent identity.
    pub fn into_permanent(mut self, id: String) -> Self {
        self.id = DocumentId::Permanent(id);
        self
    }

    pub fn summary(&self, is_active: bool) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            dirty: self.dirty,
            origin: self.origin.clone(),
            is_active,
            last_saved_at: self.last_saved_at,
        }
    }
}
