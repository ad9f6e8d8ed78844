use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use indexmap::IndexMap;
use lexdraft_core::config::EditorConfig;
use lexdraft_core::document::{
    DocumentId, DocumentPatch, DocumentRecord, DocumentRepository, DocumentSummary, ExportFormat,
    ExportTarget, StoredDocument,
};
use lexdraft_core::editor::{
    self, HtmlBuffer, RichTextBuffer, Suggestion, SuggestionOutcome, TextSpan,
};
use lexdraft_core::error::{LexdraftError, Result};
use lexdraft_core::outline::{self, OutlineEntry};
use lexdraft_core::recent::RecentDocumentEntry;
use lexdraft_core::template::{Template, TemplateCatalog};
use tokio::sync::{Mutex, RwLock, mpsc};

use super::notice::SessionNotice;
use crate::autosave::{AutosaveHandle, AutosaveScheduler};
use crate::recent::RecentDocuments;

/// One open document plus the gate serializing its saves and close.
///
/// The gate travels with the record when its identity changes, so a save
/// queued under the temporary id still waits for the create in flight.
struct Entry {
    record: DocumentRecord,
    gate: Arc<Mutex<()>>,
}

impl Entry {
    fn new(record: DocumentRecord) -> Self {
        Self {
            record,
            gate: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Default)]
struct SessionState {
    /// Insertion order is tab order.
    records: IndexMap<DocumentId, Entry>,
    active: Option<DocumentId>,
    /// Temporary ids that were replaced by a permanent one.
    aliases: HashMap<DocumentId, DocumentId>,
}

impl SessionState {
    /// Current identity for `id`, following a temporary→permanent swap.
    fn resolve(&self, id: &DocumentId) -> Option<DocumentId> {
        if self.records.contains_key(id) {
            return Some(id.clone());
        }
        self.aliases
            .get(id)
            .filter(|target| self.records.contains_key(*target))
            .cloned()
    }

    fn entry(&self, id: &DocumentId) -> Result<(DocumentId, &Entry)> {
        let current = self.resolve(id).ok_or_else(|| LexdraftError::not_open(id))?;
        let entry = self
            .records
            .get(&current)
            .ok_or_else(|| LexdraftError::not_open(id))?;
        Ok((current, entry))
    }

    fn record_mut(&mut self, id: &DocumentId) -> Result<&mut DocumentRecord> {
        let current = self.resolve(id).ok_or_else(|| LexdraftError::not_open(id))?;
        self.records
            .get_mut(&current)
            .map(|entry| &mut entry.record)
            .ok_or_else(|| LexdraftError::not_open(id))
    }

    fn insert_and_activate(&mut self, record: DocumentRecord) -> DocumentId {
        let id = record.id().clone();
        self.records.insert(id.clone(), Entry::new(record));
        self.active = Some(id.clone());
        id
    }

    /// Moves the entry under `new_id`, keeping its tab position.
    fn swap_identity(&mut self, old_id: &DocumentId, new_id: &DocumentId) -> Option<&mut Entry> {
        let permanent = new_id.as_permanent()?.to_string();
        let (index, _, Entry { record, gate }) = self.records.shift_remove_full(old_id)?;
        let record = record.into_permanent(permanent);
        self.records.shift_insert(index, new_id.clone(), Entry { record, gate });

        if self.active.as_ref() == Some(old_id) {
            self.active = Some(new_id.clone());
        }
        self.aliases.insert(old_id.clone(), new_id.clone());
        self.records.get_mut(new_id)
    }
}

/// What a completed save changed, captured for the work done after the
/// state lock is released.
struct SaveReceipt {
    id: DocumentId,
    previous_id: Option<DocumentId>,
    recent: RecentDocumentEntry,
}

/// Multi-document editing session.
///
/// `EditingSession` owns every open [`DocumentRecord`] and the active-tab
/// pointer. It is responsible for:
/// - Opening documents from templates or from persistence
/// - Tracking unsaved state per document
/// - Saving, including the temporary→permanent identity swap
/// - Guarding closes of documents with unsaved changes
/// - Running the autosave sweep it owns
///
/// State sits behind a `RwLock` that is never held across a collaborator
/// call. Saves and closes of one document are serialized by that document's
/// gate; edits never wait for a save.
pub struct EditingSession {
    documents: Arc<dyn DocumentRepository>,
    templates: Arc<dyn TemplateCatalog>,
    recent: Arc<RecentDocuments>,
    config: EditorConfig,
    state: RwLock<SessionState>,
    notices: Option<mpsc::UnboundedSender<SessionNotice>>,
    autosave: Mutex<Option<AutosaveHandle>>,
}

impl EditingSession {
    /// Creates an empty session over the given collaborators.
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        templates: Arc<dyn TemplateCatalog>,
        recent: Arc<RecentDocuments>,
        config: EditorConfig,
    ) -> Self {
        Self {
            documents,
            templates,
            recent,
            config,
            state: RwLock::new(SessionState::default()),
            notices: None,
            autosave: Mutex::new(None),
        }
    }

    /// Routes [`SessionNotice`]s to `sender`.
    pub fn with_notices(mut self, sender: mpsc::UnboundedSender<SessionNotice>) -> Self {
        self.notices = Some(sender);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn recent(&self) -> &Arc<RecentDocuments> {
        &self.recent
    }

    pub(crate) fn notify(&self, notice: SessionNotice) {
        if let Some(sender) = &self.notices {
            // Nobody listening is fine.
            let _ = sender.send(notice);
        }
    }

    // ============================================================================
    // Opening
    // ============================================================================

    /// Opens a new unsaved document seeded from `template` and activates it.
    ///
    /// If a draft from the same template is still open under its temporary
    /// identity, that draft is activated instead.
    pub async fn open_from_template(&self, template: &Template) -> Result<DocumentId> {
        let mut state = self.state.write().await;

        let existing = state
            .records
            .values()
            .find(|entry| entry.record.draft_template_id() == Some(template.id.as_str()))
            .map(|entry| entry.record.id().clone());
        if let Some(id) = existing {
            tracing::debug!(%id, template_id = %template.id, "Re-activating open template draft");
            state.active = Some(id.clone());
            return Ok(id);
        }

        let record = DocumentRecord::from_template(template, &self.config.untitled_title);
        let id = state.insert_and_activate(record);
        tracing::info!(%id, template_id = %template.id, "Opened document from template");
        Ok(id)
    }

    /// Fetches `template_id` from the template catalog and opens it.
    pub async fn open_template(&self, template_id: &str) -> Result<DocumentId> {
        let template = self
            .templates
            .get_template(template_id)
            .await
            .map_err(|e| collaborator_error("template lookup", e))?
            .ok_or_else(|| LexdraftError::not_found("template", template_id))?;
        self.open_from_template(&template).await
    }

    /// Opens the stored document `id` and activates it.
    ///
    /// A document that is already open is only activated; nothing is fetched.
    pub async fn open_existing(&self, id: &str) -> Result<DocumentId> {
        let id = id.trim();
        if id.is_empty() {
            return Err(LexdraftError::validation("document id must not be empty"));
        }
        let doc_id = DocumentId::permanent(id);

        {
            let mut state = self.state.write().await;
            if let Some(current) = state.resolve(&doc_id) {
                state.active = Some(current.clone());
                return Ok(current);
            }
        }

        let stored = self
            .documents
            .load(id)
            .await
            .map_err(|e| collaborator_error("load", e))?
            .ok_or_else(|| LexdraftError::not_found("document", id))?;
        let recent_entry = RecentDocumentEntry::from_stored(&stored, &self.config.untitled_title);

        {
            let mut state = self.state.write().await;
            // A concurrent open of the same document may have finished first.
            if state.records.contains_key(&doc_id) {
                state.active = Some(doc_id.clone());
                return Ok(doc_id);
            }
            let record = self.record_from_stored(stored, &doc_id);
            state.insert_and_activate(record);
        }
        tracing::info!(id = %doc_id, "Opened existing document");

        self.record_recent(recent_entry).await;
        Ok(doc_id)
    }

    fn record_from_stored(&self, mut stored: StoredDocument, id: &DocumentId) -> DocumentRecord {
        // Key the record by the id that was asked for.
        if let Some(requested) = id.as_permanent() {
            stored.id = requested.to_string();
        }
        DocumentRecord::from_stored(stored, &self.config.untitled_title)
    }

    // ============================================================================
    // Editing
    // ============================================================================

    /// Merges `patch` into the document. Empty titles are ignored.
    pub async fn edit(&self, id: &DocumentId, patch: DocumentPatch) -> Result<()> {
        let mut state = self.state.write().await;
        let record = state.record_mut(id)?;
        if record.apply_patch(patch) {
            tracing::debug!(%id, revision = record.revision(), "Document edited");
        }
        Ok(())
    }

    pub async fn set_linked_case(&self, id: &DocumentId, case_id: Option<String>) -> Result<()> {
        let mut state = self.state.write().await;
        state.record_mut(id)?.set_linked_case(case_id);
        Ok(())
    }

    /// Applies an AI suggestion to the document body.
    ///
    /// A suggestion whose original text is gone leaves the body untouched and
    /// emits [`SessionNotice::SuggestionConflict`].
    pub async fn apply_suggestion(
        &self,
        id: &DocumentId,
        suggestion: &Suggestion,
        cursor: Option<usize>,
    ) -> Result<SuggestionOutcome> {
        let (current, outcome) = {
            let mut state = self.state.write().await;
            let record = state.record_mut(id)?;
            let (body, outcome) = editor::apply_to_body(record.body(), suggestion, cursor);
            if outcome.changed_body() {
                record.apply_patch(DocumentPatch::body(body));
            }
            (record.id().clone(), outcome)
        };

        if outcome.is_conflict() {
            tracing::debug!(id = %current, "Suggestion no longer matches document");
            self.notify(SessionNotice::SuggestionConflict {
                id: current,
                original: suggestion.original.clone(),
            });
        }
        Ok(outcome)
    }

    /// Locates the first occurrence of `text` in the document's plain text.
    pub async fn find_text(&self, id: &DocumentId, text: &str) -> Result<Option<TextSpan>> {
        let state = self.state.read().await;
        let (_, entry) = state.entry(id)?;
        let plain = HtmlBuffer::new(entry.record.body()).plain_text();
        Ok(editor::locate(&plain, text))
    }

    pub async fn outline(&self, id: &DocumentId) -> Result<Vec<OutlineEntry>> {
        let state = self.state.read().await;
        let (_, entry) = state.entry(id)?;
        Ok(outline::extract(entry.record.body()))
    }

    // ============================================================================
    // Saving
    // ============================================================================

    /// Persists the document and returns its identity after the save.
    ///
    /// A temporary document is created upstream and re-keyed under its new
    /// permanent id at the same tab position. On failure the document stays
    /// dirty and the error is returned.
    pub async fn save(&self, id: &DocumentId) -> Result<DocumentId> {
        match self.save_inner(id, false).await? {
            Some(saved) => Ok(saved),
            None => Err(LexdraftError::not_open(id)),
        }
    }

    /// Saves only if the document is still open and dirty once its gate is
    /// acquired. Returns `None` when there was nothing to do.
    pub async fn save_if_dirty(&self, id: &DocumentId) -> Result<Option<DocumentId>> {
        self.save_inner(id, true).await
    }

    async fn save_inner(
        &self,
        id: &DocumentId,
        only_if_dirty: bool,
    ) -> Result<Option<DocumentId>> {
        let gate = {
            let state = self.state.read().await;
            match state.entry(id) {
                Ok((_, entry)) => entry.gate.clone(),
                Err(_) if only_if_dirty => return Ok(None),
                Err(e) => return Err(e),
            }
        };
        let _guard = gate.lock().await;

        // Snapshot after the gate: an earlier save may have swapped the
        // identity, and the document may have been closed meanwhile.
        let (current, payload, revision) = {
            let state = self.state.read().await;
            let (current, entry) = match state.entry(id) {
                Ok(found) => found,
                Err(_) if only_if_dirty => return Ok(None),
                Err(e) => return Err(e),
            };
            if only_if_dirty && !entry.record.is_dirty() {
                return Ok(None);
            }
            let title = entry.record.validate_for_save()?;
            let mut payload = entry.record.payload();
            payload.title = title;
            (current, payload, entry.record.revision())
        };

        let new_id = match &current {
            DocumentId::Temporary(_) => {
                let created = self
                    .documents
                    .create(&payload)
                    .await
                    .map_err(|e| collaborator_error("create", e))?;
                DocumentId::permanent(created)
            }
            DocumentId::Permanent(stored_id) => {
                self.documents
                    .update(stored_id, &payload)
                    .await
                    .map_err(|e| collaborator_error("update", e))?;
                current.clone()
            }
        };

        let saved_at = Utc::now();
        let receipt = {
            let mut state = self.state.write().await;
            let entry = if new_id != current {
                state.swap_identity(&current, &new_id)
            } else {
                state.records.get_mut(&current)
            };
            let entry = entry.ok_or_else(|| {
                LexdraftError::internal(format!("document {current} vanished during save"))
            })?;

            entry.record.mark_saved(revision, saved_at);
            SaveReceipt {
                id: new_id.clone(),
                previous_id: (new_id != current).then(|| current.clone()),
                recent: RecentDocumentEntry::new(
                    new_id.to_string(),
                    payload.title.clone(),
                    saved_at,
                )
                .with_linked_case(payload.linked_case_id.clone()),
            }
        };

        match &receipt.previous_id {
            Some(previous) => {
                tracing::info!(id = %receipt.id, previous = %previous, "Created document")
            }
            None => tracing::info!(id = %receipt.id, "Saved document"),
        }
        self.notify(SessionNotice::Saved {
            id: receipt.id.clone(),
            previous_id: receipt.previous_id,
        });
        self.record_recent(receipt.recent).await;

        Ok(Some(receipt.id))
    }

    async fn record_recent(&self, entry: RecentDocumentEntry) {
        if let Err(e) = self.recent.record(entry).await {
            tracing::warn!("Failed to persist recent documents log: {}", e);
            self.notify(SessionNotice::RecentLogUnavailable {
                error: e.to_string(),
            });
        }
    }

    /// Exports the document through the persistence collaborator.
    ///
    /// A clean, stored document is exported by id; anything else exports its
    /// current in-session content.
    pub async fn export(&self, id: &DocumentId, format: ExportFormat) -> Result<Vec<u8>> {
        let target = {
            let state = self.state.read().await;
            let (current, entry) = state.entry(id)?;
            match current.as_permanent() {
                Some(stored_id) if !entry.record.is_dirty() => ExportTarget::Stored {
                    id: stored_id.to_string(),
                },
                _ => ExportTarget::Content {
                    title: entry.record.title().to_string(),
                    body: entry.record.body().to_string(),
                },
            }
        };
        self.documents
            .export_as(&target, format)
            .await
            .map_err(|e| collaborator_error("export", e))
    }

    // ============================================================================
    // Tabs
    // ============================================================================

    /// Closes the document.
    ///
    /// Waits for an in-flight save first. Closing a dirty document without
    /// `force` fails with [`LexdraftError::CloseGuard`]. If the closed
    /// document was active, the first remaining one becomes active.
    pub async fn close(&self, id: &DocumentId, force: bool) -> Result<()> {
        let gate = {
            let state = self.state.read().await;
            state.entry(id)?.1.gate.clone()
        };
        let _guard = gate.lock().await;

        let mut state = self.state.write().await;
        let (current, entry) = state.entry(id)?;
        if entry.record.is_dirty() && !force {
            return Err(LexdraftError::close_guard(current.to_string()));
        }

        state.records.shift_remove(&current);
        state.aliases.retain(|_, target| *target != current);
        if state.active.as_ref() == Some(&current) {
            state.active = state.records.keys().next().cloned();
        }
        tracing::debug!(id = %current, forced = force, "Closed document");
        Ok(())
    }

    /// Makes `id` the active document.
    pub async fn activate(&self, id: &DocumentId) -> Result<()> {
        let mut state = self.state.write().await;
        let current = state.resolve(id).ok_or_else(|| LexdraftError::not_open(id))?;
        state.active = Some(current);
        Ok(())
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub async fn active_id(&self) -> Option<DocumentId> {
        self.state.read().await.active.clone()
    }

    /// Snapshot of the open document, resolving a replaced temporary id.
    pub async fn document(&self, id: &DocumentId) -> Option<DocumentRecord> {
        let state = self.state.read().await;
        state.entry(id).ok().map(|(_, entry)| entry.record.clone())
    }

    /// Tab-strip summaries in tab order.
    pub async fn documents(&self) -> Vec<DocumentSummary> {
        let state = self.state.read().await;
        state
            .records
            .iter()
            .map(|(id, entry)| entry.record.summary(state.active.as_ref() == Some(id)))
            .collect()
    }

    pub async fn dirty_ids(&self) -> Vec<DocumentId> {
        let state = self.state.read().await;
        state
            .records
            .iter()
            .filter(|(_, entry)| entry.record.is_dirty())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub async fn has_unsaved_changes(&self) -> bool {
        let state = self.state.read().await;
        state.records.values().any(|entry| entry.record.is_dirty())
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    // ============================================================================
    // Autosave
    // ============================================================================

    /// Starts the periodic autosave sweep, replacing any running one.
    pub async fn start_autosave(self: &Arc<Self>, interval: Duration) {
        let handle = AutosaveScheduler::new(interval).spawn(self);
        let previous = self.autosave.lock().await.replace(handle);
        if let Some(previous) = previous {
            previous.shutdown().await;
        }
    }

    /// Starts autosave with the configured interval, if enabled.
    pub async fn start_configured_autosave(self: &Arc<Self>) {
        if self.config.autosave_enabled {
            self.start_autosave(self.config.autosave_interval()).await;
        } else {
            tracing::debug!(target: "autosave", "Autosave disabled by configuration");
        }
    }

    pub async fn is_autosave_running(&self) -> bool {
        self.autosave.lock().await.is_some()
    }

    /// Stops autosave and waits for the sweep task to finish.
    ///
    /// A save already in flight completes; nothing further is saved.
    pub async fn teardown(&self) {
        let handle = self.autosave.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
        tracing::debug!("Editing session torn down");
    }
}

/// Normalizes collaborator failures to [`LexdraftError::Persistence`].
fn collaborator_error(operation: &str, err: LexdraftError) -> LexdraftError {
    if err.is_persistence() || err.is_not_found() {
        err
    } else {
        LexdraftError::persistence(format!("{operation} failed: {err}"))
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
