//! Process-local collaborators.
//!
//! Used by tests wherever a real backend is not available.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lexdraft_core::document::{
    DocumentPayload, DocumentRepository, ExportFormat, ExportTarget, StoredDocument,
};
use lexdraft_core::editor::escape_text;
use lexdraft_core::error::{LexdraftError, Result};
use lexdraft_core::template::{Template, TemplateCatalog};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct CallCounts {
    load: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    export: AtomicUsize,
}

/// Snapshot of how often each operation was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryCalls {
    pub load: usize,
    pub create: usize,
    pub update: usize,
    pub export: usize,
}

/// In-memory [`DocumentRepository`] with injectable write failures and latency.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<HashMap<String, StoredDocument>>,
    next_id: AtomicUsize,
    failing_writes: AtomicUsize,
    latency: Option<Duration>,
    calls: CallCounts,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `latency` before doing its work.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seeds a stored document.
    pub async fn insert(&self, document: StoredDocument) {
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document);
    }

    pub async fn get(&self, id: &str) -> Option<StoredDocument> {
        self.documents.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Makes the next `count` create/update calls fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> RepositoryCalls {
        RepositoryCalls {
            load: self.calls.load.load(Ordering::SeqCst),
            create: self.calls.create.load(Ordering::SeqCst),
            update: self.calls.update.load(Ordering::SeqCst),
            export: self.calls.export.load(Ordering::SeqCst),
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn take_injected_failure(&self, operation: &str) -> Result<()> {
        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            Err(LexdraftError::persistence(format!(
                "{operation} rejected by storage backend"
            )))
        } else {
            Ok(())
        }
    }
}

fn render_html(title: &str, body: &str) -> Vec<u8> {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>\n",
        escape_text(title),
        body
    )
    .into_bytes()
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn load(&self, id: &str) -> Result<Option<StoredDocument>> {
        self.calls.load.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn create(&self, payload: &DocumentPayload) -> Result<String> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.take_injected_failure("create")?;

        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = StoredDocument {
            id: id.clone(),
            title: payload.title.clone(),
            body: payload.body.clone(),
            linked_case_id: payload.linked_case_id.clone(),
            last_modified: Some(Utc::now()),
        };
        self.documents.write().await.insert(id.clone(), stored);
        tracing::debug!(%id, "Created document");
        Ok(id)
    }

    async fn update(&self, id: &str, payload: &DocumentPayload) -> Result<()> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.take_injected_failure("update")?;

        let mut documents = self.documents.write().await;
        let stored = documents
            .get_mut(id)
            .ok_or_else(|| LexdraftError::not_found("document", id))?;
        stored.title = payload.title.clone();
        stored.body = payload.body.clone();
        stored.linked_case_id = payload.linked_case_id.clone();
        stored.last_modified = Some(Utc::now());
        Ok(())
    }

    async fn export_as(&self, target: &ExportTarget, format: ExportFormat) -> Result<Vec<u8>> {
        self.calls.export.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if format != ExportFormat::Html {
            return Err(LexdraftError::persistence(format!(
                "{format:?} export is not available without a rendering backend"
            )));
        }
        match target {
            ExportTarget::Content { title, body } => Ok(render_html(title, body)),
            ExportTarget::Stored { id } => {
                let documents = self.documents.read().await;
                let stored = documents
                    .get(id)
                    .ok_or_else(|| LexdraftError::not_found("document", id.as_str()))?;
                Ok(render_html(&stored.title, &stored.body))
            }
        }
    }
}

/// Fixed set of templates.
#[derive(Debug, Default)]
pub struct InMemoryTemplateCatalog {
    templates: RwLock<HashMap<String, Template>>,
}

impl InMemoryTemplateCatalog {
    pub fn new(templates: impl IntoIterator<Item = Template>) -> Self {
        Self {
            templates: RwLock::new(
                templates
                    .into_iter()
                    .map(|template| (template.id.clone(), template))
                    .collect(),
            ),
        }
    }

    pub async fn insert(&self, template: Template) {
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template);
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryTemplateCatalog {
    async fn get_template(&self, id: &str) -> Result<Option<Template>> {
        Ok(self.templates.read().await.get(id).cloned())
    }
}
