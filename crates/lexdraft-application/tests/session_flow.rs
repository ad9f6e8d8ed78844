//! End-to-end editing flows over the file-backed recent log and the
//! in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use lexdraft_application::{EditingSession, RecentDocuments, SessionNotice};
use lexdraft_core::config::EditorConfig;
use lexdraft_core::document::{DocumentPatch, ExportFormat};
use lexdraft_core::editor::Suggestion;
use lexdraft_core::template::Template;
use lexdraft_infrastructure::{
    InMemoryDocumentRepository, InMemoryTemplateCatalog, LexdraftPaths, TomlRecentDocumentsStore,
};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn lease_template() -> Template {
    Template {
        id: "lease".to_string(),
        name: "Residential Lease".to_string(),
        body: "<h1>Lease</h1><p>The tenant will pay rent monthly.</p>".to_string(),
        category: Some("real-estate".to_string()),
        description: None,
    }
}

async fn open_session(
    dir: &TempDir,
    repo: Arc<InMemoryDocumentRepository>,
    config: EditorConfig,
) -> (Arc<EditingSession>, mpsc::UnboundedReceiver<SessionNotice>) {
    let paths = LexdraftPaths::new(Some(dir.path().to_path_buf()));
    let store = Arc::new(TomlRecentDocumentsStore::new(&paths).unwrap());
    let recent = RecentDocuments::load(store, config.recent_documents_limit).await;
    let catalog = Arc::new(InMemoryTemplateCatalog::new([lease_template()]));
    let (tx, rx) = mpsc::unbounded_channel();
    let session = EditingSession::new(repo, catalog, Arc::new(recent), config).with_notices(tx);
    (Arc::new(session), rx)
}

#[tokio::test]
async fn test_draft_to_saved_document_survives_restart() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(InMemoryDocumentRepository::new());
    let (session, _notices) = open_session(&dir, repo.clone(), EditorConfig::default()).await;

    let draft = session.open_template("lease").await.unwrap();
    session
        .apply_suggestion(&draft, &Suggestion::replace("will pay", "shall pay"), None)
        .await
        .unwrap();
    let saved = session.save(&draft).await.unwrap();

    let stored = repo.get(saved.as_permanent().unwrap()).await.unwrap();
    assert_eq!(stored.title, "Residential Lease");
    assert!(stored.body.contains("shall pay"));

    // A new session over the same config dir sees the recent entry.
    let (restarted, _notices) = open_session(&dir, repo.clone(), EditorConfig::default()).await;
    let entries = restarted.recent().entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, saved.to_string());

    let reopened = restarted.open_existing(&entries[0].id).await.unwrap();
    assert_eq!(reopened, saved);
    assert!(!restarted.has_unsaved_changes().await);
}

#[tokio::test]
async fn test_corrupt_recent_file_does_not_block_session() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("recent_documents.toml"), "not = [valid").unwrap();
    let repo = Arc::new(InMemoryDocumentRepository::new());

    let (session, _notices) = open_session(&dir, repo, EditorConfig::default()).await;

    assert!(session.recent().entries().await.is_empty());
    let draft = session.open_template("lease").await.unwrap();
    session.save(&draft).await.unwrap();
    assert_eq!(session.recent().entries().await.len(), 1);
}

#[tokio::test]
async fn test_export_of_saved_document_uses_stored_copy() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(InMemoryDocumentRepository::new());
    let (session, _notices) = open_session(&dir, repo, EditorConfig::default()).await;

    let draft = session.open_template("lease").await.unwrap();
    let saved = session.save(&draft).await.unwrap();
    session
        .edit(&saved, DocumentPatch::body("<p>unsaved edit</p>"))
        .await
        .unwrap();

    let bytes = session.export(&saved, ExportFormat::Html).await.unwrap();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("unsaved edit"));

    session.save(&saved).await.unwrap();
    let bytes = session.export(&saved, ExportFormat::Html).await.unwrap();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("<title>Residential Lease</title>"));
}

#[tokio::test(start_paused = true)]
async fn test_configured_autosave_persists_drafts() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(InMemoryDocumentRepository::new());
    let config = EditorConfig {
        autosave_interval_secs: 5,
        ..EditorConfig::default()
    };
    let (session, mut notices) = open_session(&dir, repo.clone(), config).await;

    let draft = session.open_template("lease").await.unwrap();
    session.start_configured_autosave().await;
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert!(!session.has_unsaved_changes().await);
    let saved = session.document(&draft).await.unwrap();
    assert!(!saved.id().is_temporary());
    assert_eq!(repo.len().await, 1);

    let mut saw_saved = false;
    while let Ok(notice) = notices.try_recv() {
        if let SessionNotice::Saved { previous_id, .. } = notice {
            assert_eq!(previous_id, Some(draft.clone()));
            saw_saved = true;
        }
    }
    assert!(saw_saved);

    session.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_disabled_autosave_does_not_start() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(InMemoryDocumentRepository::new());
    let config = EditorConfig {
        autosave_enabled: false,
        ..EditorConfig::default()
    };
    let (session, _notices) = open_session(&dir, repo.clone(), config).await;

    session.open_template("lease").await.unwrap();
    session.start_configured_autosave().await;
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert!(!session.is_autosave_running().await);
    assert!(session.has_unsaved_changes().await);
    assert_eq!(repo.calls().create, 0);
}
