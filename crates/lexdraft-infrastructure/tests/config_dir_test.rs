//! Files written under one config directory, read back through fresh services.

use chrono::Utc;
use lexdraft_core::config::EditorConfig;
use lexdraft_core::recent::{RecentDocumentEntry, RecentDocumentsLog, RecentDocumentsStore};
use lexdraft_infrastructure::{ConfigService, LexdraftPaths, ServiceType, TomlRecentDocumentsStore};
use tempfile::TempDir;

fn paths(dir: &TempDir) -> LexdraftPaths {
    LexdraftPaths::new(Some(dir.path().join("lexdraft")))
}

#[tokio::test]
async fn test_config_and_recent_log_share_directory() {
    let dir = TempDir::new().unwrap();
    let paths = paths(&dir);

    let config = EditorConfig {
        recent_documents_limit: 2,
        ..EditorConfig::default()
    };
    ConfigService::new(paths.clone()).save_config(&config).unwrap();

    let limit = ConfigService::new(paths.clone()).get_config().recent_documents_limit;
    let mut log = RecentDocumentsLog::with_limit(limit);
    for id in ["a", "b", "c"] {
        log.record(RecentDocumentEntry::new(id, id.to_uppercase(), Utc::now()));
    }
    TomlRecentDocumentsStore::new(&paths).unwrap().save(&log).await.unwrap();

    assert!(paths.get_path(ServiceType::Config).unwrap().exists());
    assert!(paths.get_path(ServiceType::RecentDocuments).unwrap().exists());

    let restored = TomlRecentDocumentsStore::new(&paths)
        .unwrap()
        .load()
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<_> = restored.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b"]);
}

#[tokio::test]
async fn test_unknown_config_keys_are_ignored() {
    let dir = TempDir::new().unwrap();
    let paths = paths(&dir);
    let config_path = paths.get_path(ServiceType::Config).unwrap();
    std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    std::fs::write(
        &config_path,
        "[editor]\nautosave_enabled = false\n\n[ui]\ntheme = \"dark\"\n",
    )
    .unwrap();

    let config = ConfigService::new(paths).get_config();
    assert!(!config.autosave_enabled);
    assert_eq!(config.autosave_interval_secs, 60);
}
