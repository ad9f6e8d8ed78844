//! TOML-backed [`RecentDocumentsStore`].

use async_trait::async_trait;
use lexdraft_core::error::{LexdraftError, Result};
use lexdraft_core::recent::{RecentDocumentsLog, RecentDocumentsStore};

use crate::paths::{LexdraftPaths, ServiceType};
use crate::storage::AtomicTomlFile;

/// Persists the recent documents log to `recent_documents.toml`.
#[derive(Debug, Clone)]
pub struct TomlRecentDocumentsStore {
    file: AtomicTomlFile<RecentDocumentsLog>,
}

impl TomlRecentDocumentsStore {
    pub fn new(paths: &LexdraftPaths) -> Result<Self> {
        let path = paths.get_path(ServiceType::RecentDocuments)?;
        Ok(Self {
            file: AtomicTomlFile::new(path),
        })
    }
}

#[async_trait]
impl RecentDocumentsStore for TomlRecentDocumentsStore {
    async fn load(&self) -> Result<Option<RecentDocumentsLog>> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| LexdraftError::internal(format!("recent log load task failed: {e}")))?
            .map_err(LexdraftError::from)
    }

    async fn save(&self, log: &RecentDocumentsLog) -> Result<()> {
        let file = self.file.clone();
        let log = log.clone();
        tokio::task::spawn_blocking(move || file.save(&log))
            .await
            .map_err(|e| LexdraftError::internal(format!("recent log save task failed: {e}")))?
            .map_err(LexdraftError::from)?;
        tracing::debug!(path = %self.file.path().display(), "Saved recent documents log");
        Ok(())
    }
}
