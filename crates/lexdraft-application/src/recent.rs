//! Recent documents service.
//!
//! Keeps the MRU log in memory and writes it through to a
//! [`RecentDocumentsStore`] on every change.

use std::sync::Arc;

use lexdraft_core::error::Result;
use lexdraft_core::recent::{RecentDocumentEntry, RecentDocumentsLog, RecentDocumentsStore};
use tokio::sync::Mutex;

pub struct RecentDocuments {
    store: Arc<dyn RecentDocumentsStore>,
    log: Mutex<RecentDocumentsLog>,
}

impl RecentDocuments {
    /// Restores the log from `store`.
    ///
    /// Unreadable or corrupt state starts an empty log; this never fails.
    pub async fn load(store: Arc<dyn RecentDocumentsStore>, limit: usize) -> Self {
        let log = match store.load().await {
            Ok(Some(mut log)) => {
                log.set_limit(limit);
                log
            }
            Ok(None) => RecentDocumentsLog::with_limit(limit),
            Err(e) => {
                tracing::warn!("Recent documents log unreadable, starting empty: {}", e);
                RecentDocumentsLog::with_limit(limit)
            }
        };
        tracing::debug!(entries = log.len(), "Loaded recent documents log");

        Self {
            store,
            log: Mutex::new(log),
        }
    }

    /// Moves `entry` to the front and persists the log.
    ///
    /// The in-memory log is updated even when persisting fails.
    pub async fn record(&self, entry: RecentDocumentEntry) -> Result<()> {
        let mut log = self.log.lock().await;
        log.record(entry);
        self.store.save(&log).await
    }

    /// Drops `id` from the log. Returns whether it was present.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut log = self.log.lock().await;
        if !log.remove(id) {
            return Ok(false);
        }
        self.store.save(&log).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<()> {
        let mut log = self.log.lock().await;
        log.clear();
        self.store.save(&log).await
    }

    /// Most-recent-first snapshot.
    pub async fn entries(&self) -> Vec<RecentDocumentEntry> {
        self.log.lock().await.entries().to_vec()
    }
}
