//! Durable store contract for the recent documents log.

use async_trait::async_trait;

use crate::error::Result;
use crate::recent::model::RecentDocumentsLog;

#[async_trait]
pub trait RecentDocumentsStore: Send + Sync {
    /// Loads the persisted log, `None` when nothing was stored yet.
    async fn load(&self) -> Result<Option<RecentDocumentsLog>>;

    async fn save(&self, log: &RecentDocumentsLog) -> Result<()>;
}
