use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use lexdraft_application::RecentDocuments;
use lexdraft_infrastructure::{ConfigService, LexdraftPaths, TomlRecentDocumentsStore};

async fn load_recent(paths: &LexdraftPaths) -> Result<RecentDocuments> {
    let limit = ConfigService::new(paths.clone()).get_config().recent_documents_limit;
    let store = Arc::new(TomlRecentDocumentsStore::new(paths)?);
    Ok(RecentDocuments::load(store, limit).await)
}

pub async fn list(paths: &LexdraftPaths, out: &mut impl Write) -> Result<()> {
    let entries = load_recent(paths).await?.entries().await;
    if entries.is_empty() {
        writeln!(out, "No recent documents")?;
        return Ok(());
    }
    for entry in &entries {
        write!(
            out,
            "{}\t{}\t{}",
            entry.id,
            entry.title,
            entry.last_modified.format("%Y-%m-%d %H:%M")
        )?;
        if let Some(case_id) = &entry.linked_case_id {
            write!(out, "\tcase {case_id}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub async fn clear(paths: &LexdraftPaths, out: &mut impl Write) -> Result<()> {
    let recent = load_recent(paths).await?;
    let removed = recent.entries().await.len();
    recent.clear().await?;
    writeln!(out, "Cleared {removed} recent document(s)")?;
    Ok(())
}
