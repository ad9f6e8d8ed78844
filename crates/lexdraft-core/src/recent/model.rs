//! Most-recently-used document log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{StoredDocument, resolve_title};

/// Default number of entries kept in the log.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// One recently opened or saved document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDocumentEntry {
    pub id: String,
    pub title: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_case_id: Option<String>,
}

impl RecentDocumentEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            last_modified,
            linked_case_id: None,
        }
    }

    pub fn with_linked_case(mut self, case_id: Option<String>) -> Self {
        self.linked_case_id = case_id;
        self
    }

    /// Entry for a document just loaded from persistence. A blank stored
    /// title becomes `untitled_title`, matching the open tab.
    pub fn from_stored(doc: &StoredDocument, untitled_title: &str) -> Self {
        Self {
            id: doc.id.clone(),
            title: resolve_title(&doc.title, untitled_title),
            last_modified: doc.last_modified.unwrap_or_else(Utc::now),
            linked_case_id: doc.linked_case_id.clone(),
        }
    }
}

/// Bounded, most-recent-first list of documents, unique by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentDocumentsLog {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default, rename = "entry")]
    entries: Vec<RecentDocumentEntry>,
}

fn default_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

impl Default for RecentDocumentsLog {
    fn default() -> Self {
        Self::with_limit(DEFAULT_RECENT_LIMIT)
    }
}

impl RecentDocumentsLog {
    /// Creates an empty log. A limit of zero is raised to one.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            entries: Vec::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Changes the cap, dropping the oldest entries if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.entries.truncate(self.limit);
    }

    /// Puts `entry` at the front, replacing any previous entry with the same id.
    pub fn record(&mut self, entry: RecentDocumentEntry) {
        self.entries.retain(|existing| existing.id != entry.id);
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    /// Removes the entry for `id`. Returns whether one was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[RecentDocumentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: &str) -> RecentDocumentEntry {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        RecentDocumentEntry::new(id, format!("Doc {id}"), at)
    }

    #[test]
    fn test_from_stored_resolves_blank_title() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let stored = StoredDocument {
            id: "7".into(),
            title: "   ".into(),
            body: String::new(),
            linked_case_id: Some("C-1".into()),
            last_modified: Some(at),
        };

        let entry = RecentDocumentEntry::from_stored(&stored, "Untitled Document");
        assert_eq!(entry.title, "Untitled Document");
        assert_eq!(entry.last_modified, at);
        assert_eq!(entry.linked_case_id.as_deref(), Some("C-1"));

        let stored = StoredDocument {
            title: " Lease ".into(),
            ..stored
        };
        assert_eq!(RecentDocumentEntry::from_stored(&stored, "Untitled").title, "Lease");
    }

    #[test]
    fn test_keeps_latest_ten() {
        let mut log = RecentDocumentsLog::default();
        for i in 0..11 {
            log.record(entry(&i.to_string()));
        }
        assert_eq!(log.len(), 10);
        assert_eq!(log.entries()[0].id, "10");
        assert!(log.entries().iter().all(|e| e.id != "0"));
    }

    #[test]
    fn test_rerecord_moves_to_front_without_duplicate() {
        let mut log = RecentDocumentsLog::default();
        log.record(entry("a"));
        log.record(entry("b"));
        log.record(entry("c"));
        log.record(RecentDocumentEntry {
            title: "Renamed".into(),
            ..entry("a")
        });

        let ids: Vec<_> = log.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert_eq!(log.entries()[0].title, "Renamed");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut log = RecentDocumentsLog::with_limit(3);
        log.record(entry("a"));
        log.record(entry("b"));
        assert!(log.remove("a"));
        assert!(!log.remove("a"));
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_shrinking_limit_truncates() {
        let mut log = RecentDocumentsLog::with_limit(5);
        for id in ["a", "b", "c", "d"] {
            log.record(entry(id));
        }
        log.set_limit(2);
        let ids: Vec<_> = log.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c"]);
        assert_eq!(RecentDocumentsLog::with_limit(0).limit(), 1);
    }

    #[test]
    fn test_toml_roundtrip_shape() {
        let mut log = RecentDocumentsLog::with_limit(4);
        log.record(entry("a").with_linked_case(Some("case-7".into())));
        let text = toml::to_string(&log).unwrap();
        assert!(text.contains("[[entry]]"));
        let parsed: RecentDocumentsLog = toml::from_str(&text).unwrap();
        assert_eq!(parsed, log);
    }
}
